use std::thread;

use indexmap::IndexMap;
use swfplace_tags::{
    amf3::{
        serde::{Error as AmfError, ExternalForm, Serializer, SerializerOptions, UndecodableKind},
        value::{Object, ObjectBody, Traits},
        Value,
    },
    bit_buf::{BitReader, BitWriter},
    diagnostics::Quiet,
    field_table,
    types::*,
    CodecOptions, EmbeddedValue, EncodeError, Field, OpaquePolicy, PlaceCodec, PlaceFlags,
    PlaceObject, Version,
};

fn placeobject2() -> PlaceObject {
    PlaceObject::new(12)
        .with_move()
        .with_character_id(40)
        .with_matrix(
            Matrix::translate(-2000, 360).with_scale(Fixed16::from_f64(1.5), Fixed16::ONE),
        )
        .with_color_transform(ColorTransform::new(
            Some(ColorTerms::IDENTITY),
            Some(ColorTerms {
                r: 10,
                g: -10,
                b: 0,
                a: 0,
            }),
        ))
        .with_ratio(0x1234)
        .with_name("hero")
        .with_clip_depth(20)
        .with_clip_actions(ClipActions::new(
            ClipEventFlags::ENTER_FRAME,
            vec![ClipActionRecord {
                event_flags: ClipEventFlags::ENTER_FRAME,
                key_code: None,
                actions: vec![0x06, 0x00],
            }],
        ))
}

fn placeobject3() -> PlaceObject {
    let mut record = placeobject2()
        .with_class_name("com.example.Hero")
        .with_filters(vec![
            Filter::Blur(BlurFilter::new(
                Blur {
                    blur_x: Fixed16::from_f64(2.0),
                    blur_y: Fixed16::from_f64(2.0),
                },
                1,
            )),
            Filter::Glow(GlowFilter {
                color: Rgba::new(0xFF, 0xCC, 0, 0xFF),
                strength: Fixed8::ONE,
                mode: FilterMode {
                    knockout: true,
                    passes: 2,
                    ..Default::default()
                },
                ..Default::default()
            }),
        ])
        .with_blend_mode(BlendMode::Screen)
        .with_bitmap_cache(1)
        .with_visible(true)
        .with_background_color(Rgba::new(0x20, 0x40, 0x60, 0xFF));
    record.has_image = true;
    record
}

fn placeobject4() -> PlaceObject {
    let members = IndexMap::from([
        ("label".to_owned(), Value::String("hero".into())),
        ("level".to_owned(), Value::Integer(3)),
    ]);

    placeobject3().with_embedded_value(Value::Object(Box::new(Object::anonymous(members))))
}

fn roundtrip(codec: &PlaceCodec, record: &PlaceObject, version: Version) -> Vec<u8> {
    let data = codec.encode_to_vec(record, version).unwrap();

    let mut reader = BitReader::new(&data);
    let decoded = codec.decode_with(&mut reader, version, &mut Quiet).unwrap();
    assert!(reader.is_empty());
    assert_eq!(&decoded, record, "decoded {version} record differs");

    let reencoded = codec.encode_to_vec(&decoded, version).unwrap();
    assert_eq!(reencoded, data, "re-encoded {version} record differs");

    data
}

#[test]
fn roundtrip_every_version() {
    let codec = PlaceCodec::default();

    for version in Version::ALL {
        roundtrip(&codec, &placeobject2(), version);
    }
    for version in [Version::V3, Version::V4] {
        roundtrip(&codec, &placeobject3(), version);
    }
    roundtrip(&codec, &placeobject4(), Version::V4);
}

#[test]
fn exact_layout() {
    let record = PlaceObject::new(1)
        .with_move()
        .with_class_name("A")
        .with_blend_mode(BlendMode::Multiply)
        .with_visible(true);

    let data = PlaceCodec::default()
        .encode_to_vec(&record, Version::V3)
        .unwrap();
    assert_eq!(data, [0x01, 0x2A, 0x01, 0x00, b'A', 0x00, 0x03, 0x01]);
}

#[test]
fn flags_follow_presence() {
    let codec = PlaceCodec::default();

    for (record, version) in [
        (placeobject2(), Version::V2),
        (placeobject3(), Version::V3),
        (placeobject4(), Version::V4),
        (PlaceObject::new(0), Version::V4),
    ] {
        let data = codec.encode_to_vec(&record, version).unwrap();

        let word = match version.flag_width() {
            8 => (data[0] as u16) << 8,
            _ => u16::from_be_bytes([data[0], data[1]]),
        };
        let flags = PlaceFlags::from_bits_retain(word);
        let gated = flags - (PlaceFlags::MOVE | PlaceFlags::HAS_IMAGE);

        assert_eq!(
            gated.bits().count_ones() as usize,
            record.populated_fields().count()
        );
        assert_eq!(flags.contains(PlaceFlags::MOVE), record.move_flag);
        assert_eq!(flags.contains(PlaceFlags::HAS_IMAGE), record.has_image);

        let decoded = codec
            .decode(&mut BitReader::new(&data), version)
            .unwrap();
        assert!(decoded.populated_fields().eq(record.populated_fields()));
    }
}

#[test]
fn tables_are_additive() {
    for pair in Version::ALL.windows(2) {
        let (old, new) = (pair[0], pair[1]);

        let inherited: Vec<_> = field_table(new)
            .filter(|spec| spec.since <= old)
            .map(|spec| spec.field)
            .collect();
        let previous: Vec<_> = field_table(old).map(|spec| spec.field).collect();
        assert_eq!(inherited, previous);

        assert!(old.defined_flags().difference(new.defined_flags()).is_empty());
    }

    assert!(field_table(Version::V2).all(|spec| spec.since == Version::V2));
}

#[test]
fn newer_fields_are_rejected() {
    let codec = PlaceCodec::default();

    assert!(matches!(
        codec.encode_to_vec(&placeobject3(), Version::V2),
        Err(EncodeError::FieldNotLegal {
            field: Field::ClassName,
            version: Version::V2,
        })
    ));

    let mut record = PlaceObject::new(1);
    record.has_image = true;
    assert!(matches!(
        codec.encode_to_vec(&record, Version::V2),
        Err(EncodeError::FieldNotLegal {
            field: Field::HasImage,
            ..
        })
    ));

    assert!(matches!(
        codec.encode_to_vec(&placeobject4(), Version::V3),
        Err(EncodeError::FieldNotLegal {
            field: Field::EmbeddedValue,
            version: Version::V3,
        })
    ));

    assert_eq!(placeobject2().min_version(), Version::V2);
    assert_eq!(placeobject3().min_version(), Version::V3);
    assert_eq!(placeobject4().min_version(), Version::V4);
}

#[test]
fn value_out_of_range() {
    let record = PlaceObject::new(1).with_name("a\0b");

    let mut writer = BitWriter::from_vec(vec![0xAA]);
    assert!(matches!(
        PlaceCodec::default().encode(&record, Version::V2, &mut writer),
        Err(EncodeError::ValueOutOfRange { field: Field::Name })
    ));
    assert_eq!(writer.view(), [0xAA]);
}

// Externalizable object of an unregistered class wrapping the integer 1.
const OPAQUE_TAIL: [u8; 8] = [0x0A, 0x07, 0x07, b'F', b'o', b'o', 0x04, 0x01];

fn opaque_record_bytes() -> Vec<u8> {
    let mut data = vec![0x02, 0x00, 0x05, 0x00, 0x01, 0x00];
    data.extend_from_slice(&OPAQUE_TAIL);
    data
}

#[test]
fn opaque_capture_is_not_reencodable() {
    let codec = PlaceCodec::default();
    let data = opaque_record_bytes();
    let record = codec.decode(&mut BitReader::new(&data), Version::V4).unwrap();

    let mut writer = BitWriter::from_vec(vec![0xAA, 0xBB]);
    let err = codec.encode(&record, Version::V4, &mut writer).unwrap_err();

    let EncodeError::ReEncodeUnsupported { reason } = err else {
        panic!("expected ReEncodeUnsupported, got {err:?}");
    };
    assert_eq!(
        reason.kind,
        UndecodableKind::Externalizable {
            class_name: "Foo".into()
        }
    );
    assert_eq!(writer.view(), [0xAA, 0xBB]);
}

#[test]
fn unserializable_value_writes_nothing() {
    let object = Object {
        traits: Traits {
            class_name: "Foo".into(),
            externalizable: true,
            ..Default::default()
        },
        body: ObjectBody::External(Value::Integer(1)),
    };
    let record = PlaceObject::new(5)
        .with_character_id(1)
        .with_embedded_value(Value::Object(Box::new(object)));

    let mut writer = BitWriter::from_vec(vec![0xAA]);
    let err = PlaceCodec::default()
        .encode(&record, Version::V4, &mut writer)
        .unwrap_err();

    assert!(matches!(
        err,
        EncodeError::Embedded(AmfError::NotSerializable { ref class_name }) if class_name == "Foo"
    ));
    assert_eq!(writer.view(), [0xAA]);
}

#[test]
fn opaque_capture_passthrough() {
    let codec = PlaceCodec::new(CodecOptions {
        opaque_policy: OpaquePolicy::Passthrough,
        ..Default::default()
    });

    let data = opaque_record_bytes();
    let record = codec.decode(&mut BitReader::new(&data), Version::V4).unwrap();
    assert!(matches!(
        record.embedded_value,
        Some(EmbeddedValue::OpaqueCapture(..))
    ));

    assert_eq!(codec.encode_to_vec(&record, Version::V4).unwrap(), data);
}

#[test]
fn opaque_capture_redecode() {
    let data = opaque_record_bytes();
    let record = PlaceCodec::default()
        .decode(&mut BitReader::new(&data), Version::V4)
        .unwrap();
    let Some(EmbeddedValue::OpaqueCapture(capture)) = &record.embedded_value else {
        panic!("expected an opaque capture");
    };
    assert_eq!(capture.bytes(), OPAQUE_TAIL);

    // The same serializer still cannot make sense of it.
    assert!(matches!(
        capture.redecode(&Serializer::default()),
        Ok(EmbeddedValue::OpaqueCapture(..))
    ));

    let mut options = SerializerOptions::default();
    options.externals.register("Foo", ExternalForm::WrappedValue);
    let value = capture.redecode(&Serializer::new(options)).unwrap();

    let expected = Object {
        traits: Traits {
            class_name: "Foo".into(),
            externalizable: true,
            ..Default::default()
        },
        body: ObjectBody::External(Value::Integer(1)),
    };
    assert_eq!(
        value,
        EmbeddedValue::from(Value::Object(Box::new(expected)))
    );
}

#[test]
fn reserved_and_fill_bits_reencode_unchanged() {
    #[rustfmt::skip]
    let data = [
        0x84, // clip actions, matrix
        0x01, 0x00, // depth
        0x01, // empty matrix with its fill bit set
        0x01, 0x00, // clip actions reserved word
        0x02, 0x00, 0x00, 0x00, // all events
        0x00, 0x00, 0x00, 0x00,
    ];

    let codec = PlaceCodec::default();
    let record = codec.decode(&mut BitReader::new(&data), Version::V2).unwrap();
    assert_eq!(
        record,
        PlaceObject::new(1)
            .with_matrix(Matrix::default())
            .with_clip_actions(ClipActions::new(ClipEventFlags::ENTER_FRAME, Vec::new()))
    );

    assert_eq!(codec.encode_to_vec(&record, Version::V2).unwrap(), data);
}

#[test]
fn unknown_blend_mode_roundtrip() {
    let codec = PlaceCodec::default();
    let record = PlaceObject::new(1).with_blend_mode(BlendMode::Unknown(3));

    let data = codec.encode_to_vec(&record, Version::V3).unwrap();
    let decoded = codec.decode(&mut BitReader::new(&data), Version::V3).unwrap();

    assert_eq!(decoded.blend_mode, Some(BlendMode::Multiply));
    assert_eq!(decoded, record);
}

#[test]
fn concurrent_decoding() {
    let codec = PlaceCodec::default();
    let data = codec.encode_to_vec(&placeobject4(), Version::V4).unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..64 {
                    let record = codec
                        .decode_with(&mut BitReader::new(&data), Version::V4, &mut Quiet)
                        .unwrap();
                    assert_eq!(record, placeobject4());
                }
            });
        }
    });
}
