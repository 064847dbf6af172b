use swfplace_tags::{
    amf3::{
        serde::{Error as AmfError, Undecodable, UndecodableKind},
        Value,
    },
    bit_buf::BitReader,
    diagnostics::{Collected, Event},
    types::*,
    DecodeError, EmbeddedValue, Field, PlaceCodec, PlaceObject, Version,
};

// PlaceObject4 at depth 3 with character 17 and an identity matrix.
const FIXED_FIELDS: [u8; 7] = [0x06, 0x00, 0x03, 0x00, 0x11, 0x00, 0x00];

fn with_tail(tail: &[u8]) -> Vec<u8> {
    let mut data = FIXED_FIELDS.to_vec();
    data.extend_from_slice(tail);
    data
}

fn decode(data: &[u8], version: Version) -> Result<PlaceObject, DecodeError> {
    let codec = PlaceCodec::default();
    let mut reader = BitReader::new(data);
    codec.decode(&mut reader, version)
}

fn expected_fixed_fields() -> PlaceObject {
    PlaceObject::new(3)
        .with_character_id(17)
        .with_matrix(Matrix::default())
}

#[test]
fn no_tail_means_no_embedded_value() {
    let record = decode(&FIXED_FIELDS, Version::V4).unwrap();

    assert_eq!(record, expected_fixed_fields());
    assert!(!record.move_flag);
    assert!(record.embedded_value.is_none());
}

#[test]
fn undecodable_tail_is_captured() {
    let data = with_tail(&[0x7F]);

    let codec = PlaceCodec::default();
    let mut reader = BitReader::new(&data);
    let mut diagnostics = Collected::default();
    let mut record = codec
        .decode_with(&mut reader, Version::V4, &mut diagnostics)
        .unwrap();
    assert!(reader.is_empty());

    let reason = Undecodable {
        kind: UndecodableKind::UnknownMarker(0x7F),
        offset: 0,
    };

    let Some(EmbeddedValue::OpaqueCapture(capture)) = record.embedded_value.take() else {
        panic!("expected an opaque capture");
    };
    assert_eq!(capture.bytes(), [0x7F]);
    assert_eq!(capture.reason(), &reason);

    assert_eq!(record, expected_fixed_fields());
    assert_eq!(
        diagnostics.events,
        vec![Event::EmbeddedValueUndecodable { depth: 3, reason }]
    );
}

#[test]
fn decoded_tail() {
    let record = decode(&with_tail(&[0x04, 0x05]), Version::V4).unwrap();
    assert_eq!(
        record.embedded_value,
        Some(EmbeddedValue::from(Value::Integer(5)))
    );
}

#[test]
fn tail_with_trailing_bytes() {
    let data = with_tail(&[0x04, 0x05, 0x00]);

    let codec = PlaceCodec::default();
    let mut reader = BitReader::new(&data);
    let mut diagnostics = Collected::default();
    let record = codec
        .decode_with(&mut reader, Version::V4, &mut diagnostics)
        .unwrap();
    assert!(reader.is_empty());

    assert_eq!(
        record.embedded_value,
        Some(EmbeddedValue::Decoded {
            value: Value::Integer(5),
            trailing: vec![0x00],
        })
    );
    assert_eq!(
        diagnostics.events,
        vec![Event::EmbeddedValueTrailingBytes { depth: 3, count: 1 }]
    );

    // The extra bytes are written back after the value.
    assert_eq!(codec.encode_to_vec(&record, Version::V4).unwrap(), data);
}

#[test]
fn corrupt_tail() {
    assert!(matches!(
        decode(&with_tail(&[0x06, 0x02]), Version::V4),
        Err(DecodeError::Embedded(AmfError::InvalidReference { .. }))
    ));
}

#[test]
fn earlier_versions_leave_the_tail() {
    let data = [0x02, 0x00, 0x01, 0x00, 0x05, 0x00, 0xAB, 0xCD];

    let codec = PlaceCodec::default();
    let mut reader = BitReader::new(&data);
    let record = codec.decode(&mut reader, Version::V3).unwrap();

    assert_eq!(record, PlaceObject::new(1).with_character_id(5));
    assert_eq!(reader.remainder(), [0xAB, 0xCD]);
}

#[test]
fn narrow_flag_word() {
    // PlaceObject2 with move, character 5 at depth 1.
    let data = [0x03, 0x01, 0x00, 0x05, 0x00];

    let codec = PlaceCodec::default();
    let mut reader = BitReader::new(&data);
    let record = codec.decode(&mut reader, Version::V2).unwrap();

    assert!(reader.is_empty());
    assert_eq!(record, PlaceObject::new(1).with_move().with_character_id(5));
}

#[test]
fn placeobject3_fields() {
    let data = [
        0x01, 0x3A, // move, class name, image, visible, blend mode
        0x01, 0x00, // depth
        b'A', 0x00, // class name
        0x03, // blend mode
        0x01, // visible
    ];

    let record = decode(&data, Version::V3).unwrap();

    assert!(record.move_flag);
    assert!(record.has_image);
    assert_eq!(record.class_name.as_deref(), Some("A"));
    assert_eq!(record.blend_mode, Some(BlendMode::Multiply));
    assert_eq!(record.visible, Some(1));
    assert_eq!(
        record.populated_fields().collect::<Vec<_>>(),
        [Field::ClassName, Field::BlendMode, Field::Visible]
    );
}

#[test]
fn reserved_flag_bit() {
    for version in [Version::V3, Version::V4] {
        assert!(matches!(
            decode(&[0x00, 0x80, 0x01, 0x00], version),
            Err(DecodeError::MalformedFlags { bits: 0x0080, version: v }) if v == version
        ));
    }
}

#[test]
fn invalid_string() {
    let data = [0x20, 0x01, 0x00, 0xFF, 0x00];
    assert!(matches!(
        decode(&data, Version::V2),
        Err(DecodeError::InvalidString { field: Field::Name })
    ));
}

#[test]
fn truncated_input() {
    let data = [
        0x3E, 0x41, // name, ratio, color transform, matrix, character; filters, bg color
        0x02, 0x00, // depth
        0x07, 0x00, // character
        0x00, // matrix
        0x00, // color transform
        0x10, 0x00, // ratio
        b'n', 0x00, // name
        0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x18, // blur filter
        0xFF, 0xFF, 0xFF, 0xFF, // background color
    ];
    decode(&data, Version::V3).unwrap();

    for len in 0..data.len() {
        assert!(
            matches!(
                decode(&data[..len], Version::V3),
                Err(DecodeError::TruncatedInput(..))
            ),
            "prefix of {len} bytes"
        );
    }
}
