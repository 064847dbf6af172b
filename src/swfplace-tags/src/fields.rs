use std::fmt;

use swfplace_bit_buf::{BitReader, BitWriter};

use crate::{
    types::*, CodecOptions, DecodeError, EncodeError, OutOfRange, PlaceFlags, PlaceObject,
    Version,
};

/// The fields of a placement record which may be absent.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    ClassName,
    CharacterId,
    Matrix,
    ColorTransform,
    Ratio,
    Name,
    ClipDepth,
    SurfaceFilterList,
    BlendMode,
    BitmapCache,
    Visible,
    BackgroundColor,
    ClipActions,
    /// The image modifier bit; not a field of its own on the wire.
    HasImage,
    /// The trailing AMF3 value of PlaceObject4.
    EmbeddedValue,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Self::ClassName => "class name",
            Self::CharacterId => "character id",
            Self::Matrix => "matrix",
            Self::ColorTransform => "color transform",
            Self::Ratio => "ratio",
            Self::Name => "name",
            Self::ClipDepth => "clip depth",
            Self::SurfaceFilterList => "surface filter list",
            Self::BlendMode => "blend mode",
            Self::BitmapCache => "bitmap cache",
            Self::Visible => "visible",
            Self::BackgroundColor => "background color",
            Self::ClipActions => "clip actions",
            Self::HasImage => "image flag",
            Self::EmbeddedValue => "embedded value",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Decode = fn(&mut BitReader<'_>, &CodecOptions, &mut PlaceObject) -> Result<(), DecodeError>;
type Encode = fn(&PlaceObject, &CodecOptions, &mut BitWriter) -> Result<(), EncodeError>;

/// The description of one flag-gated field.
///
/// The decode and encode functions are only invoked when the flag
/// bit is set or the field is present, respectively.
pub struct FieldSpec {
    pub field: Field,
    /// The bit in the flag word which announces the field.
    pub flag: PlaceFlags,
    /// The first revision which knows the field.
    pub since: Version,
    present: fn(&PlaceObject) -> bool,
    decode: Decode,
    encode: Encode,
}

impl FieldSpec {
    /// Whether the field is populated in `record`.
    #[inline]
    pub fn is_present(&self, record: &PlaceObject) -> bool {
        (self.present)(record)
    }

    pub(crate) fn decode(
        &self,
        reader: &mut BitReader<'_>,
        options: &CodecOptions,
        record: &mut PlaceObject,
    ) -> Result<(), DecodeError> {
        (self.decode)(reader, options, record)
    }

    pub(crate) fn encode(
        &self,
        record: &PlaceObject,
        options: &CodecOptions,
        writer: &mut BitWriter,
    ) -> Result<(), EncodeError> {
        (self.encode)(record, options, writer)
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("field", &self.field)
            .field("flag", &self.flag)
            .field("since", &self.since)
            .finish_non_exhaustive()
    }
}

fn read_string(reader: &mut BitReader<'_>, field: Field) -> Result<String, DecodeError> {
    let raw = reader.read_cstr()?;
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| DecodeError::InvalidString { field })
}

fn write_string(writer: &mut BitWriter, s: &str, field: Field) -> Result<(), EncodeError> {
    writer.write_cstr(s.as_bytes()).out_of_range(field)
}

/// All flag-gated fields in wire order.
///
/// A revision reads the entries it knows in exactly this order, so
/// new fields can only ever be added and no entry may be reordered.
pub static FIELDS: [FieldSpec; 13] = [
    FieldSpec {
        field: Field::ClassName,
        flag: PlaceFlags::HAS_CLASS_NAME,
        since: Version::V3,
        present: |r| r.class_name.is_some(),
        decode: |rd, _, r| {
            r.class_name = Some(read_string(rd, Field::ClassName)?);
            Ok(())
        },
        encode: |r, _, w| match &r.class_name {
            Some(s) => write_string(w, s, Field::ClassName),
            None => Ok(()),
        },
    },
    FieldSpec {
        field: Field::CharacterId,
        flag: PlaceFlags::HAS_CHARACTER,
        since: Version::V2,
        present: |r| r.character_id.is_some(),
        decode: |rd, _, r| {
            r.character_id = Some(rd.read_u16()?);
            Ok(())
        },
        encode: |r, _, w| {
            if let Some(id) = r.character_id {
                w.write_u16(id);
            }
            Ok(())
        },
    },
    FieldSpec {
        field: Field::Matrix,
        flag: PlaceFlags::HAS_MATRIX,
        since: Version::V2,
        present: |r| r.matrix.is_some(),
        decode: |rd, _, r| {
            r.matrix = Some(Matrix::read(rd)?);
            Ok(())
        },
        encode: |r, _, w| match &r.matrix {
            Some(m) => m.write(w),
            None => Ok(()),
        },
    },
    FieldSpec {
        field: Field::ColorTransform,
        flag: PlaceFlags::HAS_COLOR_TRANSFORM,
        since: Version::V2,
        present: |r| r.color_transform.is_some(),
        decode: |rd, _, r| {
            r.color_transform = Some(ColorTransform::read(rd)?);
            Ok(())
        },
        encode: |r, _, w| match &r.color_transform {
            Some(cx) => cx.write(w),
            None => Ok(()),
        },
    },
    FieldSpec {
        field: Field::Ratio,
        flag: PlaceFlags::HAS_RATIO,
        since: Version::V2,
        present: |r| r.ratio.is_some(),
        decode: |rd, _, r| {
            r.ratio = Some(rd.read_u16()?);
            Ok(())
        },
        encode: |r, _, w| {
            if let Some(ratio) = r.ratio {
                w.write_u16(ratio);
            }
            Ok(())
        },
    },
    FieldSpec {
        field: Field::Name,
        flag: PlaceFlags::HAS_NAME,
        since: Version::V2,
        present: |r| r.name.is_some(),
        decode: |rd, _, r| {
            r.name = Some(read_string(rd, Field::Name)?);
            Ok(())
        },
        encode: |r, _, w| match &r.name {
            Some(s) => write_string(w, s, Field::Name),
            None => Ok(()),
        },
    },
    FieldSpec {
        field: Field::ClipDepth,
        flag: PlaceFlags::HAS_CLIP_DEPTH,
        since: Version::V2,
        present: |r| r.clip_depth.is_some(),
        decode: |rd, _, r| {
            r.clip_depth = Some(rd.read_u16()?);
            Ok(())
        },
        encode: |r, _, w| {
            if let Some(depth) = r.clip_depth {
                w.write_u16(depth);
            }
            Ok(())
        },
    },
    FieldSpec {
        field: Field::SurfaceFilterList,
        flag: PlaceFlags::HAS_FILTER_LIST,
        since: Version::V3,
        present: |r| r.surface_filter_list.is_some(),
        decode: |rd, _, r| {
            r.surface_filter_list = Some(read_filter_list(rd)?);
            Ok(())
        },
        encode: |r, _, w| match &r.surface_filter_list {
            Some(filters) => write_filter_list(filters, w),
            None => Ok(()),
        },
    },
    FieldSpec {
        field: Field::BlendMode,
        flag: PlaceFlags::HAS_BLEND_MODE,
        since: Version::V3,
        present: |r| r.blend_mode.is_some(),
        decode: |rd, _, r| {
            r.blend_mode = Some(BlendMode::from_u8(rd.read_u8()?));
            Ok(())
        },
        encode: |r, _, w| {
            if let Some(mode) = r.blend_mode {
                w.write_u8(mode.to_u8());
            }
            Ok(())
        },
    },
    FieldSpec {
        field: Field::BitmapCache,
        flag: PlaceFlags::HAS_CACHE_AS_BITMAP,
        since: Version::V3,
        present: |r| r.bitmap_cache.is_some(),
        decode: |rd, _, r| {
            r.bitmap_cache = Some(rd.read_u8()?);
            Ok(())
        },
        encode: |r, _, w| {
            if let Some(cache) = r.bitmap_cache {
                w.write_u8(cache);
            }
            Ok(())
        },
    },
    FieldSpec {
        field: Field::Visible,
        flag: PlaceFlags::HAS_VISIBLE,
        since: Version::V3,
        present: |r| r.visible.is_some(),
        decode: |rd, _, r| {
            r.visible = Some(rd.read_u8()?);
            Ok(())
        },
        encode: |r, _, w| {
            if let Some(visible) = r.visible {
                w.write_u8(visible);
            }
            Ok(())
        },
    },
    FieldSpec {
        field: Field::BackgroundColor,
        flag: PlaceFlags::HAS_BACKGROUND_COLOR,
        since: Version::V3,
        present: |r| r.background_color.is_some(),
        decode: |rd, _, r| {
            r.background_color = Some(Rgba::read(rd)?);
            Ok(())
        },
        encode: |r, _, w| {
            if let Some(color) = r.background_color {
                color.write(w);
            }
            Ok(())
        },
    },
    FieldSpec {
        field: Field::ClipActions,
        flag: PlaceFlags::HAS_CLIP_ACTIONS,
        since: Version::V2,
        present: |r| r.clip_actions.is_some(),
        decode: |rd, options, r| {
            r.clip_actions = Some(ClipActions::read(rd, options)?);
            Ok(())
        },
        encode: |r, options, w| match &r.clip_actions {
            Some(actions) => actions.write(w, options),
            None => Ok(()),
        },
    },
];

/// Gets the fields known to `version`, in wire order.
///
/// The table of a revision is the table of its predecessor plus the
/// fields it introduces.
pub fn field_table(version: Version) -> impl Iterator<Item = &'static FieldSpec> + Clone {
    FIELDS.iter().filter(move |spec| spec.since <= version)
}

/// Looks up the table entry of `field`, if it is flag-gated.
pub fn field_spec(field: Field) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.field == field)
}
