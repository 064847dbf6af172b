use swfplace_amf3::{
    serde::{Outcome, Serializer, Undecodable},
    Value,
};

use crate::{types::*, DecodeError, Field, Version, FIELDS};

/// The AMF3 value at the end of a PlaceObject4 record.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum EmbeddedValue {
    /// The fully decoded value.
    Decoded {
        value: Value,
        /// Bytes between the end of the value and the end of the
        /// record, kept verbatim.
        trailing: Vec<u8>,
    },
    /// The raw bytes of a value which could not be interpreted.
    OpaqueCapture(OpaqueCapture),
}

impl From<Value> for EmbeddedValue {
    fn from(value: Value) -> Self {
        Self::Decoded {
            value,
            trailing: Vec::new(),
        }
    }
}

impl EmbeddedValue {
    /// Decodes an embedded value from the start of `bytes`.
    ///
    /// Values which reference types the serializer cannot interpret
    /// are captured as opaque bytes instead of failing. Whatever
    /// follows a decoded value is kept as its trailing bytes.
    pub fn decode(serializer: &Serializer, bytes: &[u8]) -> Result<Self, DecodeError> {
        match serializer.deserialize(bytes)? {
            Outcome::Decoded { value, consumed } => Ok(Self::Decoded {
                value,
                trailing: bytes[consumed..].to_vec(),
            }),

            // The value starts at the first byte, so nothing of it
            // has been consumed.
            Outcome::NotDecodable(reason) => Ok(Self::OpaqueCapture(OpaqueCapture {
                bytes: bytes.to_vec(),
                reason,
            })),
        }
    }

    /// Gets the decoded value, if any.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Decoded { value, .. } => Some(value),
            Self::OpaqueCapture(..) => None,
        }
    }
}

/// Verbatim bytes of an embedded value which references a type that
/// has no decoding rule.
///
/// Captures are only produced by decoding. They cannot be turned
/// back into a [`Value`] other than by decoding the bytes again
/// with a more capable serializer through [`OpaqueCapture::redecode`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpaqueCapture {
    bytes: Vec<u8>,
    reason: Undecodable,
}

impl OpaqueCapture {
    /// Gets the captured bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Gets the reason why the value could not be decoded.
    pub fn reason(&self) -> &Undecodable {
        &self.reason
    }

    /// Attempts to decode the captured bytes with `serializer`.
    pub fn redecode(&self, serializer: &Serializer) -> Result<EmbeddedValue, DecodeError> {
        EmbeddedValue::decode(serializer, &self.bytes)
    }
}

/// One placement command for the display list.
///
/// The flag word of a record is never stored; it is derived from
/// which fields are populated when encoding. Fields introduced by
/// later revisions must stay empty for records of earlier ones.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaceObject {
    /// The display list layer the command applies to.
    pub depth: u16,
    /// Whether the command modifies the character already at
    /// `depth` instead of placing a new one.
    pub move_flag: bool,
    /// PlaceObject3 and later: the character is an image.
    pub has_image: bool,

    /// PlaceObject3 and later.
    pub class_name: Option<String>,
    pub character_id: Option<u16>,
    pub matrix: Option<Matrix>,
    pub color_transform: Option<ColorTransform>,
    /// Morph position of the character.
    pub ratio: Option<u16>,
    /// The instance name.
    pub name: Option<String>,
    /// Characters up to this depth are clipped by this one.
    pub clip_depth: Option<u16>,
    /// PlaceObject3 and later.
    pub surface_filter_list: Option<Vec<Filter>>,
    /// PlaceObject3 and later.
    pub blend_mode: Option<BlendMode>,
    /// PlaceObject3 and later.
    pub bitmap_cache: Option<u8>,
    /// PlaceObject3 and later.
    pub visible: Option<u8>,
    /// PlaceObject3 and later.
    pub background_color: Option<Rgba>,
    pub clip_actions: Option<ClipActions>,

    /// PlaceObject4 only.
    pub embedded_value: Option<EmbeddedValue>,
}

impl PlaceObject {
    /// Creates an empty command for the given depth.
    pub fn new(depth: u16) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    pub fn with_move(mut self) -> Self {
        self.move_flag = true;
        self
    }

    pub fn with_character_id(mut self, id: u16) -> Self {
        self.character_id = Some(id);
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_matrix(mut self, matrix: Matrix) -> Self {
        self.matrix = Some(matrix);
        self
    }

    pub fn with_color_transform(mut self, cx: ColorTransform) -> Self {
        self.color_transform = Some(cx);
        self
    }

    pub fn with_ratio(mut self, ratio: u16) -> Self {
        self.ratio = Some(ratio);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_clip_depth(mut self, depth: u16) -> Self {
        self.clip_depth = Some(depth);
        self
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.surface_filter_list = Some(filters);
        self
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = Some(mode);
        self
    }

    pub fn with_bitmap_cache(mut self, cache: u8) -> Self {
        self.bitmap_cache = Some(cache);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible as u8);
        self
    }

    pub fn with_background_color(mut self, color: Rgba) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_clip_actions(mut self, actions: ClipActions) -> Self {
        self.clip_actions = Some(actions);
        self
    }

    pub fn with_embedded_value(mut self, value: Value) -> Self {
        self.embedded_value = Some(value.into());
        self
    }

    /// Gets the flag-gated fields which are populated, in wire order.
    pub fn populated_fields(&self) -> impl Iterator<Item = Field> + '_ {
        FIELDS
            .iter()
            .filter(move |spec| spec.is_present(self))
            .map(|spec| spec.field)
    }

    /// Gets the oldest revision which can store this record.
    pub fn min_version(&self) -> Version {
        let mut version = FIELDS
            .iter()
            .filter(|spec| spec.is_present(self))
            .map(|spec| spec.since)
            .max()
            .unwrap_or(Version::V2);

        if self.has_image {
            version = version.max(Version::V3);
        }
        if self.embedded_value.is_some() {
            version = Version::V4;
        }

        version
    }

    /// Gets the populated fields which `version` cannot store.
    pub fn illegal_fields(&self, version: Version) -> impl Iterator<Item = Field> + '_ {
        let modifiers = [
            (Field::HasImage, self.has_image, Version::V3),
            (Field::EmbeddedValue, self.embedded_value.is_some(), Version::V4),
        ];

        FIELDS
            .iter()
            .filter(move |spec| spec.is_present(self))
            .map(|spec| (spec.field, spec.since))
            .chain(
                modifiers
                    .into_iter()
                    .filter(|&(_, present, _)| present)
                    .map(|(field, _, since)| (field, since)),
            )
            .filter(move |&(_, since)| since > version)
            .map(|(field, _)| field)
    }
}
