/// The type markers which prefix every AMF3 value.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Marker {
    Undefined = 0x00,
    Null = 0x01,
    False = 0x02,
    True = 0x03,
    Integer = 0x04,
    Double = 0x05,
    String = 0x06,
    XmlDocument = 0x07,
    Date = 0x08,
    Array = 0x09,
    Object = 0x0A,
    Xml = 0x0B,
    ByteArray = 0x0C,
    VectorInt = 0x0D,
    VectorUint = 0x0E,
    VectorDouble = 0x0F,
    VectorObject = 0x10,
    Dictionary = 0x11,
}

impl Marker {
    /// Whether values of this type occupy a slot in the complex
    /// value table and may be referenced.
    pub const fn is_complex(self) -> bool {
        !matches!(
            self,
            Self::Undefined
                | Self::Null
                | Self::False
                | Self::True
                | Self::Integer
                | Self::Double
                | Self::String
        )
    }
}

impl TryFrom<u8> for Marker {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x00 => Self::Undefined,
            0x01 => Self::Null,
            0x02 => Self::False,
            0x03 => Self::True,
            0x04 => Self::Integer,
            0x05 => Self::Double,
            0x06 => Self::String,
            0x07 => Self::XmlDocument,
            0x08 => Self::Date,
            0x09 => Self::Array,
            0x0A => Self::Object,
            0x0B => Self::Xml,
            0x0C => Self::ByteArray,
            0x0D => Self::VectorInt,
            0x0E => Self::VectorUint,
            0x0F => Self::VectorDouble,
            0x10 => Self::VectorObject,
            0x11 => Self::Dictionary,
            v => return Err(v),
        })
    }
}
