use std::hash::{Hash, Hasher};

/// The blend mode of a placed display object.
///
/// Values without a defined mode are kept as [`BlendMode::Unknown`]
/// so they encode back unchanged.
///
/// Modes compare by their encoded byte, so `Unknown(3)` is equal to
/// [`BlendMode::Multiply`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug)]
pub enum BlendMode {
    Normal,
    Layer,
    Multiply,
    Screen,
    Lighten,
    Darken,
    Difference,
    Add,
    Subtract,
    Invert,
    Alpha,
    Erase,
    Overlay,
    HardLight,
    Unknown(u8),
}

impl BlendMode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Normal,
            2 => Self::Layer,
            3 => Self::Multiply,
            4 => Self::Screen,
            5 => Self::Lighten,
            6 => Self::Darken,
            7 => Self::Difference,
            8 => Self::Add,
            9 => Self::Subtract,
            10 => Self::Invert,
            11 => Self::Alpha,
            12 => Self::Erase,
            13 => Self::Overlay,
            14 => Self::HardLight,
            v => Self::Unknown(v),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Layer => 2,
            Self::Multiply => 3,
            Self::Screen => 4,
            Self::Lighten => 5,
            Self::Darken => 6,
            Self::Difference => 7,
            Self::Add => 8,
            Self::Subtract => 9,
            Self::Invert => 10,
            Self::Alpha => 11,
            Self::Erase => 12,
            Self::Overlay => 13,
            Self::HardLight => 14,
            Self::Unknown(v) => v,
        }
    }
}

impl PartialEq for BlendMode {
    fn eq(&self, other: &Self) -> bool {
        self.to_u8() == other.to_u8()
    }
}

impl Eq for BlendMode {}

impl Hash for BlendMode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_u8().hash(state);
    }
}

impl From<u8> for BlendMode {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}
