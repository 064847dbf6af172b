//! Value types of the optional record fields.

use std::io;

use swfplace_bit_buf::{BitReader, BitWriter};

mod blend_mode;
pub use blend_mode::*;

mod clip_actions;
pub use clip_actions::*;

mod color;
pub use color::*;

mod filter;
pub use filter::*;

mod matrix;
pub use matrix::*;

// The fill bits between the end of a bit-packed structure and the
// next byte boundary.
//
// They are written back only where the re-encoded structure ends at
// the same bit offset within its last byte; otherwise they are zero.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Padding {
    bits: u32,
    width: u32,
}

impl Padding {
    pub(crate) fn read(reader: &mut BitReader<'_>) -> io::Result<Self> {
        let width = reader.padding_bits();
        let bits = reader.read_ub(width)?;

        Ok(Self { bits, width })
    }

    pub(crate) fn write(&self, writer: &mut BitWriter) -> io::Result<()> {
        if writer.padding_bits() == self.width {
            writer.write_ub(self.bits, self.width)?;
        }
        writer.realign_to_byte();

        Ok(())
    }
}

/// A signed 16.16 fixed-point number, stored in its raw form.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fixed16(pub i32);

impl Fixed16 {
    pub const ONE: Self = Self(1 << 16);

    /// Converts `value` to the nearest representable number.
    pub fn from_f64(value: f64) -> Self {
        Self((value * 65536.0).round() as i32)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }
}

/// A signed 8.8 fixed-point number, stored in its raw form.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fixed8(pub i16);

impl Fixed8 {
    pub const ONE: Self = Self(1 << 8);

    /// Converts `value` to the nearest representable number.
    pub fn from_f32(value: f32) -> Self {
        Self((value * 256.0).round() as i16)
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / 256.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_conversions() {
        assert_eq!(Fixed16::from_f64(1.0), Fixed16::ONE);
        assert_eq!(Fixed16::from_f64(-0.5).0, -0x8000);
        assert_eq!(Fixed16(0x18000).to_f64(), 1.5);

        assert_eq!(Fixed8::from_f32(1.0), Fixed8::ONE);
        assert_eq!(Fixed8(0x0280).to_f32(), 2.5);
    }
}
