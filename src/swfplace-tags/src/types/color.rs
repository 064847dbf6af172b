use std::io;

use swfplace_bit_buf::{utils::max_sb_bits, BitReader, BitWriter};

use super::Padding;
use crate::{EncodeError, Field, OutOfRange};

/// A color with alpha channel.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn read(reader: &mut BitReader<'_>) -> io::Result<Self> {
        Ok(Self {
            r: reader.read_u8()?,
            g: reader.read_u8()?,
            b: reader.read_u8()?,
            a: reader.read_u8()?,
        })
    }

    pub fn write(&self, writer: &mut BitWriter) {
        writer.write_bytes(&[self.r, self.g, self.b, self.a]);
    }
}

/// One set of per-channel terms of a [`ColorTransform`].
///
/// Multiplication terms are 8.8 fixed-point factors, addition terms
/// plain offsets.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColorTerms {
    pub r: i16,
    pub g: i16,
    pub b: i16,
    pub a: i16,
}

impl ColorTerms {
    /// Multiplication terms which leave colors unchanged.
    pub const IDENTITY: Self = Self {
        r: 256,
        g: 256,
        b: 256,
        a: 256,
    };

    fn read(reader: &mut BitReader<'_>, nbits: u32) -> io::Result<Self> {
        // At most 15 bits wide, so every value fits.
        Ok(Self {
            r: reader.read_sb(nbits)? as i16,
            g: reader.read_sb(nbits)? as i16,
            b: reader.read_sb(nbits)? as i16,
            a: reader.read_sb(nbits)? as i16,
        })
    }

    fn write(&self, writer: &mut BitWriter, nbits: u32) -> io::Result<()> {
        for v in self.values() {
            writer.write_sb(v, nbits)?;
        }
        Ok(())
    }

    fn values(&self) -> [i32; 4] {
        [self.r as i32, self.g as i32, self.b as i32, self.a as i32]
    }
}

/// A color transform with alpha (`CXFORMWITHALPHA`).
///
/// The bit width of the terms and the trailing fill bits seen on
/// decode are remembered and reused on encode as long as all terms
/// still fit. They do not take part in comparisons.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default)]
pub struct ColorTransform {
    pub mult: Option<ColorTerms>,
    pub add: Option<ColorTerms>,
    #[cfg_attr(feature = "serde", serde(skip))]
    nbits: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    padding: Padding,
}

impl PartialEq for ColorTransform {
    fn eq(&self, other: &Self) -> bool {
        self.mult == other.mult && self.add == other.add
    }
}

impl ColorTransform {
    // `Nbits` is stored in 4 bits.
    const MAX_BITS: u32 = 15;

    pub fn new(mult: Option<ColorTerms>, add: Option<ColorTerms>) -> Self {
        Self {
            mult,
            add,
            nbits: 0,
            padding: Padding::default(),
        }
    }

    pub fn read(reader: &mut BitReader<'_>) -> io::Result<Self> {
        let has_add = reader.read_bit()?;
        let has_mult = reader.read_bit()?;
        let nbits = reader.read_ub(4)?;

        let mult = has_mult
            .then(|| ColorTerms::read(reader, nbits))
            .transpose()?;
        let add = has_add
            .then(|| ColorTerms::read(reader, nbits))
            .transpose()?;
        let padding = Padding::read(reader)?;

        Ok(Self {
            mult,
            add,
            nbits,
            padding,
        })
    }

    pub fn write(&self, writer: &mut BitWriter) -> Result<(), EncodeError> {
        let field = Field::ColorTransform;

        let values: Vec<i32> = self
            .mult
            .iter()
            .chain(self.add.iter())
            .flat_map(ColorTerms::values)
            .collect();
        let nbits = self.nbits.max(max_sb_bits(&values));
        if nbits > Self::MAX_BITS {
            return Err(EncodeError::ValueOutOfRange { field });
        }

        writer.realign_to_byte();
        writer.write_bit(self.add.is_some()).out_of_range(field)?;
        writer.write_bit(self.mult.is_some()).out_of_range(field)?;
        writer.write_ub(nbits, 4).out_of_range(field)?;
        if let Some(mult) = &self.mult {
            mult.write(writer, nbits).out_of_range(field)?;
        }
        if let Some(add) = &self.add {
            add.write(writer, nbits).out_of_range(field)?;
        }
        self.padding.write(writer).out_of_range(field)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_width_is_kept() {
        // add only, nbits = 9, offsets (1, -1, 0, 0) padded.
        let mut writer = BitWriter::new();
        writer.write_bit(true).unwrap();
        writer.write_bit(false).unwrap();
        writer.write_ub(9, 4).unwrap();
        for v in [1, -1, 0, 0] {
            writer.write_sb(v, 9).unwrap();
        }
        let data = writer.into_inner();

        let cx = ColorTransform::read(&mut BitReader::new(&data)).unwrap();
        assert_eq!(
            cx,
            ColorTransform::new(
                None,
                Some(ColorTerms {
                    r: 1,
                    g: -1,
                    b: 0,
                    a: 0
                })
            )
        );

        let mut out = BitWriter::new();
        cx.write(&mut out).unwrap();
        assert_eq!(out.into_inner(), data);
    }

    #[test]
    fn fill_bits_are_preserved() {
        // No terms, nbits = 0, then two set fill bits.
        let data = [0b0000_0011];

        let cx = ColorTransform::read(&mut BitReader::new(&data)).unwrap();
        assert_eq!(cx, ColorTransform::new(None, None));

        let mut out = BitWriter::new();
        cx.write(&mut out).unwrap();
        assert_eq!(out.into_inner(), data);
    }

    #[test]
    fn minimal_width() {
        let cx = ColorTransform::new(Some(ColorTerms::IDENTITY), None);

        let mut out = BitWriter::new();
        cx.write(&mut out).unwrap();

        // 0 1 1010 then four 10-bit terms of 256, padded.
        let data = out.into_inner();
        assert_eq!(data.len(), 6);
        assert_eq!(data[0] >> 2, 0b01_1010);
    }
}
