use std::io;

use swfplace_bit_buf::{utils::max_sb_bits, BitReader, BitWriter};

use super::{Fixed16, Padding};
use crate::{EncodeError, Field, OutOfRange};

// Every bit count of a matrix is stored in 5 bits.
const MAX_BITS: u32 = 31;

#[derive(Clone, Copy, Debug, Default)]
struct Widths {
    scale: u32,
    rotate: u32,
    translate: u32,
    padding: Padding,
}

/// A 2D affine transformation (`MATRIX`).
///
/// Translation is given in twips. The bit widths and trailing fill
/// bits seen on decode are remembered and reused on encode as long
/// as the values still fit; they do not take part in comparisons.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, Default)]
pub struct Matrix {
    pub scale: Option<(Fixed16, Fixed16)>,
    pub rotate_skew: Option<(Fixed16, Fixed16)>,
    pub translate: (i32, i32),
    #[cfg_attr(feature = "serde", serde(skip))]
    widths: Widths,
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.scale == other.scale
            && self.rotate_skew == other.rotate_skew
            && self.translate == other.translate
    }
}

impl Matrix {
    /// Creates a matrix which only translates.
    pub fn translate(x: i32, y: i32) -> Self {
        Self {
            translate: (x, y),
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, x: Fixed16, y: Fixed16) -> Self {
        self.scale = Some((x, y));
        self
    }

    pub fn with_rotate_skew(mut self, skew0: Fixed16, skew1: Fixed16) -> Self {
        self.rotate_skew = Some((skew0, skew1));
        self
    }

    pub fn read(reader: &mut BitReader<'_>) -> io::Result<Self> {
        let mut widths = Widths::default();

        let scale = if reader.read_bit()? {
            widths.scale = reader.read_ub(5)?;
            Some(read_pair(reader, widths.scale)?)
        } else {
            None
        };

        let rotate_skew = if reader.read_bit()? {
            widths.rotate = reader.read_ub(5)?;
            Some(read_pair(reader, widths.rotate)?)
        } else {
            None
        };

        widths.translate = reader.read_ub(5)?;
        let translate = (
            reader.read_sb(widths.translate)?,
            reader.read_sb(widths.translate)?,
        );
        widths.padding = Padding::read(reader)?;

        Ok(Self {
            scale,
            rotate_skew,
            translate,
            widths,
        })
    }

    pub fn write(&self, writer: &mut BitWriter) -> Result<(), EncodeError> {
        let field = Field::Matrix;
        writer.realign_to_byte();

        writer.write_bit(self.scale.is_some()).out_of_range(field)?;
        if let Some((x, y)) = self.scale {
            let nbits = packed_width(self.widths.scale, &[x.0, y.0])?;
            writer.write_ub(nbits, 5).out_of_range(field)?;
            writer.write_fb(x.0, nbits).out_of_range(field)?;
            writer.write_fb(y.0, nbits).out_of_range(field)?;
        }

        writer.write_bit(self.rotate_skew.is_some()).out_of_range(field)?;
        if let Some((s0, s1)) = self.rotate_skew {
            let nbits = packed_width(self.widths.rotate, &[s0.0, s1.0])?;
            writer.write_ub(nbits, 5).out_of_range(field)?;
            writer.write_fb(s0.0, nbits).out_of_range(field)?;
            writer.write_fb(s1.0, nbits).out_of_range(field)?;
        }

        let (tx, ty) = self.translate;
        let nbits = packed_width(self.widths.translate, &[tx, ty])?;
        writer.write_ub(nbits, 5).out_of_range(field)?;
        writer.write_sb(tx, nbits).out_of_range(field)?;
        writer.write_sb(ty, nbits).out_of_range(field)?;
        self.widths.padding.write(writer).out_of_range(field)?;

        Ok(())
    }
}

fn read_pair(reader: &mut BitReader<'_>, nbits: u32) -> io::Result<(Fixed16, Fixed16)> {
    Ok((
        Fixed16(reader.read_fb(nbits)?),
        Fixed16(reader.read_fb(nbits)?),
    ))
}

fn packed_width(observed: u32, values: &[i32]) -> Result<u32, EncodeError> {
    let nbits = observed.max(max_sb_bits(values));
    if nbits > MAX_BITS {
        return Err(EncodeError::ValueOutOfRange {
            field: Field::Matrix,
        });
    }

    Ok(nbits)
}
