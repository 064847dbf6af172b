use std::io;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::Error;

/// The largest value a U29 can hold.
pub const U29_MAX: u32 = (1 << 29) - 1;

/// The range of signed integers representable by the integer marker.
pub const I29_MIN: i32 = -(1 << 28);
pub const I29_MAX: i32 = (1 << 28) - 1;

/// Reads a variable-length 29-bit unsigned integer.
///
/// The first three bytes contribute 7 bits each and flag a follow-up
/// byte in their MSB; a fourth byte contributes all of its 8 bits.
#[inline]
pub fn read_u29(data: &mut &[u8]) -> io::Result<u32> {
    let mut value = 0u32;
    for i in 0..4 {
        let b = data.read_u8()? as u32;
        if i == 3 {
            value = (value << 8) | b;
            break;
        }

        value = (value << 7) | (b & 0x7F);
        if b & 0x80 == 0 {
            break;
        }
    }

    Ok(value)
}

/// Writes a variable-length 29-bit unsigned integer in its shortest form.
#[inline]
pub fn write_u29(out: &mut Vec<u8>, value: u32) -> Result<(), Error> {
    match value {
        0..=0x7F => out.push(value as u8),
        0x80..=0x3FFF => {
            out.push((value >> 7) as u8 | 0x80);
            out.push(value as u8 & 0x7F);
        }
        0x4000..=0x1F_FFFF => {
            out.push((value >> 14) as u8 | 0x80);
            out.push((value >> 7) as u8 | 0x80);
            out.push(value as u8 & 0x7F);
        }
        0x20_0000..=U29_MAX => {
            out.push((value >> 22) as u8 | 0x80);
            out.push((value >> 15) as u8 | 0x80);
            out.push((value >> 8) as u8 | 0x80);
            out.push(value as u8);
        }
        _ => return Err(Error::LengthOverflow(value as usize)),
    }

    Ok(())
}

/// Writes an inline header carrying a length or count.
#[inline]
pub fn write_inline_header(out: &mut Vec<u8>, len: usize) -> Result<(), Error> {
    let value = u32::try_from(len)
        .ok()
        .and_then(|v| v.checked_mul(2))
        .filter(|&v| v < U29_MAX)
        .ok_or(Error::LengthOverflow(len))?;

    write_u29(out, value | 1)
}

/// Writes a reference header to entry `index` of some table.
#[inline]
pub fn write_reference_header(out: &mut Vec<u8>, index: u32) -> Result<(), Error> {
    let value = index
        .checked_mul(2)
        .filter(|&v| v < U29_MAX)
        .ok_or(Error::LengthOverflow(index as usize))?;

    write_u29(out, value)
}

/// Sign-extends a 29-bit integer.
#[inline]
pub const fn sign_extend_i29(value: u32) -> i32 {
    ((value << 3) as i32) >> 3
}

#[inline]
pub fn read_f64(data: &mut &[u8]) -> io::Result<f64> {
    data.read_f64::<BigEndian>()
}

#[inline]
pub fn write_f64(out: &mut Vec<u8>, value: f64) -> io::Result<()> {
    out.write_f64::<BigEndian>(value)
}
