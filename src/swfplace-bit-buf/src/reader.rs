use std::{io, mem::size_of};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::utils::align_up;

#[cold]
#[inline(never)]
fn premature_eof() -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "attempted to read more bits than available",
    )
}

#[cold]
#[inline(never)]
fn bad_width(nbits: u32) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("bit width {nbits} exceeds 32 bits"),
    )
}

macro_rules! impl_read_literal {
    ($($(#[$doc:meta])* $read_fn:ident() -> $ty:ty),* $(,)?) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $read_fn(&mut self) -> io::Result<$ty> {
                let mut data = self.read_bytes(size_of::<$ty>())?;
                data.$read_fn::<LittleEndian>()
            }
        )*
    };
}

/// A cursor which enables bit-based deserialization of SWF data.
///
/// Quantities of multiple bytes (except byte slices) are always read
/// in little-endian byte ordering. Individual bit reading starts at
/// the MSB of the byte, working towards the LSB.
///
/// The reader borrows its data and never panics on malformed input;
/// every out-of-bounds read fails with [`io::ErrorKind::UnexpectedEof`].
#[derive(Clone, Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    // Current position into `data`, in bits.
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new [`BitReader`] over the given bytes.
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Gets the current position of the reader in bits.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Gets the number of bits left to read.
    #[inline]
    pub fn remaining_bits(&self) -> usize {
        (self.data.len() << 3) - self.pos
    }

    /// Gets the number of whole bytes left to read after realigning
    /// to the next byte boundary.
    #[inline]
    pub fn remaining_bytes(&self) -> usize {
        self.data.len() - (align_up(self.pos, u8::BITS as _) >> 3)
    }

    /// Indicates whether all bits have been consumed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Indicates whether the reader currently sits on a byte boundary.
    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.pos % u8::BITS as usize == 0
    }

    /// Gets the number of bits left in a partially consumed byte.
    #[inline]
    pub fn padding_bits(&self) -> u32 {
        (align_up(self.pos, u8::BITS as _) - self.pos) as u32
    }

    /// Discards the remaining bits of a partially consumed byte.
    #[inline]
    pub fn realign_to_byte(&mut self) {
        self.pos = align_up(self.pos, u8::BITS as _);
    }

    /// Attempts to read a single bit from the buffer.
    #[inline]
    pub fn read_bit(&mut self) -> io::Result<bool> {
        let byte = self.data.get(self.pos >> 3).ok_or_else(premature_eof)?;
        let bit = (byte >> (7 - (self.pos & 7))) & 1;
        self.pos += 1;

        Ok(bit != 0)
    }

    /// Reads an unsigned bit field of `nbits` bits (`UB[nbits]`).
    ///
    /// A width of zero yields `0` without consuming anything.
    pub fn read_ub(&mut self, nbits: u32) -> io::Result<u32> {
        if nbits > u32::BITS {
            return Err(bad_width(nbits));
        }
        if nbits as usize > self.remaining_bits() {
            return Err(premature_eof());
        }

        let mut value = 0u32;
        let mut left = nbits;
        while left > 0 {
            // Take as many bits as possible from the current byte.
            let byte = self.data[self.pos >> 3] as u32;
            let offset = (self.pos & 7) as u32;
            let available = u8::BITS - offset;
            let take = available.min(left);

            let chunk = (byte >> (available - take)) & ((1 << take) - 1);
            value = (value << take) | chunk;

            self.pos += take as usize;
            left -= take;
        }

        Ok(value)
    }

    /// Reads a sign-extended bit field of `nbits` bits (`SB[nbits]`).
    pub fn read_sb(&mut self, nbits: u32) -> io::Result<i32> {
        if nbits == 0 {
            return Ok(0);
        }

        let raw = self.read_ub(nbits)?;
        let shift = u32::BITS - nbits;
        Ok(((raw << shift) as i32) >> shift)
    }

    /// Reads a 16.16 fixed-point bit field of `nbits` bits (`FB[nbits]`)
    /// and returns its raw representation.
    #[inline]
    pub fn read_fb(&mut self, nbits: u32) -> io::Result<i32> {
        self.read_sb(nbits)
    }

    /// Attempts to read a given number of bytes from the buffer and
    /// returns a byte slice to them.
    ///
    /// This will force-align the buffer to full byte boundaries
    /// before reading; effectively discarding the remaining bits
    /// until then.
    pub fn read_bytes(&mut self, nbytes: usize) -> io::Result<&'a [u8]> {
        self.realign_to_byte();

        let start = self.pos >> 3;
        let bytes = self
            .data
            .get(start..start + nbytes)
            .ok_or_else(premature_eof)?;
        self.pos += nbytes << 3;

        Ok(bytes)
    }

    /// Reads a NUL-terminated byte string and returns it without the
    /// terminator, which is consumed.
    pub fn read_cstr(&mut self) -> io::Result<&'a [u8]> {
        let rest = self.remainder();
        let len = rest.iter().position(|&b| b == 0).ok_or_else(premature_eof)?;

        let s = self.read_bytes(len)?;
        self.skip_bytes(1)?;

        Ok(s)
    }

    /// Gets all the bytes from the next byte boundary to the end of
    /// the buffer, without consuming them.
    #[inline]
    pub fn remainder(&self) -> &'a [u8] {
        let start = align_up(self.pos, u8::BITS as _) >> 3;
        &self.data[start..]
    }

    /// Skips `nbytes` whole bytes after realigning to a byte boundary.
    #[inline]
    pub fn skip_bytes(&mut self, nbytes: usize) -> io::Result<()> {
        self.read_bytes(nbytes).map(|_| ())
    }

    /// Reads a [`u8`] value from the buffer, if possible.
    ///
    /// This will force-align the buffer to full byte boundaries before
    /// reading; effectively discarding the remaining bits until then.
    #[inline]
    pub fn read_u8(&mut self) -> io::Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    // fn $read_fn(&mut self) -> io::Result<$ty>
    impl_read_literal! {
        /// Reads a [`u16`] value from the buffer, if possible.
        ///
        /// This will force-align the buffer to full byte boundaries before
        /// reading; effectively discarding the remaining bits until then.
        read_u16() -> u16,
        /// Reads a [`i16`] value from the buffer, if possible.
        ///
        /// This will force-align the buffer to full byte boundaries before
        /// reading; effectively discarding the remaining bits until then.
        read_i16() -> i16,

        /// Reads a [`u32`] value from the buffer, if possible.
        ///
        /// This will force-align the buffer to full byte boundaries before
        /// reading; effectively discarding the remaining bits until then.
        read_u32() -> u32,
        /// Reads a [`i32`] value from the buffer, if possible.
        ///
        /// This will force-align the buffer to full byte boundaries before
        /// reading; effectively discarding the remaining bits until then.
        read_i32() -> i32,

        /// Reads a [`f32`] value from the buffer, if possible.
        ///
        /// This will force-align the buffer to full byte boundaries before
        /// reading; effectively discarding the remaining bits until then.
        read_f32() -> f32,
        /// Reads a [`f64`] value from the buffer, if possible.
        ///
        /// This will force-align the buffer to full byte boundaries before
        /// reading; effectively discarding the remaining bits until then.
        read_f64() -> f64,
    }
}
