use std::io;

// The maximum number of bits that can be buffered before comitting to the
// output sink.
const BUFFER_SIZE: u32 = u64::BITS - 1;

// The maximum number of bits that can be offered at once.
//
// Since we commit whole bytes after every write, at most 7 stale bits
// remain buffered and this is the largest value which always fits.
const WRITABLE_BITS: u32 = BUFFER_SIZE & !7;

#[cold]
#[inline(never)]
fn out_of_range(value: i64, nbits: u32) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("value {value} does not fit into {nbits} bits"),
    )
}

/// A buffer which enables bit-based serialization of SWF data.
///
/// Individual bit writing starts at the MSB of the byte, working
/// towards the LSB. Multi-byte quantities are written in little
/// endian byte ordering after realigning to a byte boundary.
#[derive(Debug, Default)]
pub struct BitWriter {
    // The inner buffer where data is being written to.
    inner: Vec<u8>,

    // A buffer for bits which are not committed to the
    // data buffer yet. The oldest bit is the most significant.
    buf: u64,

    // How many bits in `buf` are currently filled.
    count: u32,
}

impl BitWriter {
    /// Creates an empty [`BitWriter`].
    pub const fn new() -> Self {
        Self {
            inner: Vec::new(),
            buf: 0,
            count: 0,
        }
    }

    /// Creates an empty [`BitWriter`] to a given output vector.
    ///
    /// This is useful if you want to reuse existing buffer allocations.
    /// Existing contents of `vec` are kept and appended to.
    pub const fn from_vec(vec: Vec<u8>) -> Self {
        Self {
            inner: vec,
            buf: 0,
            count: 0,
        }
    }

    /// Gets the number of bits written so far.
    #[inline]
    pub fn written_bits(&self) -> usize {
        (self.inner.len() << 3) + self.count as usize
    }

    /// Indicates whether the writer currently sits on a byte boundary.
    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.count == 0
    }

    /// Gets the number of bits needed to complete a partially
    /// written byte.
    #[inline]
    pub fn padding_bits(&self) -> u32 {
        (u8::BITS - self.count % u8::BITS) % u8::BITS
    }

    /// Gets a view of the buffer's committed storage as a byte slice.
    ///
    /// Bits of a partially written byte are not included until
    /// [`Self::realign_to_byte`] is called.
    #[inline]
    pub fn view(&self) -> &[u8] {
        &self.inner
    }

    /// Consumes the [`BitWriter`] and returns the byte buffer.
    ///
    /// A partially written byte is zero-padded first.
    #[inline]
    pub fn into_inner(mut self) -> Vec<u8> {
        self.realign_to_byte();
        self.inner
    }

    /// Reserves capacity for at least `nbytes` more bytes in the
    /// output buffer.
    #[inline]
    pub fn reserve(&mut self, nbytes: usize) {
        self.inner.reserve(nbytes);
    }

    /// Flushes all whole bytes of buffered bits to the data buffer.
    pub fn commit(&mut self) {
        debug_assert!(self.count <= BUFFER_SIZE);

        while self.count >= u8::BITS {
            self.count -= u8::BITS;
            self.inner.push((self.buf >> self.count) as u8);
        }

        // Remove the written bits from the internal state.
        self.buf &= (1 << self.count) - 1;
    }

    /// Adds the low `nbits` bits from `value` to the internal buffer,
    /// if capacity is available in the buffer.
    pub fn offer(&mut self, value: u64, nbits: u32) -> io::Result<()> {
        if nbits <= WRITABLE_BITS && nbits <= (BUFFER_SIZE - self.count) {
            self.buf = (self.buf << nbits) | (value & ((1 << nbits) - 1));
            self.count += nbits;

            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "buffer capacity overflow",
            ))
        }
    }

    /// Writes a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.write_ub(bit as u32, 1)
    }

    /// Writes `value` as an unsigned bit field of `nbits` bits.
    ///
    /// Fails when `value` needs more than `nbits` bits.
    pub fn write_ub(&mut self, value: u32, nbits: u32) -> io::Result<()> {
        if nbits > u32::BITS || (nbits < u32::BITS && value >> nbits != 0) {
            return Err(out_of_range(value as i64, nbits));
        }

        self.offer(value as u64, nbits)?;
        self.commit();

        Ok(())
    }

    /// Writes `value` as a signed bit field of `nbits` bits.
    ///
    /// Fails when `value` is not representable in `nbits` bits
    /// of two's complement.
    pub fn write_sb(&mut self, value: i32, nbits: u32) -> io::Result<()> {
        if nbits == 0 {
            return match value {
                0 => Ok(()),
                _ => Err(out_of_range(value as i64, nbits)),
            };
        }
        if nbits > u32::BITS {
            return Err(out_of_range(value as i64, nbits));
        }

        let min = -(1i64 << (nbits - 1));
        let max = (1i64 << (nbits - 1)) - 1;
        if !(min..=max).contains(&(value as i64)) {
            return Err(out_of_range(value as i64, nbits));
        }

        self.offer(value as u32 as u64, nbits)?;
        self.commit();

        Ok(())
    }

    /// Writes the raw representation of a 16.16 fixed-point value as
    /// a bit field of `nbits` bits.
    #[inline]
    pub fn write_fb(&mut self, value: i32, nbits: u32) -> io::Result<()> {
        self.write_sb(value, nbits)
    }

    /// Flushes remaining bits to the output vector, with partially
    /// written bytes being zero-padded.
    pub fn realign_to_byte(&mut self) {
        self.commit();

        if self.count != 0 {
            self.inner.push((self.buf << (u8::BITS - self.count)) as u8);

            self.buf = 0;
            self.count = 0;
        }
    }

    /// Writes whole bytes from `buf` to the output vector after
    /// realigning to a byte boundary.
    pub fn write_bytes(&mut self, buf: &[u8]) {
        self.realign_to_byte();
        self.inner.extend_from_slice(buf);
    }

    /// Writes a NUL-terminated byte string.
    ///
    /// Fails when `s` itself contains a NUL byte, since the result
    /// would not read back as the same string.
    pub fn write_cstr(&mut self, s: &[u8]) -> io::Result<()> {
        if s.contains(&0) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "string contains an interior NUL byte",
            ));
        }

        self.write_bytes(s);
        self.inner.push(0);

        Ok(())
    }

    /// Writes a [`u8`] value after realigning to a byte boundary.
    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    /// Writes a [`u16`] value after realigning to a byte boundary.
    #[inline]
    pub fn write_u16(&mut self, v: u16) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Writes a [`i16`] value after realigning to a byte boundary.
    #[inline]
    pub fn write_i16(&mut self, v: i16) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Writes a [`u32`] value after realigning to a byte boundary.
    #[inline]
    pub fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Writes a [`i32`] value after realigning to a byte boundary.
    #[inline]
    pub fn write_i32(&mut self, v: i32) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Writes a [`f32`] value after realigning to a byte boundary.
    #[inline]
    pub fn write_f32(&mut self, v: f32) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Writes a [`f64`] value after realigning to a byte boundary.
    #[inline]
    pub fn write_f64(&mut self, v: f64) {
        self.write_bytes(&v.to_le_bytes());
    }
}
