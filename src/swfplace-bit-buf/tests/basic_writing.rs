use std::io;

use swfplace_bit_buf::{BitReader, BitWriter};

#[test]
fn write_primitives() {
    let mut buf = BitWriter::new();

    buf.write_u16(0xC0DE);
    buf.write_u8(0xAD);
    buf.write_i32(-2);

    assert_eq!(buf.view(), &[0xDE, 0xC0, 0xAD, 0xFE, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn write_bits_msb_first() -> io::Result<()> {
    let mut buf = BitWriter::new();

    buf.write_bit(true)?;
    buf.write_bit(false)?;
    buf.write_ub(0b110, 3)?;
    buf.write_ub(0b010_0111, 7)?;
    assert_eq!(buf.written_bits(), 12);

    // The partial byte is zero-padded at the end.
    assert_eq!(buf.into_inner(), &[0b1011_0010, 0b0111_0000]);

    Ok(())
}

#[test]
fn write_signed_bits() -> io::Result<()> {
    let mut buf = BitWriter::new();

    buf.write_sb(-2, 5)?;
    buf.write_sb(3, 3)?;
    buf.write_sb(0, 0)?;

    assert_eq!(buf.view(), &[0b1111_0011]);

    Ok(())
}

#[test]
fn reject_out_of_range() {
    let mut buf = BitWriter::new();

    assert!(buf.write_ub(8, 3).is_err());
    assert!(buf.write_sb(4, 3).is_err());
    assert!(buf.write_sb(-5, 3).is_err());
    assert!(buf.write_sb(1, 0).is_err());
    assert!(buf.write_cstr(b"a\0b").is_err());

    assert_eq!(buf.written_bits(), 0);
}

#[test]
fn aligned_writes_pad_bits() -> io::Result<()> {
    let mut buf = BitWriter::new();

    buf.write_bit(true)?;
    buf.write_u8(0x42);
    buf.write_cstr(b"hi")?;

    assert_eq!(buf.view(), &[0x80, 0x42, b'h', b'i', 0]);

    Ok(())
}

#[test]
fn full_width_fields() -> io::Result<()> {
    let mut buf = BitWriter::new();

    buf.write_bit(true)?;
    buf.write_ub(u32::MAX, 32)?;
    buf.write_sb(i32::MIN, 32)?;
    let data = buf.into_inner();

    let mut reader = BitReader::new(&data);
    assert!(reader.read_bit()?);
    assert_eq!(reader.read_ub(32)?, u32::MAX);
    assert_eq!(reader.read_sb(32)?, i32::MIN);

    Ok(())
}

#[test]
fn padding_of_partial_byte() -> io::Result<()> {
    let mut buf = BitWriter::new();
    assert_eq!(buf.padding_bits(), 0);

    buf.write_ub(0b101, 3)?;
    assert_eq!(buf.padding_bits(), 5);
    buf.write_ub(0b0_0101, buf.padding_bits())?;
    assert_eq!(buf.padding_bits(), 0);
    assert_eq!(buf.view(), &[0b1010_0101]);

    Ok(())
}
