use std::io;

use swfplace_bit_buf::BitReader;

#[test]
fn read_primitives() -> io::Result<()> {
    let mut buf = BitReader::new(&[0xDE, 0xC0, 0xAD, 0xDE, 0x7F]);

    assert_eq!(buf.remaining_bits(), 40);
    assert_eq!(buf.read_u16()?, 0xC0DE);
    assert_eq!(buf.remaining_bytes(), 3);
    assert_eq!(buf.read_u8()?, 0xAD);
    assert_eq!(buf.read_u8()?, 0xDE);
    assert_eq!(buf.read_u8()?, 0x7F);
    assert!(buf.is_empty());

    Ok(())
}

#[test]
fn read_bits_msb_first() -> io::Result<()> {
    // 1011_0010 0111_1111
    let mut buf = BitReader::new(&[0b1011_0010, 0b0111_1111]);

    assert!(buf.read_bit()?);
    assert!(!buf.read_bit()?);
    assert_eq!(buf.read_ub(3)?, 0b110);
    assert_eq!(buf.position(), 5);

    // Crosses the byte boundary: 010 0111.
    assert_eq!(buf.read_ub(7)?, 0b010_0111);
    assert_eq!(buf.remaining_bits(), 4);

    Ok(())
}

#[test]
fn read_signed_bits() -> io::Result<()> {
    // 5 bits of 11110 (-2), 3 bits of 011 (3).
    let mut buf = BitReader::new(&[0b1111_0011]);

    assert_eq!(buf.read_sb(5)?, -2);
    assert_eq!(buf.read_sb(3)?, 3);
    assert_eq!(buf.read_sb(0)?, 0);

    Ok(())
}

#[test]
fn read_bits_and_alignment() -> io::Result<()> {
    let mut buf = BitReader::new(&[0b1000_0000, 2, 3, 4]);

    assert!(buf.read_bit()?);
    assert!(!buf.is_aligned());
    assert_eq!(buf.remaining_bytes(), 3);

    buf.realign_to_byte();
    assert_eq!(buf.read_u8()?, 2);

    // Aligned reads discard stale bits.
    assert_eq!(buf.read_ub(1)?, 0);
    assert_eq!(buf.read_bytes(1)?, &[4]);
    assert_eq!(buf.remaining_bits(), 0);

    Ok(())
}

#[test]
fn read_strings_and_remainder() -> io::Result<()> {
    let mut buf = BitReader::new(b"clip\0tail");

    assert_eq!(buf.read_cstr()?, b"clip");
    assert_eq!(buf.remainder(), b"tail");
    assert_eq!(buf.remaining_bytes(), 4);

    buf.skip_bytes(4)?;
    assert!(buf.remainder().is_empty());

    Ok(())
}

#[test]
fn premature_eof() {
    let mut buf = BitReader::new(&[0xFF]);

    let err = buf.read_u16().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

    let err = buf.read_ub(9).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

    let mut buf = BitReader::new(b"unterminated");
    assert!(buf.read_cstr().is_err());
}

#[test]
fn padding_of_partial_byte() -> io::Result<()> {
    let mut buf = BitReader::new(&[0b1010_0101, 0xFF]);
    assert_eq!(buf.padding_bits(), 0);

    buf.read_ub(3)?;
    assert_eq!(buf.padding_bits(), 5);
    assert_eq!(buf.read_ub(buf.padding_bits())?, 0b0_0101);
    assert!(buf.is_aligned());

    Ok(())
}
