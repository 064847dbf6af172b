//! Provides bit level manipulation of SWF record data.
//!
//! SWF packs many of its structures (matrices, color transforms,
//! flag words) into bit fields which are not aligned to byte
//! boundaries. Bits are stored MSB-first within each byte, while
//! every byte-aligned multi-byte quantity is little endian.
//!
//! [`BitReader`] and [`BitWriter`] implement both conventions so
//! that the record codecs can mix packed and aligned fields freely.
//! Aligned reads and writes always realign to the next byte boundary
//! first, which matches how SWF structures terminate their bit fields.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod reader;
pub use reader::BitReader;

mod writer;
pub use writer::BitWriter;

pub mod utils;
