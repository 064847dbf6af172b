//! Codec for the display list placement records of SWF files.
//!
//! PlaceObject2, PlaceObject3 and PlaceObject4 all place or update a
//! character on a depth of the display list. Every revision keeps the
//! layout of its predecessor and appends new optional fields, each of
//! them gated by a bit in a leading flag word. The fields a revision
//! knows are described by the data-driven [`field_table`], which is
//! what [`PlaceCodec`] walks for both decoding and encoding.
//!
//! PlaceObject4 additionally carries an AMF3 value in the remaining
//! bytes of the record. Values which reference types that cannot be
//! interpreted are kept as an [`OpaqueCapture`] of the raw bytes, so
//! the rest of the record stays usable.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub use swfplace_amf3 as amf3;
pub use swfplace_bit_buf as bit_buf;

mod codec;
pub use codec::PlaceCodec;

pub mod diagnostics;
pub use diagnostics::Diagnostics;

mod error;
pub use error::*;

mod fields;
pub use fields::*;

mod flags;
pub use flags::*;

mod options;
pub use options::*;

mod place;
pub use place::*;

pub mod types;
