//! Implements the AMF3 object graph serialization format.
//!
//! AMF3 is the ActionScript 3 serialization format for dynamically
//! typed object graphs. Inside SWF files it shows up as the trailing
//! payload of PlaceObject4 records, where authoring tools attach
//! arbitrary metadata to placed display objects.
//!
//! Objects of externalizable classes serialize themselves with a
//! class-specific format that cannot be interpreted without knowing
//! the class. The [`serde::Serializer`] reports such values as a
//! first-class [`serde::Outcome::NotDecodable`] result instead of
//! failing, so callers can keep the raw bytes around.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod serde;

pub mod value;
pub use value::Value;
