//! Serialization support for AMF3 values.

use std::{collections::HashMap, fmt, io};

use thiserror::Error;

use crate::Value;

#[macro_use]
mod macros;

mod de;

mod ser;

mod utils;

/// Errors that may occur during the AMF3 (de)serialization process.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occured while trying to read data from the input source.
    #[error("{0}")]
    Io(#[from] io::Error),

    /// Failed to decode an UTF-8 string where one was expected.
    #[error("{0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// A reference points past the end of its table.
    #[error("reference to unknown {table} entry {index}")]
    InvalidReference { table: Table, index: u32 },

    /// A [`Value::Reference`] to serialize points past the complex
    /// values written so far.
    #[error("dangling reference to complex value {0}")]
    DanglingReference(u32),

    /// Configured recursion limit was exceeded during the process.
    #[error("recursion limit exceeded")]
    Recursion,

    /// An externalizable object has no registered external form and
    /// cannot be written.
    #[error("class '{class_name}' is externalizable and cannot be serialized")]
    NotSerializable { class_name: String },

    /// An object body does not agree with its traits.
    #[error("object body does not match its traits: {0}")]
    MalformedObject(&'static str),

    /// A length or count does not fit into a 29-bit integer.
    #[error("length {0} exceeds the 29-bit integer range")]
    LengthOverflow(usize),
}

/// The reference tables maintained while walking a graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    Strings,
    Traits,
    Objects,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strings => "string",
            Self::Traits => "traits",
            Self::Objects => "object",
        })
    }
}

/// How an externalizable class lays out its custom state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExternalForm {
    /// The external state is exactly one nested AMF3 value, as done
    /// by the Flex collection and proxy classes.
    WrappedValue,
}

/// Capability lookup for externalizable classes.
///
/// Only classes registered here can be read and written; any other
/// externalizable object makes a graph not decodable.
#[derive(Clone, Debug, Default)]
pub struct ExternalRegistry {
    forms: HashMap<String, ExternalForm>,
}

impl ExternalRegistry {
    /// Class aliases of the Flex framework which wrap a single value.
    pub const FLEX_WRAPPERS: &'static [&'static str] = &[
        "flex.messaging.io.ArrayCollection",
        "flex.messaging.io.ArrayList",
        "flex.messaging.io.ObjectProxy",
        "mx.collections.ArrayCollection",
        "mx.collections.ArrayList",
        "mx.utils.ObjectProxy",
    ];

    /// Creates a registry which knows no classes at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry which knows the Flex wrapper classes.
    pub fn with_flex_wrappers() -> Self {
        let mut this = Self::empty();
        for class in Self::FLEX_WRAPPERS {
            this.register(*class, ExternalForm::WrappedValue);
        }
        this
    }

    /// Registers the external form of the class `class_name`.
    pub fn register(&mut self, class_name: impl Into<String>, form: ExternalForm) {
        self.forms.insert(class_name.into(), form);
    }

    /// Looks up the external form of a class.
    pub fn lookup(&self, class_name: &str) -> Option<ExternalForm> {
        self.forms.get(class_name).copied()
    }
}

/// Serializer configuration which influences how data is interpreted.
#[derive(Clone, Debug)]
pub struct SerializerOptions {
    /// A recursion limit for nested data to avoid stack
    /// overflows during (de)serialization.
    pub recursion_limit: i8,
    /// The externalizable classes which can be processed.
    pub externals: ExternalRegistry,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            recursion_limit: i8::MAX,
            externals: ExternalRegistry::with_flex_wrappers(),
        }
    }
}

/// Why a graph could not be decoded.
#[cfg_attr(feature = "serde", derive(::serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndecodableKind {
    /// An object of an externalizable class with no registered
    /// external form.
    Externalizable { class_name: String },
    /// A type marker with no known decoding rule.
    UnknownMarker(u8),
}

/// Description of a graph which references a type the deserializer
/// has no decoding rule for.
#[cfg_attr(feature = "serde", derive(::serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Undecodable {
    pub kind: UndecodableKind,
    /// Byte offset into the input where decoding stopped.
    pub offset: usize,
}

impl fmt::Display for Undecodable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            UndecodableKind::Externalizable { class_name } => write!(
                f,
                "externalizable class '{class_name}' at offset {}",
                self.offset
            ),
            UndecodableKind::UnknownMarker(m) => {
                write!(f, "unknown type marker {m:#04x} at offset {}", self.offset)
            }
        }
    }
}

/// The result of deserializing a graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The graph was fully decoded from the first `consumed` bytes.
    Decoded { value: Value, consumed: usize },
    /// The graph references a type which cannot be interpreted.
    NotDecodable(Undecodable),
}

/// A serializer and deserializer for AMF3 values.
///
/// The serializer is immutable; all state of a (de)serialization run
/// is local to the call, so one instance may be shared between threads.
#[derive(Clone, Debug, Default)]
pub struct Serializer {
    /// The serializer configuration in use.
    pub options: SerializerOptions,
}

impl Serializer {
    /// Creates a new serializer with its configuration.
    pub fn new(options: SerializerOptions) -> Self {
        Self { options }
    }

    /// Deserializes one [`Value`] from the start of `data`.
    ///
    /// Bytes after the value are left untouched; the `consumed` count
    /// of a decoded [`Outcome`] tells where the value ended.
    pub fn deserialize(&self, data: &[u8]) -> Result<Outcome, Error> {
        log::debug!("Deserializing AMF3 value from {} bytes", data.len());
        de::Deserializer::new(&self.options, data).run()
    }

    /// Serializes `value` and appends the result to `out`.
    pub fn serialize(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        ser::Encoder::new(&self.options, out).run(value)
    }
}
