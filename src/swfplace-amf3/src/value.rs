//! Value representations for dynamic AMF3 object graphs.
//!
//! Values have dynamic types and can be composed, at the cost of
//! incurring memory and performance overhead.

mod object;
pub use object::*;

mod marker;
pub use marker::*;

use indexmap::IndexMap;

/// A runtime value from an AMF3 object graph.
///
/// Its type is dynamically assigned at runtime, which mandates
/// appropriate checks for interpreting its contents.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The `undefined` value.
    Undefined,
    /// The `null` value.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A signed 29-bit integer value.
    ///
    /// Values outside `-2^28..2^28` do not fit the integer marker and are
    /// serialized as doubles, so they decode back as [`Value::Double`].
    Integer(i32),
    /// A double-precision floating-point value.
    Double(f64),
    /// A UTF-8 string.
    String(String),

    /// A legacy `flash.xml.XMLDocument` in its string form.
    XmlDocument(String),
    /// A point in time.
    Date(Date),
    /// An ActionScript array with associative and dense parts.
    Array(Box<Array>),
    /// An object which maps member names to values.
    Object(Box<Object>),
    /// An E4X `XML` value in its string form.
    Xml(String),
    /// A `flash.utils.ByteArray`.
    ByteArray(Vec<u8>),

    /// A `Vector.<int>`.
    VectorInt(Vector<i32>),
    /// A `Vector.<uint>`.
    VectorUint(Vector<u32>),
    /// A `Vector.<Number>`.
    VectorDouble(Vector<f64>),
    /// A vector of values of a named type.
    VectorObject(Box<ObjectVector>),
    /// A `flash.utils.Dictionary`.
    Dictionary(Box<Dictionary>),

    /// A back-reference to a complex value which already occurred
    /// earlier in the same graph.
    Reference(Reference),
}

/// Milliseconds since the UNIX epoch, in UTC.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Date {
    pub millis: f64,
}

/// An ActionScript array.
///
/// Associative members are serialized before the dense portion.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Array {
    /// Members with string keys, in stream order.
    pub assoc: IndexMap<String, Value>,
    /// Members with ordinal indices.
    pub dense: Vec<Value>,
}

/// A vector of primitive elements.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vector<T> {
    /// Whether the vector has a fixed length.
    pub fixed: bool,
    pub items: Vec<T>,
}

/// A vector of values of a named element type.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectVector {
    /// Whether the vector has a fixed length.
    pub fixed: bool,
    /// The fully qualified element type name; empty for `*`.
    pub type_name: String,
    pub items: Vec<Value>,
}

/// A dictionary with arbitrary values as keys.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dictionary {
    /// Whether the dictionary holds its keys weakly.
    pub weak_keys: bool,
    pub entries: Vec<(Value, Value)>,
}

/// A reference into the table of complex values of a graph.
///
/// Every complex value (anything but the scalar types and strings)
/// occupies the next index of that table when it is first seen, in
/// the order of a depth-first walk of the graph. Parents are counted
/// before their children, which allows cyclic graphs.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reference {
    /// The type marker the reference was written under.
    pub marker: Marker,
    /// Index into the complex value table.
    pub index: u32,
}
