use byteorder::{BigEndian, WriteBytesExt};
use indexmap::IndexSet;

use super::{utils, Error, SerializerOptions};
use crate::value::*;

/// The state of a single serialization run.
///
/// The string and traits tables are rebuilt exactly the way a
/// deserializer builds them, so repeated strings and traits are
/// always written by reference.
pub(super) struct Encoder<'a> {
    options: &'a SerializerOptions,
    out: &'a mut Vec<u8>,

    recursion_left: i8,
    strings: IndexSet<String>,
    traits: IndexSet<Traits>,
    objects: u32,
}

impl<'a> Encoder<'a> {
    pub fn new(options: &'a SerializerOptions, out: &'a mut Vec<u8>) -> Self {
        Self {
            options,
            out,

            recursion_left: options.recursion_limit,
            strings: IndexSet::new(),
            traits: IndexSet::new(),
            objects: 0,
        }
    }

    pub fn run(mut self, value: &Value) -> Result<(), Error> {
        self.value(value)
    }

    fn with_recursion_limit<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.recursion_left -= 1;
        if self.recursion_left < 0 {
            return Err(Error::Recursion);
        }

        let res = f(self);

        self.recursion_left += 1;

        res
    }

    #[inline]
    fn marker(&mut self, marker: Marker) {
        self.out.push(marker as u8);
    }

    // Writes the marker and inline header of a new complex value
    // and claims its slot in the reference table.
    fn complex_header(&mut self, marker: Marker, len: usize) -> Result<(), Error> {
        self.marker(marker);
        utils::write_inline_header(self.out, len)?;
        self.objects += 1;

        Ok(())
    }

    fn value(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Undefined => self.marker(Marker::Undefined),
            Value::Null => self.marker(Marker::Null),
            Value::Bool(false) => self.marker(Marker::False),
            Value::Bool(true) => self.marker(Marker::True),

            // Integers outside of the 29-bit range must be promoted.
            &Value::Integer(v) if (utils::I29_MIN..=utils::I29_MAX).contains(&v) => {
                self.marker(Marker::Integer);
                utils::write_u29(self.out, v as u32 & utils::U29_MAX)?;
            }
            &Value::Integer(v) => {
                self.marker(Marker::Double);
                utils::write_f64(self.out, v as f64)?;
            }
            &Value::Double(v) => {
                self.marker(Marker::Double);
                utils::write_f64(self.out, v)?;
            }
            Value::String(s) => {
                self.marker(Marker::String);
                self.string(s)?;
            }

            Value::Reference(r) => {
                if r.index >= self.objects {
                    return Err(Error::DanglingReference(r.index));
                }

                self.marker(r.marker);
                utils::write_reference_header(self.out, r.index)?;
            }

            _ => return self.with_recursion_limit(|ser| ser.complex(value)),
        }

        Ok(())
    }

    fn complex(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::XmlDocument(s) => {
                self.complex_header(Marker::XmlDocument, s.len())?;
                self.out.extend_from_slice(s.as_bytes());
            }
            Value::Xml(s) => {
                self.complex_header(Marker::Xml, s.len())?;
                self.out.extend_from_slice(s.as_bytes());
            }
            Value::Date(date) => {
                // The header carries no payload for dates.
                self.complex_header(Marker::Date, 0)?;
                utils::write_f64(self.out, date.millis)?;
            }
            Value::ByteArray(bytes) => {
                self.complex_header(Marker::ByteArray, bytes.len())?;
                self.out.extend_from_slice(bytes);
            }

            Value::Array(array) => {
                self.complex_header(Marker::Array, array.dense.len())?;
                for (key, value) in &array.assoc {
                    if key.is_empty() {
                        return Err(Error::MalformedObject("empty associative array key"));
                    }

                    self.string(key)?;
                    self.value(value)?;
                }
                self.string("")?;

                for value in &array.dense {
                    self.value(value)?;
                }
            }

            Value::Object(object) => {
                self.marker(Marker::Object);
                self.objects += 1;
                self.object(object)?;
            }

            Value::VectorInt(vector) => {
                self.complex_header(Marker::VectorInt, vector.items.len())?;
                self.out.push(vector.fixed as u8);
                for &v in &vector.items {
                    self.out.write_i32::<BigEndian>(v)?;
                }
            }
            Value::VectorUint(vector) => {
                self.complex_header(Marker::VectorUint, vector.items.len())?;
                self.out.push(vector.fixed as u8);
                for &v in &vector.items {
                    self.out.write_u32::<BigEndian>(v)?;
                }
            }
            Value::VectorDouble(vector) => {
                self.complex_header(Marker::VectorDouble, vector.items.len())?;
                self.out.push(vector.fixed as u8);
                for &v in &vector.items {
                    utils::write_f64(self.out, v)?;
                }
            }
            Value::VectorObject(vector) => {
                self.complex_header(Marker::VectorObject, vector.items.len())?;
                self.out.push(vector.fixed as u8);
                self.string(&vector.type_name)?;
                for value in &vector.items {
                    self.value(value)?;
                }
            }

            Value::Dictionary(dict) => {
                self.complex_header(Marker::Dictionary, dict.entries.len())?;
                self.out.push(dict.weak_keys as u8);
                for (key, value) in &dict.entries {
                    self.value(key)?;
                    self.value(value)?;
                }
            }

            Value::Undefined
            | Value::Null
            | Value::Bool(..)
            | Value::Integer(..)
            | Value::Double(..)
            | Value::String(..)
            | Value::Reference(..) => unreachable!("scalar value handled by caller"),
        }

        Ok(())
    }

    fn object(&mut self, object: &Object) -> Result<(), Error> {
        let traits = &object.traits;

        if let Some(index) = self.traits.get_index_of(traits) {
            // U29O-traits-ref: index, traits reference bit, object bit.
            let header = u32::try_from(index)
                .ok()
                .filter(|&i| i < 1 << 27)
                .ok_or(Error::LengthOverflow(index))?;
            utils::write_u29(self.out, header << 2 | 0b01)?;
        } else {
            let count = traits.sealed_names.len();
            let header = u32::try_from(count)
                .ok()
                .filter(|&c| c < 1 << 25)
                .ok_or(Error::LengthOverflow(count))?;

            let header = header << 4
                | (traits.dynamic as u32) << 3
                | (traits.externalizable as u32) << 2
                | 0b11;
            utils::write_u29(self.out, header)?;

            self.string(&traits.class_name)?;
            for name in &traits.sealed_names {
                self.string(name)?;
            }

            self.traits.insert(traits.clone());
        }

        match (&object.body, traits.externalizable) {
            (ObjectBody::External(value), true) => {
                if self.options.externals.lookup(&traits.class_name).is_none() {
                    return Err(Error::NotSerializable {
                        class_name: traits.class_name.clone(),
                    });
                }

                self.value(value)?;
            }

            (ObjectBody::Members { sealed, dynamic }, false) => {
                if sealed.len() != traits.sealed_names.len() {
                    return Err(Error::MalformedObject("sealed member count mismatch"));
                }
                if !traits.dynamic && !dynamic.is_empty() {
                    return Err(Error::MalformedObject("dynamic members on a sealed class"));
                }

                for value in sealed {
                    self.value(value)?;
                }

                if traits.dynamic {
                    for (key, value) in dynamic {
                        if key.is_empty() {
                            return Err(Error::MalformedObject("empty dynamic member name"));
                        }

                        self.string(key)?;
                        self.value(value)?;
                    }
                    self.string("")?;
                }
            }

            (ObjectBody::External(..), false) => {
                return Err(Error::MalformedObject(
                    "external body on a non-externalizable class",
                ))
            }
            (ObjectBody::Members { .. }, true) => {
                return Err(Error::NotSerializable {
                    class_name: traits.class_name.clone(),
                })
            }
        }

        Ok(())
    }

    fn string(&mut self, s: &str) -> Result<(), Error> {
        if s.is_empty() {
            return utils::write_inline_header(self.out, 0);
        }

        match self.strings.get_index_of(s) {
            Some(index) => {
                let index = u32::try_from(index).map_err(|_| Error::LengthOverflow(index))?;
                utils::write_reference_header(self.out, index)
            }
            None => {
                utils::write_inline_header(self.out, s.len())?;
                self.out.extend_from_slice(s.as_bytes());
                self.strings.insert(s.to_owned());

                Ok(())
            }
        }
    }
}
