use std::ops::ControlFlow;

use byteorder::{BigEndian, ReadBytesExt};
use indexmap::IndexMap;

use super::{
    utils, Error, ExternalForm, Outcome, SerializerOptions, Table, Undecodable, UndecodableKind,
};
use crate::value::*;

type Step = ControlFlow<Undecodable, Value>;

/// The state of a single deserialization run.
pub(super) struct Deserializer<'a> {
    options: &'a SerializerOptions,
    input_len: usize,
    data: &'a [u8],

    recursion_left: i8,
    strings: Vec<String>,
    traits: Vec<Traits>,
    // Only the number of complex values is needed to validate
    // references; the values themselves stay in the graph.
    objects: u32,
}

impl<'a> Deserializer<'a> {
    pub fn new(options: &'a SerializerOptions, data: &'a [u8]) -> Self {
        Self {
            options,
            input_len: data.len(),
            data,

            recursion_left: options.recursion_limit,
            strings: Vec::new(),
            traits: Vec::new(),
            objects: 0,
        }
    }

    pub fn run(mut self) -> Result<Outcome, Error> {
        Ok(match self.value()? {
            ControlFlow::Continue(value) => Outcome::Decoded {
                value,
                consumed: self.offset(),
            },
            ControlFlow::Break(undecodable) => Outcome::NotDecodable(undecodable),
        })
    }

    #[inline]
    fn offset(&self) -> usize {
        self.input_len - self.data.len()
    }

    fn stop(&self, kind: UndecodableKind, offset: usize) -> Result<Step, Error> {
        log::debug!("Stopping AMF3 decoding at offset {offset}: {kind:?}");
        Ok(ControlFlow::Break(Undecodable { kind, offset }))
    }

    fn with_recursion_limit<F>(&mut self, f: F) -> Result<Step, Error>
    where
        F: FnOnce(&mut Self) -> Result<Step, Error>,
    {
        self.recursion_left -= 1;
        if self.recursion_left < 0 {
            return Err(Error::Recursion);
        }

        let res = f(self);

        self.recursion_left += 1;

        res
    }

    fn value(&mut self) -> Result<Step, Error> {
        let offset = self.offset();
        let marker = match Marker::try_from(self.data.read_u8()?) {
            Ok(marker) => marker,
            Err(m) => return self.stop(UndecodableKind::UnknownMarker(m), offset),
        };

        let value = match marker {
            Marker::Undefined => Value::Undefined,
            Marker::Null => Value::Null,
            Marker::False => Value::Bool(false),
            Marker::True => Value::Bool(true),
            Marker::Integer => Value::Integer(utils::sign_extend_i29(utils::read_u29(
                &mut self.data,
            )?)),
            Marker::Double => Value::Double(utils::read_f64(&mut self.data)?),
            Marker::String => Value::String(self.string()?),

            _ => return self.with_recursion_limit(|de| de.complex(marker, offset)),
        };

        Ok(ControlFlow::Continue(value))
    }

    fn complex(&mut self, marker: Marker, offset: usize) -> Result<Step, Error> {
        let header = utils::read_u29(&mut self.data)?;
        if header & 1 == 0 {
            let index = header >> 1;
            if index >= self.objects {
                return Err(Error::InvalidReference {
                    table: Table::Objects,
                    index,
                });
            }

            return Ok(ControlFlow::Continue(Value::Reference(Reference {
                marker,
                index,
            })));
        }

        // Complex values are registered before their children are read,
        // so that nested references can point back to their parents.
        self.objects += 1;
        let header = header >> 1;
        let len = header as usize;

        let value = match marker {
            Marker::XmlDocument => Value::XmlDocument(self.utf8(len)?),
            Marker::Xml => Value::Xml(self.utf8(len)?),
            Marker::Date => Value::Date(Date {
                millis: utils::read_f64(&mut self.data)?,
            }),
            Marker::ByteArray => Value::ByteArray(self.bytes(len)?.to_vec()),

            Marker::Array => {
                let mut array = Array::default();
                loop {
                    let key = self.string()?;
                    if key.is_empty() {
                        break;
                    }

                    let value = step!(self.value());
                    array.assoc.insert(key, value);
                }

                array.dense.reserve(len.min(self.data.len()));
                for _ in 0..len {
                    array.dense.push(step!(self.value()));
                }

                Value::Array(Box::new(array))
            }

            Marker::Object => return self.object(header, offset),

            Marker::VectorInt => {
                let fixed = self.data.read_u8()? != 0;
                let mut items = Vec::with_capacity(len.min(self.data.len() / 4));
                for _ in 0..len {
                    items.push(self.data.read_i32::<BigEndian>()?);
                }

                Value::VectorInt(Vector { fixed, items })
            }
            Marker::VectorUint => {
                let fixed = self.data.read_u8()? != 0;
                let mut items = Vec::with_capacity(len.min(self.data.len() / 4));
                for _ in 0..len {
                    items.push(self.data.read_u32::<BigEndian>()?);
                }

                Value::VectorUint(Vector { fixed, items })
            }
            Marker::VectorDouble => {
                let fixed = self.data.read_u8()? != 0;
                let mut items = Vec::with_capacity(len.min(self.data.len() / 8));
                for _ in 0..len {
                    items.push(utils::read_f64(&mut self.data)?);
                }

                Value::VectorDouble(Vector { fixed, items })
            }
            Marker::VectorObject => {
                let fixed = self.data.read_u8()? != 0;
                let type_name = self.string()?;
                let mut items = Vec::with_capacity(len.min(self.data.len()));
                for _ in 0..len {
                    items.push(step!(self.value()));
                }

                Value::VectorObject(Box::new(ObjectVector {
                    fixed,
                    type_name,
                    items,
                }))
            }

            Marker::Dictionary => {
                let weak_keys = self.data.read_u8()? != 0;
                let mut entries = Vec::with_capacity(len.min(self.data.len()));
                for _ in 0..len {
                    let key = step!(self.value());
                    let value = step!(self.value());
                    entries.push((key, value));
                }

                Value::Dictionary(Box::new(Dictionary { weak_keys, entries }))
            }

            Marker::Undefined
            | Marker::Null
            | Marker::False
            | Marker::True
            | Marker::Integer
            | Marker::Double
            | Marker::String => unreachable!("scalar marker {marker:?} handled by caller"),
        };

        Ok(ControlFlow::Continue(value))
    }

    // `header` is the U29O value with the inline object bit shifted out,
    // `offset` the position of the object's type marker.
    fn object(&mut self, header: u32, offset: usize) -> Result<Step, Error> {
        let traits = if header & 1 == 0 {
            let index = header >> 1;
            self.traits
                .get(index as usize)
                .cloned()
                .ok_or(Error::InvalidReference {
                    table: Table::Traits,
                    index,
                })?
        } else {
            let externalizable = header & 0b010 != 0;
            let dynamic = header & 0b100 != 0;
            let sealed_count = (header >> 3) as usize;

            let class_name = self.string()?;
            let mut sealed_names = Vec::with_capacity(sealed_count.min(self.data.len()));
            for _ in 0..sealed_count {
                sealed_names.push(self.string()?);
            }

            let traits = Traits {
                class_name,
                sealed_names,
                dynamic,
                externalizable,
            };
            self.traits.push(traits.clone());

            traits
        };

        log::trace!("Reading object of class '{}'", traits.class_name);

        let body = if traits.externalizable {
            match self.options.externals.lookup(&traits.class_name) {
                Some(ExternalForm::WrappedValue) => ObjectBody::External(step!(self.value())),
                None => {
                    return self.stop(
                        UndecodableKind::Externalizable {
                            class_name: traits.class_name,
                        },
                        offset,
                    )
                }
            }
        } else {
            let mut sealed = Vec::with_capacity(traits.sealed_names.len());
            for _ in 0..traits.sealed_names.len() {
                sealed.push(step!(self.value()));
            }

            let mut dynamic = IndexMap::new();
            if traits.dynamic {
                loop {
                    let key = self.string()?;
                    if key.is_empty() {
                        break;
                    }

                    let value = step!(self.value());
                    dynamic.insert(key, value);
                }
            }

            ObjectBody::Members { sealed, dynamic }
        };

        Ok(ControlFlow::Continue(Value::Object(Box::new(Object {
            traits,
            body,
        }))))
    }

    fn string(&mut self) -> Result<String, Error> {
        let header = utils::read_u29(&mut self.data)?;
        if header & 1 == 0 {
            let index = header >> 1;
            return self
                .strings
                .get(index as usize)
                .cloned()
                .ok_or(Error::InvalidReference {
                    table: Table::Strings,
                    index,
                });
        }

        // The empty string is never entered into the reference table.
        let len = (header >> 1) as usize;
        if len == 0 {
            return Ok(String::new());
        }

        let s = self.utf8(len)?;
        self.strings.push(s.clone());

        Ok(s)
    }

    fn utf8(&mut self, len: usize) -> Result<String, Error> {
        let bytes = self.bytes(len)?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], Error> {
        let (bytes, rest) = self.data.split_at_checked(len).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "reached premature EOF")
        })?;
        self.data = rest;

        Ok(bytes)
    }
}
