use indexmap::IndexMap;

use super::Value;

/// The class description shared by objects of the same type.
///
/// Traits are written once per graph and referenced afterwards.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Traits {
    /// The registered alias of the class; empty for anonymous objects.
    pub class_name: String,
    /// Names of the sealed members, in serialization order.
    pub sealed_names: Vec<String>,
    /// Whether objects may carry additional dynamic members.
    pub dynamic: bool,
    /// Whether the class serializes itself in a custom format.
    pub externalizable: bool,
}

impl Traits {
    /// Creates traits for an anonymous, dynamic `Object`.
    pub fn anonymous() -> Self {
        Self {
            dynamic: true,
            ..Default::default()
        }
    }
}

/// The serialized state of an [`Object`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ObjectBody {
    /// Regular member values.
    Members {
        /// Values of the sealed members, matching the order of
        /// [`Traits::sealed_names`].
        sealed: Vec<Value>,
        /// Dynamic members in stream order.
        dynamic: IndexMap<String, Value>,
    },
    /// The custom representation of an externalizable class.
    External(Value),
}

/// Representation of a typed object in an AMF3 graph.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Object {
    pub traits: Traits,
    pub body: ObjectBody,
}

impl Object {
    /// Creates an anonymous object from dynamic members.
    pub fn anonymous(members: IndexMap<String, Value>) -> Self {
        Self {
            traits: Traits::anonymous(),
            body: ObjectBody::Members {
                sealed: Vec::new(),
                dynamic: members,
            },
        }
    }

    /// Looks up a member value by name, sealed members first.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match &self.body {
            ObjectBody::Members { sealed, dynamic } => self
                .traits
                .sealed_names
                .iter()
                .position(|n| n == name)
                .and_then(|i| sealed.get(i))
                .or_else(|| dynamic.get(name)),
            ObjectBody::External(..) => None,
        }
    }
}
