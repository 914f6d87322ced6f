//! Field values held by a [`Record`].

use crate::record::Record;
use crate::schema::FieldKind;

/// The value of one field. Message fields always hold a sequence, even when singular
/// (then it has at most one element).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt32(u32),
    String(String),
    Messages(Vec<Record>),
}

impl Value {
    /// Value of a field that was never set.
    pub fn default_for(kind: &FieldKind) -> Value {
        match kind {
            FieldKind::UInt32 => Value::UInt32(0),
            FieldKind::String => Value::String(String::new()),
            FieldKind::Message(_) => Value::Messages(Vec::new()),
        }
    }

    /// Default values are not written to the wire.
    pub fn is_default(&self) -> bool {
        match self {
            Value::UInt32(x) => *x == 0,
            Value::String(s) => s.is_empty(),
            Value::Messages(m) => m.is_empty(),
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::UInt32(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_messages(&self) -> Option<&[Record]> {
        match self {
            Value::Messages(m) => Some(m),
            _ => None,
        }
    }
}
