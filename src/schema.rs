//! Message schemas: the static field layout a [`Record`](crate::Record) is bound to.
//!
//! Schemas are plain data. Nested-message fields hold an `Arc` to the child schema, so a set
//! of schemas forms a DAG (e.g. `Data -> Route -> Stop`) that records can share cheaply.

use crate::tag::{WireType, MAX_FIELD_NUMBER};
use std::collections::HashMap;
use std::sync::Arc;

/// Value kind of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    UInt32,
    String,
    Message(Arc<Schema>),
}

impl FieldKind {
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldKind::UInt32 => WireType::Varint,
            FieldKind::String | FieldKind::Message(_) => WireType::LengthDelimited,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::UInt32 => "uint32",
            FieldKind::String => "string",
            FieldKind::Message(_) => "message",
        }
    }

    pub fn child_schema(&self) -> Option<&Arc<Schema>> {
        match self {
            FieldKind::Message(s) => Some(s),
            _ => None,
        }
    }
}

/// How a uint32 field is rendered by [`crate::dump`]. Has no effect on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldDisplay {
    #[default]
    Plain,
    /// Minutes after midnight, shown as `H:MM`.
    TimeOfDay,
    /// Weekday bitmask, shown Monday first as `1111100`.
    OperatingDays,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub number: u32,
    pub name: String,
    pub kind: FieldKind,
    pub repeated: bool,
    pub display: FieldDisplay,
}

impl FieldDescriptor {
    pub fn uint32(number: u32, name: &str) -> Self {
        Self::singular(number, name, FieldKind::UInt32)
    }

    pub fn string(number: u32, name: &str) -> Self {
        Self::singular(number, name, FieldKind::String)
    }

    pub fn message(number: u32, name: &str, child: &Arc<Schema>) -> Self {
        Self::singular(number, name, FieldKind::Message(Arc::clone(child)))
    }

    pub fn repeated_message(number: u32, name: &str, child: &Arc<Schema>) -> Self {
        FieldDescriptor {
            repeated: true,
            ..Self::message(number, name, child)
        }
    }

    pub fn with_display(mut self, display: FieldDisplay) -> Self {
        self.display = display;
        self
    }

    pub fn wire_type(&self) -> WireType {
        self.kind.wire_type()
    }

    fn singular(number: u32, name: &str, kind: FieldKind) -> Self {
        FieldDescriptor {
            number,
            name: name.to_string(),
            kind,
            repeated: false,
            display: FieldDisplay::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{schema}: field number {number} outside 1..={max}", max = MAX_FIELD_NUMBER)]
    InvalidFieldNumber { schema: String, number: u32 },
    #[error("{schema}: duplicate field number {number}")]
    DuplicateFieldNumber { schema: String, number: u32 },
    #[error("{schema}: duplicate field name {name}")]
    DuplicateFieldName { schema: String, name: String },
    #[error("{schema}.{field}: only message fields may be repeated")]
    RepeatedScalar { schema: String, field: String },
    #[error("{schema}: no field {number}")]
    NoSuchField { schema: String, number: u32 },
    #[error("{schema}.{field}: is a {found} field, not {expected}")]
    KindMismatch {
        schema: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{schema}.{field}: expects {expected} records, got {found}")]
    ChildSchemaMismatch {
        schema: String,
        field: String,
        expected: String,
        found: String,
    },
}

/// One message type: a name and its fields in declaration order.
///
/// Declaration order is the order the encoder emits fields in.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
    by_number: HashMap<u32, usize>,
}

impl Schema {
    /// Build a schema. Field numbers must be unique and in `1..=MAX_FIELD_NUMBER`, names
    /// unique, and only message fields repeated.
    pub fn new(name: &str, fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        let mut by_number = HashMap::with_capacity(fields.len());
        for (i, f) in fields.iter().enumerate() {
            if f.number == 0 || f.number > MAX_FIELD_NUMBER {
                return Err(SchemaError::InvalidFieldNumber {
                    schema: name.to_string(),
                    number: f.number,
                });
            }
            if by_number.insert(f.number, i).is_some() {
                return Err(SchemaError::DuplicateFieldNumber {
                    schema: name.to_string(),
                    number: f.number,
                });
            }
            if fields[..i].iter().any(|g| g.name == f.name) {
                return Err(SchemaError::DuplicateFieldName {
                    schema: name.to_string(),
                    name: f.name.clone(),
                });
            }
            if f.repeated && !matches!(f.kind, FieldKind::Message(_)) {
                return Err(SchemaError::RepeatedScalar {
                    schema: name.to_string(),
                    field: f.name.clone(),
                });
            }
        }
        Ok(Schema {
            name: name.to_string(),
            fields,
            by_number,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, number: u32) -> Option<&FieldDescriptor> {
        self.index_of(number).map(|i| &self.fields[i])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of field `number` in declaration order.
    pub fn index_of(&self, number: u32) -> Option<usize> {
        self.by_number.get(&number).copied()
    }

    pub(crate) fn no_such_field(&self, number: u32) -> SchemaError {
        SchemaError::NoSuchField {
            schema: self.name.clone(),
            number,
        }
    }
}

/// Same schema, either the same allocation or structurally equal.
pub(crate) fn same_schema(a: &Arc<Schema>, b: &Schema) -> bool {
    std::ptr::eq(Arc::as_ptr(a), b) || **a == *b
}
