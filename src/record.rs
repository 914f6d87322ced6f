//! In-memory message instances.

use crate::schema::{same_schema, FieldDescriptor, FieldKind, Schema, SchemaError};
use crate::value::Value;
use std::sync::Arc;

/// One message instance bound to a [`Schema`].
///
/// Every field holds a value from construction: `0`, `""` or an empty sequence. Child records
/// are owned by their parent; there is no sharing between trees.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    /// Indexed like `schema.fields()`.
    values: Vec<Value>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        same_schema(&self.schema, &other.schema) && self.values == other.values
    }
}

impl Record {
    /// Empty record: all fields at their default values.
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| Value::default_for(&f.kind))
            .collect();
        Record { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, number: u32) -> Option<&Value> {
        self.schema.index_of(number).map(|i| &self.values[i])
    }

    /// Fields with their values, in schema declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.schema.fields().iter().zip(self.values.iter())
    }

    /// True if no field differs from its default.
    pub fn is_default(&self) -> bool {
        self.values.iter().all(Value::is_default)
    }

    pub fn u32(&self, number: u32) -> Result<u32, SchemaError> {
        let i = self.index_for(number, "uint32")?;
        Ok(self.values[i].as_u32().unwrap_or_default())
    }

    pub fn set_u32(&mut self, number: u32, value: u32) -> Result<(), SchemaError> {
        let i = self.index_for(number, "uint32")?;
        self.values[i] = Value::UInt32(value);
        Ok(())
    }

    pub fn string(&self, number: u32) -> Result<&str, SchemaError> {
        let i = self.index_for(number, "string")?;
        Ok(self.values[i].as_str().unwrap_or_default())
    }

    pub fn set_string(&mut self, number: u32, value: impl Into<String>) -> Result<(), SchemaError> {
        let i = self.index_for(number, "string")?;
        self.values[i] = Value::String(value.into());
        Ok(())
    }

    /// Children of a message field, in insertion order.
    pub fn messages(&self, number: u32) -> Result<&[Record], SchemaError> {
        let i = self.index_for(number, "message")?;
        Ok(self.values[i].as_messages().unwrap_or_default())
    }

    /// Children of a message field, mutable in place.
    pub fn messages_mut(&mut self, number: u32) -> Result<&mut [Record], SchemaError> {
        let i = self.index_for(number, "message")?;
        Ok(self.children_mut(i))
    }

    /// Append `child` to a repeated message field, or replace the value of a singular one.
    /// `child` must be bound to the field's message schema.
    pub fn push_message(&mut self, number: u32, child: Record) -> Result<(), SchemaError> {
        let i = self.index_for(number, "message")?;
        let field = &self.schema.fields()[i];
        if let FieldKind::Message(expected) = &field.kind {
            if !same_schema(expected, &child.schema) {
                return Err(SchemaError::ChildSchemaMismatch {
                    schema: self.schema.name().to_string(),
                    field: field.name.clone(),
                    expected: expected.name().to_string(),
                    found: child.schema.name().to_string(),
                });
            }
        }
        self.store_message(i, child);
        Ok(())
    }

    /// Append (or for a singular field, set) an empty child and return it for population.
    pub fn add_message(&mut self, number: u32) -> Result<&mut Record, SchemaError> {
        let i = self.index_for(number, "message")?;
        let child_schema = match &self.schema.fields()[i].kind {
            FieldKind::Message(s) => Arc::clone(s),
            _ => return Err(self.schema.no_such_field(number)),
        };
        self.store_message(i, Record::new(child_schema));
        let children = self.children_mut(i);
        let last = children.len() - 1;
        Ok(&mut children[last])
    }

    /// Reset a field to its default value.
    pub fn clear(&mut self, number: u32) -> Result<(), SchemaError> {
        let i = self
            .schema
            .index_of(number)
            .ok_or_else(|| self.schema.no_such_field(number))?;
        self.values[i] = Value::default_for(&self.schema.fields()[i].kind);
        Ok(())
    }

    pub(crate) fn set_value(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }

    /// Singular message fields keep only the latest child.
    pub(crate) fn store_message(&mut self, index: usize, child: Record) {
        let repeated = self.schema.fields()[index].repeated;
        if let Value::Messages(children) = &mut self.values[index] {
            if !repeated {
                children.clear();
            }
            children.push(child);
        }
    }

    fn children_mut(&mut self, index: usize) -> &mut [Record] {
        match &mut self.values[index] {
            Value::Messages(children) => children,
            _ => &mut [],
        }
    }

    fn index_for(&self, number: u32, expected: &'static str) -> Result<usize, SchemaError> {
        let i = self
            .schema
            .index_of(number)
            .ok_or_else(|| self.schema.no_such_field(number))?;
        let field = &self.schema.fields()[i];
        if field.kind.name() != expected {
            return Err(SchemaError::KindMismatch {
                schema: self.schema.name().to_string(),
                field: field.name.clone(),
                expected,
                found: field.kind.name(),
            });
        }
        Ok(i)
    }
}
