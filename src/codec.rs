//! Encode/decode records to and from the protobuf binary wire format.
//!
//! Supports varint (`uint32`) and length-delimited (`string`, nested message) fields.
//! Default values are not written; decoding accepts fields in any order and repeated
//! message fields split across the buffer.

use crate::record::Record;
use crate::schema::{same_schema, FieldKind, Schema};
use crate::tag::{FieldTag, TagError, WireType};
use crate::value::Value;
use crate::varint::{read_length_delimited_span, read_varint, write_length_delimited, write_varint};
use std::io::Cursor;
use std::sync::Arc;

/// Errors from encoding or decoding. Decode errors carry the absolute byte offset in the
/// input buffer where the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("malformed varint at byte {offset}")]
    MalformedVarint { offset: usize },
    #[error("truncated message at byte {offset}")]
    TruncatedMessage { offset: usize },
    #[error("unknown wire type {wire_type} at byte {offset}")]
    UnknownWireType { wire_type: u8, offset: usize },
    #[error("unknown field {number} in {schema} at byte {offset}")]
    UnknownField {
        schema: String,
        number: u32,
        offset: usize,
    },
    #[error("{schema}.{field}: expected {expected} wire type, found {found} at byte {offset}")]
    WireTypeMismatch {
        schema: String,
        field: String,
        expected: WireType,
        found: WireType,
        offset: usize,
    },
    #[error("{schema}.{field}: invalid UTF-8 at byte {offset}")]
    InvalidEncoding {
        schema: String,
        field: String,
        offset: usize,
    },
    #[error("cannot encode a {found} record as {expected}")]
    SchemaMismatch { expected: String, found: String },
    #[error("length {len} does not fit a uint32 length prefix")]
    LengthOverflow { len: usize },
}

impl CodecError {
    /// Byte offset of a decode error.
    pub fn offset(&self) -> Option<usize> {
        match self {
            CodecError::MalformedVarint { offset }
            | CodecError::TruncatedMessage { offset }
            | CodecError::UnknownWireType { offset, .. }
            | CodecError::UnknownField { offset, .. }
            | CodecError::WireTypeMismatch { offset, .. }
            | CodecError::InvalidEncoding { offset, .. } => Some(*offset),
            CodecError::SchemaMismatch { .. } | CodecError::LengthOverflow { .. } => None,
        }
    }
}

/// Serialize `record` as a `schema` message.
///
/// Fields are written in schema declaration order; repeated message fields produce one
/// tag per element in insertion order. Fails if `record`, or any child below it, is bound
/// to a schema other than the one its position calls for.
pub fn encode(record: &Record, schema: &Schema) -> Result<Vec<u8>, CodecError> {
    check_schema(record, schema)?;
    let mut out = Vec::new();
    encode_fields(&mut out, record)?;
    Ok(out)
}

fn check_schema(record: &Record, expected: &Schema) -> Result<(), CodecError> {
    if !same_schema(record.schema(), expected) {
        return Err(CodecError::SchemaMismatch {
            expected: expected.name().to_string(),
            found: record.schema().name().to_string(),
        });
    }
    Ok(())
}

fn encode_fields(w: &mut Vec<u8>, record: &Record) -> Result<(), CodecError> {
    for (field, value) in record.iter() {
        if value.is_default() {
            continue;
        }
        match (value, &field.kind) {
            (Value::UInt32(v), _) => {
                write_varint(w, FieldTag::new(field.number, WireType::Varint).pack());
                write_varint(w, *v);
            }
            (Value::String(s), _) => {
                write_varint(w, FieldTag::new(field.number, WireType::LengthDelimited).pack());
                write_length_delimited(w, s.as_bytes())?;
            }
            (Value::Messages(children), FieldKind::Message(child_schema)) => {
                for child in children {
                    // Children reached through `messages_mut` are not checked on assignment.
                    check_schema(child, child_schema)?;
                    let mut body = Vec::new();
                    encode_fields(&mut body, child)?;
                    write_varint(w, FieldTag::new(field.number, WireType::LengthDelimited).pack());
                    write_length_delimited(w, &body)?;
                }
            }
            (Value::Messages(_), _) => {}
        }
    }
    Ok(())
}

/// Parse a complete `schema` message from `bytes`.
///
/// Scalar fields seen more than once keep the last occurrence, as do singular message
/// fields; repeated message fields append in the order their tags appear.
pub fn decode(bytes: &[u8], schema: &Arc<Schema>) -> Result<Record, CodecError> {
    decode_span(bytes, 0, schema)
}

/// Decode the message occupying `bytes[start..]`. Offsets in errors are positions in `bytes`.
pub(crate) fn decode_span(
    bytes: &[u8],
    start: usize,
    schema: &Arc<Schema>,
) -> Result<Record, CodecError> {
    let mut r = Cursor::new(bytes);
    r.set_position(start as u64);
    let mut record = Record::new(Arc::clone(schema));

    while (r.position() as usize) < bytes.len() {
        let offset = r.position() as usize;
        let tag = read_varint(&mut r)?;
        let FieldTag { number, wire_type } = FieldTag::unpack(tag).map_err(|e| match e {
            TagError::UnknownWireType(wire_type) => CodecError::UnknownWireType { wire_type, offset },
            TagError::ZeroFieldNumber => CodecError::UnknownField {
                schema: schema.name().to_string(),
                number: 0,
                offset,
            },
        })?;
        let index = schema.index_of(number).ok_or_else(|| CodecError::UnknownField {
            schema: schema.name().to_string(),
            number,
            offset,
        })?;
        let field = &schema.fields()[index];
        if field.wire_type() != wire_type {
            return Err(CodecError::WireTypeMismatch {
                schema: schema.name().to_string(),
                field: field.name.clone(),
                expected: field.wire_type(),
                found: wire_type,
                offset,
            });
        }

        // A tag with nothing after it is a cut, not a malformed value.
        if r.position() as usize >= bytes.len() {
            return Err(CodecError::TruncatedMessage {
                offset: r.position() as usize,
            });
        }
        match &field.kind {
            FieldKind::UInt32 => {
                let v = read_varint(&mut r)?;
                record.set_value(index, Value::UInt32(v));
            }
            FieldKind::String => {
                let span = read_length_delimited_span(&mut r)?;
                let text = std::str::from_utf8(&bytes[span.clone()]).map_err(|e| {
                    CodecError::InvalidEncoding {
                        schema: schema.name().to_string(),
                        field: field.name.clone(),
                        offset: span.start + e.valid_up_to(),
                    }
                })?;
                record.set_value(index, Value::String(text.to_string()));
            }
            FieldKind::Message(child_schema) => {
                let span = read_length_delimited_span(&mut r)?;
                // Bounding the slice at the span end keeps child reads inside the child.
                let child = decode_span(&bytes[..span.end], span.start, child_schema)?;
                record.store_message(index, child);
            }
        }
    }
    log::trace!("decoded {} from bytes {}..{}", schema.name(), start, bytes.len());
    Ok(record)
}
