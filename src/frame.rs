//! Length-delimited record streams: each record is written as a varint byte length followed
//! by its encoding (protobuf "delimited" framing).
//!
//! When a frame's length prefix is intact but its body does not decode, the frame is
//! rejected and decoding continues with the next one.

use crate::codec::{decode_span, encode, CodecError};
use crate::record::Record;
use crate::schema::Schema;
use crate::varint::{read_length_delimited_span, write_length_delimited};
use std::io::Cursor;
use std::sync::Arc;

/// Result of decoding a stream: records that decoded and frames that did not.
#[derive(Debug)]
pub struct StreamDecodeResult {
    pub records: Vec<DecodedRecord>,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug)]
pub struct DecodedRecord {
    pub record: Record,
    /// Body bytes, excluding the length prefix.
    pub byte_range: (usize, usize),
}

#[derive(Debug)]
pub struct RejectedRecord {
    pub byte_range: (usize, usize),
    pub error: CodecError,
}

/// Encode each record with a length prefix.
pub fn encode_delimited<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    schema: &Schema,
) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    for record in records {
        let body = encode(record, schema)?;
        write_length_delimited(&mut out, &body)?;
    }
    Ok(out)
}

/// Decode a stream of length-delimited `schema` records.
///
/// A bad frame body is recorded in `rejected`. A truncated or malformed length prefix, or a
/// frame running past the end of `bytes`, ends decoding with an error.
pub fn decode_delimited(
    bytes: &[u8],
    schema: &Arc<Schema>,
) -> Result<StreamDecodeResult, CodecError> {
    let mut records = Vec::new();
    let mut rejected = Vec::new();
    let mut r = Cursor::new(bytes);

    while (r.position() as usize) < bytes.len() {
        let span = read_length_delimited_span(&mut r)?;
        match decode_span(&bytes[..span.end], span.start, schema) {
            Ok(record) => records.push(DecodedRecord {
                record,
                byte_range: (span.start, span.end),
            }),
            Err(error) => {
                log::debug!(
                    "rejected {} frame at bytes {}..{}: {}",
                    schema.name(),
                    span.start,
                    span.end,
                    error
                );
                rejected.push(RejectedRecord {
                    byte_range: (span.start, span.end),
                    error,
                });
            }
        }
    }

    Ok(StreamDecodeResult { records, rejected })
}
