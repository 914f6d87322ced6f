//! Base-128 varints and length-delimited spans (protobuf wire encoding).
//!
//! Varints carry 7 payload bits per byte, low-order group first; the MSB (0x80) is set on
//! every byte except the last. Only unsigned 32-bit values are supported, so a varint is at
//! most [`MAX_VARINT_LEN`] bytes long.

use crate::codec::CodecError;
use byteorder::ReadBytesExt;
use std::io::Cursor;
use std::ops::Range;

/// Longest varint encoding of a `u32`.
pub const MAX_VARINT_LEN: usize = 5;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7f;

/// Encode `value` as a varint. `0` encodes as a single zero byte.
pub fn encode_varint(value: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(varint_len(value));
    write_varint(&mut out, value);
    out
}

/// Append the varint encoding of `value` to `w`.
pub fn write_varint(w: &mut Vec<u8>, mut value: u32) {
    while value >= u32::from(CONTINUATION) {
        w.push((value as u8 & PAYLOAD) | CONTINUATION);
        value >>= 7;
    }
    w.push(value as u8);
}

/// Number of bytes `encode_varint(value)` produces.
pub fn varint_len(value: u32) -> usize {
    match value {
        0..=0x7f => 1,
        0x80..=0x3fff => 2,
        0x4000..=0x1f_ffff => 3,
        0x20_0000..=0x0fff_ffff => 4,
        _ => 5,
    }
}

/// Decode a varint starting at `offset`. Returns the value and the offset just past it.
pub fn decode_varint(bytes: &[u8], offset: usize) -> Result<(u32, usize), CodecError> {
    let mut r = Cursor::new(bytes);
    r.set_position(offset as u64);
    let value = read_varint(&mut r)?;
    Ok((value, r.position() as usize))
}

/// `encode_varint(len) ++ bytes`.
pub fn encode_length_delimited(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let len = length_prefix(bytes.len())?;
    let mut out = Vec::with_capacity(varint_len(len) + bytes.len());
    write_varint(&mut out, len);
    out.extend_from_slice(bytes);
    Ok(out)
}

/// Append a length prefix and `bytes` to `w`. Fails with `LengthOverflow`, leaving `w`
/// untouched, if `bytes` is longer than `u32::MAX`.
pub fn write_length_delimited(w: &mut Vec<u8>, bytes: &[u8]) -> Result<(), CodecError> {
    write_varint(w, length_prefix(bytes.len())?);
    w.extend_from_slice(bytes);
    Ok(())
}

/// Length prefixes are `uint32` varints.
fn length_prefix(len: usize) -> Result<u32, CodecError> {
    u32::try_from(len).map_err(|_| CodecError::LengthOverflow { len })
}

/// Decode a length-delimited span starting at `offset`. Returns the span and the offset just
/// past it.
pub fn decode_length_delimited(bytes: &[u8], offset: usize) -> Result<(&[u8], usize), CodecError> {
    let mut r = Cursor::new(bytes);
    r.set_position(offset as u64);
    let span = read_length_delimited_span(&mut r)?;
    Ok((&bytes[span.clone()], span.end))
}

/// Read one varint from the cursor.
///
/// Fails with `MalformedVarint` (at the varint's first byte) if input ends before a byte
/// without the continuation bit, if more than [`MAX_VARINT_LEN`] bytes would be needed, or if
/// the fifth byte carries bits above bit 31.
pub(crate) fn read_varint(r: &mut Cursor<&[u8]>) -> Result<u32, CodecError> {
    let offset = r.position() as usize;
    let mut value = 0u32;
    for i in 0..MAX_VARINT_LEN {
        let byte = r
            .read_u8()
            .map_err(|_| CodecError::MalformedVarint { offset })?;
        let payload = byte & PAYLOAD;
        if i == MAX_VARINT_LEN - 1 && payload > 0x0f {
            return Err(CodecError::MalformedVarint { offset });
        }
        value |= u32::from(payload) << (7 * i);
        if byte & CONTINUATION == 0 {
            return Ok(value);
        }
    }
    Err(CodecError::MalformedVarint { offset })
}

/// Read a length prefix and return the absolute byte range of the value that follows,
/// leaving the cursor just past it. The range never extends beyond the cursor's buffer.
pub(crate) fn read_length_delimited_span(r: &mut Cursor<&[u8]>) -> Result<Range<usize>, CodecError> {
    let offset = r.position() as usize;
    let len = read_varint(r)? as usize;
    let start = r.position() as usize;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= r.get_ref().len())
        .ok_or(CodecError::TruncatedMessage { offset })?;
    r.set_position(end as u64);
    Ok(start..end)
}
