//! Field tags: `(field_number << 3) | wire_type`, written as a varint.

use std::fmt;

/// Wire types understood by this codec. Fixed-width and group wire types are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// A varint follows (uint32 scalars).
    Varint = 0,
    /// A varint length follows, then that many bytes (strings, nested messages).
    LengthDelimited = 2,
}

impl WireType {
    pub fn from_bits(bits: u8) -> Option<WireType> {
        match bits {
            0 => Some(WireType::Varint),
            2 => Some(WireType::LengthDelimited),
            _ => None,
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireType::Varint => f.write_str("varint"),
            WireType::LengthDelimited => f.write_str("length-delimited"),
        }
    }
}

/// Largest field number whose tag still fits in a `u32`.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

const WIRE_TYPE_MASK: u32 = 0x07;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("unknown wire type {0}")]
    UnknownWireType(u8),
    #[error("field number 0 is reserved")]
    ZeroFieldNumber,
}

/// A decoded tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag {
    pub number: u32,
    pub wire_type: WireType,
}

impl FieldTag {
    pub fn new(number: u32, wire_type: WireType) -> Self {
        FieldTag { number, wire_type }
    }

    pub fn pack(self) -> u32 {
        pack(self.number, self.wire_type)
    }

    pub fn unpack(tag: u32) -> Result<Self, TagError> {
        let (number, wire_type) = unpack(tag)?;
        Ok(FieldTag { number, wire_type })
    }
}

/// Pack a field number and wire type. `number` must not exceed [`MAX_FIELD_NUMBER`];
/// schemas enforce this at construction.
pub fn pack(number: u32, wire_type: WireType) -> u32 {
    (number << 3) | wire_type as u32
}

/// Split a tag into field number and wire type.
pub fn unpack(tag: u32) -> Result<(u32, WireType), TagError> {
    let bits = (tag & WIRE_TYPE_MASK) as u8;
    let wire_type = WireType::from_bits(bits).ok_or(TagError::UnknownWireType(bits))?;
    let number = tag >> 3;
    if number == 0 {
        return Err(TagError::ZeroFieldNumber);
    }
    Ok((number, wire_type))
}
