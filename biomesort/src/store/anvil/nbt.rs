//! Minimal NBT reader.
//!
//! Decodes the big-endian, uncompressed NBT payload of an Anvil chunk into a
//! [`Tag`] tree. Only reading is supported.

use std::collections::HashMap;

use thiserror::Error;

/// Nesting limit for compounds and lists.
const MAX_DEPTH: usize = 512;

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_FLOAT: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_BYTE_ARRAY: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_LONG_ARRAY: u8 = 12;

/// NBT decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NbtError {
    #[error("Unexpected end of NBT data")]
    UnexpectedEof,

    #[error("Invalid NBT tag type {0}")]
    InvalidTagType(u8),

    #[error("Root tag is not a compound")]
    RootNotCompound,

    #[error("Negative NBT length {0}")]
    NegativeLength(i32),

    #[error("NBT nesting deeper than 512 levels")]
    TooDeep,
}

/// A decoded NBT value.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Tag>),
    Compound(HashMap<String, Tag>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    /// Child of a compound tag by name.
    pub fn get(&self, key: &str) -> Option<&Tag> {
        match self {
            Tag::Compound(map) => map.get(key),
            _ => None,
        }
    }
}

/// Parse a complete NBT document. The root must be a (named) compound.
pub fn parse(bytes: &[u8]) -> Result<Tag, NbtError> {
    let mut reader = Reader { buf: bytes, pos: 0 };
    let tag_type = reader.u8()?;
    if tag_type != TAG_COMPOUND {
        return Err(NbtError::RootNotCompound);
    }
    let _name = reader.string()?;
    reader.payload(TAG_COMPOUND, 0)
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], NbtError> {
        let end = self.pos.checked_add(n).ok_or(NbtError::UnexpectedEof)?;
        let slice = self.buf.get(self.pos..end).ok_or(NbtError::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], NbtError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, NbtError> {
        Ok(self.take(1)?[0])
    }

    fn i16(&mut self) -> Result<i16, NbtError> {
        Ok(i16::from_be_bytes(self.array()?))
    }

    fn i32(&mut self) -> Result<i32, NbtError> {
        Ok(i32::from_be_bytes(self.array()?))
    }

    fn i64(&mut self) -> Result<i64, NbtError> {
        Ok(i64::from_be_bytes(self.array()?))
    }

    /// Reads a length prefix and checks that `len * elem_size` bytes remain,
    /// so corrupt lengths fail before allocating.
    fn read_len(&mut self, elem_size: usize) -> Result<usize, NbtError> {
        let len = self.i32()?;
        if len < 0 {
            return Err(NbtError::NegativeLength(len));
        }
        let len = len as usize;
        let remaining = self.buf.len() - self.pos;
        if len.saturating_mul(elem_size) > remaining {
            return Err(NbtError::UnexpectedEof);
        }
        Ok(len)
    }

    fn string(&mut self) -> Result<String, NbtError> {
        let len = u16::from_be_bytes(self.array()?) as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn payload(&mut self, tag_type: u8, depth: usize) -> Result<Tag, NbtError> {
        if depth > MAX_DEPTH {
            return Err(NbtError::TooDeep);
        }
        let tag = match tag_type {
            TAG_BYTE => Tag::Byte(self.u8()? as i8),
            TAG_SHORT => Tag::Short(self.i16()?),
            TAG_INT => Tag::Int(self.i32()?),
            TAG_LONG => Tag::Long(self.i64()?),
            TAG_FLOAT => Tag::Float(f32::from_bits(self.i32()? as u32)),
            TAG_DOUBLE => Tag::Double(f64::from_bits(self.i64()? as u64)),
            TAG_BYTE_ARRAY => {
                let len = self.read_len(1)?;
                Tag::ByteArray(self.take(len)?.iter().map(|&b| b as i8).collect())
            }
            TAG_STRING => Tag::String(self.string()?),
            TAG_LIST => {
                let elem_type = self.u8()?;
                // Empty lists may carry TAG_END as their element type.
                let len = self.read_len(if elem_type == TAG_END { 0 } else { 1 })?;
                if elem_type == TAG_END && len > 0 {
                    return Err(NbtError::InvalidTagType(TAG_END));
                }
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.payload(elem_type, depth + 1)?);
                }
                Tag::List(items)
            }
            TAG_COMPOUND => {
                let mut map = HashMap::new();
                loop {
                    let child_type = self.u8()?;
                    if child_type == TAG_END {
                        break;
                    }
                    let name = self.string()?;
                    let value = self.payload(child_type, depth + 1)?;
                    map.insert(name, value);
                }
                Tag::Compound(map)
            }
            TAG_INT_ARRAY => {
                let len = self.read_len(4)?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.i32()?);
                }
                Tag::IntArray(values)
            }
            TAG_LONG_ARRAY => {
                let len = self.read_len(8)?;
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.i64()?);
                }
                Tag::LongArray(values)
            }
            other => return Err(NbtError::InvalidTagType(other)),
        };
        Ok(tag)
    }
}
