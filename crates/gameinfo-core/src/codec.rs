use std::io::Cursor;

use serde::Deserialize;

use crate::config::BoundaryConfig;
use crate::layout::{FIELD_COUNT, LayoutMismatch};
use crate::record::GameMetadataRecord;

/// Current wire layout version, sent as the first byte of every message.
pub const LAYOUT_VERSION: u8 = 1;

/// Default maximum encoded message size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024; // 1 MiB

/// Encoded size of an empty record: version byte, array header, f64, five nils.
pub const MIN_MESSAGE_SIZE: usize = 1 + 1 + 9 + 5;

#[derive(Debug)]
pub enum CodecError {
    EmptyMessage,
    UnsupportedLayoutVersion(u8),
    PayloadTooLarge(usize),
    /// The record was not written as a positional array.
    NotAnArray,
    /// Bytes left over after a complete record.
    TrailingBytes(usize),
    Layout(LayoutMismatch),
    SerializeError(String),
    DeserializeError(String),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "empty message"),
            Self::UnsupportedLayoutVersion(v) => write!(f, "unsupported layout version: {v}"),
            Self::PayloadTooLarge(size) => write!(f, "payload too large: {size} bytes"),
            Self::NotAnArray => write!(f, "record payload is not a positional array"),
            Self::TrailingBytes(n) => write!(f, "{n} trailing bytes after record"),
            Self::Layout(e) => write!(f, "layout mismatch: {e}"),
            Self::SerializeError(e) => write!(f, "serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "deserialize error: {e}"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<LayoutMismatch> for CodecError {
    fn from(e: LayoutMismatch) -> Self {
        Self::Layout(e)
    }
}

/// Positional wire codec: `[LAYOUT_VERSION][msgpack array of 6 fields]`.
///
/// Fields are written as a MessagePack array in declaration order, so any
/// encoder that emits the same six positions (float, then string-or-nil x5)
/// interoperates without sharing field names.
#[derive(Debug, Clone, Copy)]
pub struct RecordCodec {
    max_message_size: usize,
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}

impl RecordCodec {
    pub fn new(max_message_size: usize) -> Self {
        Self { max_message_size }
    }

    pub fn from_config(config: &BoundaryConfig) -> Self {
        Self::new(config.codec.max_message_size)
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    pub fn encode(&self, record: &GameMetadataRecord) -> Result<Vec<u8>, CodecError> {
        let payload =
            rmp_serde::to_vec(record).map_err(|e| CodecError::SerializeError(e.to_string()))?;
        let total = 1 + payload.len();
        if total > self.max_message_size {
            return Err(CodecError::PayloadTooLarge(total));
        }
        let mut buf = Vec::with_capacity(total);
        buf.push(LAYOUT_VERSION);
        buf.extend_from_slice(&payload);
        tracing::debug!(bytes = total, "encoded game metadata record");
        Ok(buf)
    }

    pub fn decode(&self, data: &[u8]) -> Result<GameMetadataRecord, CodecError> {
        if data.len() > self.max_message_size {
            return Err(CodecError::PayloadTooLarge(data.len()));
        }
        decode_layout_version(data)?;
        let payload = &data[1..];
        if payload.is_empty() {
            return Err(CodecError::EmptyMessage);
        }
        let Some(found) = array_len(payload) else {
            tracing::debug!(marker = payload[0], "record payload is not an array");
            return Err(CodecError::NotAnArray);
        };
        if found != FIELD_COUNT {
            tracing::debug!(found, "record array has the wrong number of fields");
            return Err(LayoutMismatch::FieldCount {
                expected: FIELD_COUNT,
                found,
            }
            .into());
        }
        let mut cursor = Cursor::new(payload);
        let record = {
            let mut de = rmp_serde::Deserializer::new(&mut cursor);
            GameMetadataRecord::deserialize(&mut de).map_err(|e| {
                tracing::debug!(error = %e, "failed to decode game metadata record");
                CodecError::DeserializeError(e.to_string())
            })?
        };
        let consumed = cursor.position() as usize;
        if consumed != payload.len() {
            let extra = payload.len() - consumed;
            tracing::debug!(extra, "trailing bytes after game metadata record");
            return Err(CodecError::TrailingBytes(extra));
        }
        Ok(record)
    }
}

/// Encode with the default size limit.
pub fn encode_record(record: &GameMetadataRecord) -> Result<Vec<u8>, CodecError> {
    RecordCodec::default().encode(record)
}

/// Decode with the default size limit.
pub fn decode_record(data: &[u8]) -> Result<GameMetadataRecord, CodecError> {
    RecordCodec::default().decode(data)
}

/// Check the layout version byte of raw wire data.
pub fn decode_layout_version(data: &[u8]) -> Result<u8, CodecError> {
    match data.first() {
        None => Err(CodecError::EmptyMessage),
        Some(&LAYOUT_VERSION) => Ok(LAYOUT_VERSION),
        Some(&other) => Err(CodecError::UnsupportedLayoutVersion(other)),
    }
}

/// Element count from a MessagePack array header, if the payload starts with one.
fn array_len(payload: &[u8]) -> Option<usize> {
    match *payload.first()? {
        b @ 0x90..=0x9f => Some((b & 0x0f) as usize),
        0xdc => {
            let bytes = payload.get(1..3)?;
            Some(u16::from_be_bytes([bytes[0], bytes[1]]) as usize)
        },
        0xdd => {
            let bytes = payload.get(1..5)?;
            Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
        },
        _ => None,
    }
}
