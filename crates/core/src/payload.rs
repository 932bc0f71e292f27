// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payloads and the data-converter contract.
//!
//! A [`Payload`] is an opaque `(metadata, bytes)` pair; the `encoding`
//! metadata key tells a converter how to interpret the bytes. The default
//! converter understands `json` (UTF-8 JSON) and `raw` (opaque bytes);
//! anything else fails decoding with [`ConvertError::UnknownEncoding`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Metadata key naming the payload encoding.
pub const ENCODING_KEY: &str = "encoding";
/// UTF-8 JSON encoding.
pub const ENCODING_JSON: &str = "json";
/// Opaque byte encoding.
pub const ENCODING_RAW: &str = "raw";

/// Errors produced while converting between values and payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("unknown payload encoding: {0:?}")]
    UnknownEncoding(String),
    #[error("payload has no encoding metadata")]
    MissingEncoding,
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("decode failed: {0}")]
    Decode(String),
}

/// A single wire payload: metadata plus opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
}

impl Payload {
    /// Encode a serializable value as a JSON payload.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ConvertError> {
        let data = serde_json::to_vec(value).map_err(|e| ConvertError::Encode(e.to_string()))?;
        let mut metadata = HashMap::new();
        metadata.insert(ENCODING_KEY.to_string(), ENCODING_JSON.to_string());
        Ok(Self { metadata, data })
    }

    /// Wrap opaque bytes as a raw payload.
    pub fn raw(data: impl Into<Vec<u8>>) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(ENCODING_KEY.to_string(), ENCODING_RAW.to_string());
        Self { metadata, data: data.into() }
    }

    /// The declared encoding, if any.
    pub fn encoding(&self) -> Option<&str> {
        self.metadata.get(ENCODING_KEY).map(String::as_str)
    }

    /// Decode a JSON payload into a typed destination.
    ///
    /// Raw payloads must be read through [`Payload::raw_data`] instead.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ConvertError> {
        match self.encoding() {
            Some(ENCODING_JSON) => {
                serde_json::from_slice(&self.data).map_err(|e| ConvertError::Decode(e.to_string()))
            }
            Some(ENCODING_RAW) => {
                Err(ConvertError::Decode("raw payload carries opaque bytes".into()))
            }
            Some(other) => Err(ConvertError::UnknownEncoding(other.to_string())),
            None => Err(ConvertError::MissingEncoding),
        }
    }

    /// The bytes of a raw payload.
    pub fn raw_data(&self) -> Result<&[u8], ConvertError> {
        match self.encoding() {
            Some(ENCODING_RAW) => Ok(&self.data),
            Some(other) => Err(ConvertError::UnknownEncoding(other.to_string())),
            None => Err(ConvertError::MissingEncoding),
        }
    }
}

/// An ordered list of payloads, the unit of every input/result on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Payloads(pub Vec<Payload>);

impl Payloads {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Encode a slice of JSON values, one payload each.
    pub fn from_values(values: &[serde_json::Value]) -> Result<Self, ConvertError> {
        values.iter().map(Payload::json).collect::<Result<Vec<_>, _>>().map(Self)
    }

    /// Encode a single serializable value.
    pub fn single<T: Serialize>(value: &T) -> Result<Self, ConvertError> {
        Ok(Self(vec![Payload::json(value)?]))
    }

    pub fn push(&mut self, payload: Payload) {
        self.0.push(payload);
    }

    pub fn get(&self, idx: usize) -> Option<&Payload> {
        self.0.get(idx)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Payload> {
        self.0.iter()
    }

    /// Decode payload `idx` into a typed destination.
    pub fn decode_at<T: DeserializeOwned>(&self, idx: usize) -> Result<T, ConvertError> {
        self.get(idx)
            .ok_or_else(|| ConvertError::Decode(format!("no payload at index {idx}")))?
            .decode()
    }
}

impl From<Vec<Payload>> for Payloads {
    fn from(v: Vec<Payload>) -> Self {
        Self(v)
    }
}

impl IntoIterator for Payloads {
    type Item = Payload;
    type IntoIter = std::vec::IntoIter<Payload>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Converts between JSON-representable values and wire payloads.
///
/// Object-safe so worker configuration can carry a custom converter.
pub trait DataConverter: Send + Sync + std::fmt::Debug {
    fn to_payload(&self, value: &serde_json::Value) -> Result<Payload, ConvertError>;
    fn from_payload(&self, payload: &Payload) -> Result<serde_json::Value, ConvertError>;

    fn to_payloads(&self, values: &[serde_json::Value]) -> Result<Payloads, ConvertError> {
        values.iter().map(|v| self.to_payload(v)).collect::<Result<Vec<_>, _>>().map(Payloads)
    }

    fn from_payloads(
        &self,
        payloads: &Payloads,
    ) -> Result<Vec<serde_json::Value>, ConvertError> {
        payloads.iter().map(|p| self.from_payload(p)).collect()
    }
}

/// The stock converter: JSON encoding out, `json` and `raw` in.
///
/// Raw payloads surface as a (lossy) UTF-8 string value when a JSON value is
/// demanded; [`Payload::raw_data`] is the lossless path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl DataConverter for DefaultConverter {
    fn to_payload(&self, value: &serde_json::Value) -> Result<Payload, ConvertError> {
        Payload::json(value)
    }

    fn from_payload(&self, payload: &Payload) -> Result<serde_json::Value, ConvertError> {
        match payload.encoding() {
            Some(ENCODING_JSON) => serde_json::from_slice(&payload.data)
                .map_err(|e| ConvertError::Decode(e.to_string())),
            Some(ENCODING_RAW) => {
                Ok(serde_json::Value::String(String::from_utf8_lossy(&payload.data).into_owned()))
            }
            Some(other) => Err(ConvertError::UnknownEncoding(other.to_string())),
            None => Err(ConvertError::MissingEncoding),
        }
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
