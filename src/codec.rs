//! Codec Module
//!
//! Converts domain values to and from the textual form stored on cache nodes.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

/// Serialization collaborator used by node stores.
pub trait Codec: Send + Sync {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String>;
    fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T>;
}

/// Flat JSON object encoding. Field order does not matter on decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String> {
        serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, raw: &str) -> Result<T> {
        serde_json::from_str(raw).map_err(|e| CacheError::Deserialization(e.to_string()))
    }
}
