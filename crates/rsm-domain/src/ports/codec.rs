//! Serialization boundary for attribute-encoded values
//!
//! Structured values stored in string attributes cross this boundary instead
//! of being split and joined ad hoc at call sites.

use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Encode/decode capability pair between `T` and its attribute string form
pub trait Codec<T>: Send + Sync {
    /// Encode a value into its string form
    fn encode(&self, value: &T) -> Result<String>;

    /// Decode a value from its string form
    fn decode(&self, raw: &str) -> Result<T>;
}

/// JSON codec used for instance state blobs
#[derive(Debug)]
pub struct JsonCodec<T>(PhantomData<fn() -> T>);

impl<T> JsonCodec<T> {
    /// Create a JSON codec
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Codec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, raw: &str) -> Result<T> {
        Ok(serde_json::from_str(raw)?)
    }
}
