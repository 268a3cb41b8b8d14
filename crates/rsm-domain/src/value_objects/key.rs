//! Composite instance keys
//!
//! A composite key identifies a materialized instance by its type tag and the
//! ordered values of the type's declared identity props. The encoded form is
//! used both as the state attribute name on the owner node and as the cache
//! key:
//!
//! ```text
//! type:prop1:prop2
//! ```
//!
//! Segments escape `\` as `\\` and `:` as `\:`, so a value containing the
//! delimiter never collides with a different split. A key with no identity
//! props encodes as the bare type tag; `type:` is a key with one empty prop.

use crate::constants::{KEY_DELIMITER, KEY_ESCAPE};
use crate::error::{Error, Result};
use crate::ports::Codec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag plus ordered identity prop values
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompositeKey {
    type_tag: String,
    identity: Vec<String>,
}

impl CompositeKey {
    /// Create a key from a type tag and identity values
    pub fn new<T, I, S>(type_tag: T, identity: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            type_tag: type_tag.into(),
            identity: identity.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a key for a type with no identity props
    pub fn singleton<T: Into<String>>(type_tag: T) -> Self {
        Self {
            type_tag: type_tag.into(),
            identity: Vec::new(),
        }
    }

    /// Type tag of the instance
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Identity values in declaration order
    pub fn identity(&self) -> &[String] {
        &self.identity
    }

    /// Deterministic encoded form
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.type_tag.len() + 8 * self.identity.len());
        push_escaped(&mut out, &self.type_tag);
        for value in &self.identity {
            out.push(KEY_DELIMITER);
            push_escaped(&mut out, value);
        }
        out
    }

    /// Parse an encoded key
    pub fn decode(raw: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = raw.chars();
        while let Some(ch) = chars.next() {
            match ch {
                KEY_ESCAPE => match chars.next() {
                    Some(escaped @ (KEY_ESCAPE | KEY_DELIMITER)) => current.push(escaped),
                    Some(other) => {
                        return Err(Error::invalid_key(
                            raw,
                            format!("unknown escape sequence '{KEY_ESCAPE}{other}'"),
                        ));
                    }
                    None => return Err(Error::invalid_key(raw, "dangling escape")),
                },
                KEY_DELIMITER => segments.push(std::mem::take(&mut current)),
                other => current.push(other),
            }
        }
        segments.push(current);

        let mut segments = segments.into_iter();
        let type_tag = segments.next().unwrap_or_default();
        if type_tag.is_empty() {
            return Err(Error::invalid_key(raw, "empty type tag"));
        }
        Ok(Self {
            type_tag,
            identity: segments.collect(),
        })
    }
}

fn push_escaped(out: &mut String, segment: &str) {
    for ch in segment.chars() {
        if ch == KEY_DELIMITER || ch == KEY_ESCAPE {
            out.push(KEY_ESCAPE);
        }
        out.push(ch);
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// [`Codec`] for composite keys
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyCodec;

impl Codec<CompositeKey> for KeyCodec {
    fn encode(&self, value: &CompositeKey) -> Result<String> {
        Ok(value.encode())
    }

    fn decode(&self, raw: &str) -> Result<CompositeKey> {
        CompositeKey::decode(raw)
    }
}
