//! QRL symbol references
//!
//! A QRL is a serializable pointer to a lazily-loadable export:
//!
//! ```text
//! [protocol:]modulePath[#exportName][?key1=value1&key2=value2]
//! ```
//!
//! - `protocol` may be a short alias expanded through the document-level
//!   protocol map at resolution time
//! - `#exportName` defaults to `default`
//! - query parameters become the props of the event-scoped context
//! - the reserved `$capture` parameter carries captured arguments as a JSON
//!   array; it is lifted out of the parameters on parse
//!
//! Two QRLs are equal iff their module path, export name and captured
//! arguments are equal. Query parameters are call-site props and do not take
//! part in symbol identity.

use crate::constants::{
    CAPTURE_PARAM, DEFAULT_EXPORT_NAME, QRL_EXPORT_SEPARATOR, QRL_QUERY_SEPARATOR,
};
use crate::error::{Error, Result};
use crate::value_objects::Props;
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use url::form_urlencoded;

/// Serializable reference to a lazily-loadable function or type
#[derive(Debug, Clone)]
pub struct Qrl {
    module_path: String,
    export_name: String,
    captured: Vec<Value>,
    params: Vec<(String, String)>,
}

impl Qrl {
    /// Create a reference to `export_name` in `module_path`
    pub fn new<M: Into<String>, E: Into<String>>(module_path: M, export_name: E) -> Self {
        let export_name = export_name.into();
        Self {
            module_path: module_path.into(),
            export_name: if export_name.is_empty() {
                DEFAULT_EXPORT_NAME.to_string()
            } else {
                export_name
            },
            captured: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Create a reference to the default export of `module_path`
    pub fn default_export<M: Into<String>>(module_path: M) -> Self {
        Self::new(module_path, DEFAULT_EXPORT_NAME)
    }

    /// Attach captured arguments, bound ahead of call-site arguments
    pub fn with_captured(mut self, captured: Vec<Value>) -> Self {
        self.captured = captured;
        self
    }

    /// Append a query parameter
    pub fn with_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Module locator, possibly prefixed by a protocol alias
    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// Export name inside the module
    pub fn export_name(&self) -> &str {
        &self.export_name
    }

    /// Captured arguments
    pub fn captured(&self) -> &[Value] {
        &self.captured
    }

    /// Query parameters in declaration order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Query parameters flattened into a map (last value wins)
    pub fn props(&self) -> Props {
        self.params.iter().cloned().collect()
    }

    /// Leading `scheme:` of the module path, if any
    pub fn protocol(&self) -> Option<&str> {
        let (scheme, _) = self.module_path.split_once(':')?;
        let mut chars = scheme.chars();
        let first = chars.next()?;
        let valid = first.is_ascii_alphabetic()
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        valid.then_some(scheme)
    }

    /// Query string (without `?`), including the `$capture` parameter
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            serializer.append_pair(key, value);
        }
        if !self.captured.is_empty() {
            let encoded = Value::Array(self.captured.clone()).to_string();
            serializer.append_pair(CAPTURE_PARAM, &encoded);
        }
        serializer.finish()
    }
}

impl PartialEq for Qrl {
    fn eq(&self, other: &Self) -> bool {
        self.module_path == other.module_path
            && self.export_name == other.export_name
            && self.captured == other.captured
    }
}

impl Eq for Qrl {}

impl Hash for Qrl {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.module_path.hash(state);
        self.export_name.hash(state);
        for value in &self.captured {
            value.to_string().hash(state);
        }
    }
}

impl FromStr for Qrl {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_qrl(input, "empty reference"));
        }

        let (symbol, query) = match trimmed.split_once(QRL_QUERY_SEPARATOR) {
            Some((symbol, query)) => (symbol, query),
            None => (trimmed, ""),
        };
        let (module_path, export_name) = match symbol.rsplit_once(QRL_EXPORT_SEPARATOR) {
            Some((module, export)) => (module, export),
            None => (symbol, DEFAULT_EXPORT_NAME),
        };
        if module_path.is_empty() {
            return Err(Error::invalid_qrl(input, "missing module path"));
        }

        let mut qrl = Qrl::new(module_path, export_name);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key == CAPTURE_PARAM {
                qrl.captured = serde_json::from_str(&value).map_err(|e| {
                    Error::invalid_qrl(input, format!("captured arguments are not a JSON array: {e}"))
                })?;
            } else {
                qrl.params.push((key.into_owned(), value.into_owned()));
            }
        }
        Ok(qrl)
    }
}

impl fmt::Display for Qrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.module_path)?;
        if self.export_name != DEFAULT_EXPORT_NAME {
            write!(f, "{QRL_EXPORT_SEPARATOR}{}", self.export_name)?;
        }
        let query = self.query_string();
        if !query.is_empty() {
            write!(f, "{QRL_QUERY_SEPARATOR}{query}")?;
        }
        Ok(())
    }
}

impl serde::Serialize for Qrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Qrl {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
