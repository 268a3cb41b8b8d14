//! Runtime settings
//!
//! Attribute naming rules and URL resolution inputs. Built from the
//! infrastructure configuration; defaults match the wire-format constants.

use rsm_domain::constants::{
    DEFAULT_BASE_ATTRIBUTE, DEFAULT_BASE_URI, DEFAULT_EVENT_PREFIX, DEFAULT_FACTORY_PREFIX,
    DEFAULT_HOST_ATTRIBUTE,
};
use rsm_domain::error::{Error, Result};
use rsm_domain::value_objects::kebab_case;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

/// Parsed form of [`DEFAULT_BASE_URI`], a constant absolute URL
static DEFAULT_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(DEFAULT_BASE_URI).expect("default base URI is absolute"));

/// Rule deciding which ancestors open a new resolution scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeBoundary {
    /// Only nodes carrying the marker attribute (and the root)
    Marker(String),
    /// Every ancestor node
    Element,
}

impl Default for ScopeBoundary {
    fn default() -> Self {
        Self::Marker(DEFAULT_HOST_ATTRIBUTE.to_string())
    }
}

/// Settings shared by every context of a runtime
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Document default base URI
    pub base_uri: Url,
    /// Prefix of event listener attributes
    pub event_prefix: String,
    /// Prefix of factory attributes
    pub factory_prefix: String,
    /// Attribute overriding the base URI for a subtree
    pub base_attribute: String,
    /// Scope boundary rule for parent lookup
    pub boundary: ScopeBoundary,
    /// Protocol aliases (`ui` -> `https://cdn.example/app/`)
    pub protocols: BTreeMap<String, Url>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE.clone(),
            event_prefix: DEFAULT_EVENT_PREFIX.to_string(),
            factory_prefix: DEFAULT_FACTORY_PREFIX.to_string(),
            base_attribute: DEFAULT_BASE_ATTRIBUTE.to_string(),
            boundary: ScopeBoundary::default(),
            protocols: BTreeMap::new(),
        }
    }
}

impl RuntimeSettings {
    /// Set the document base URI
    pub fn with_base_uri(mut self, base_uri: &str) -> Result<Self> {
        self.base_uri = Url::parse(base_uri)
            .map_err(|e| Error::config(format!("Invalid base URI '{base_uri}': {e}")))?;
        Ok(self)
    }

    /// Register a protocol alias
    ///
    /// The alias base is treated as a directory: a missing trailing `/` is
    /// added so that joining keeps its last path segment.
    pub fn with_protocol(mut self, alias: &str, base: &str) -> Result<Self> {
        let mut url = Url::parse(base)
            .map_err(|e| Error::config(format!("Invalid base for protocol '{alias}': {e}")))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.protocols.insert(alias.to_string(), url);
        Ok(self)
    }

    /// Set the scope boundary rule
    pub fn with_boundary(mut self, boundary: ScopeBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Listener attribute for an event type (`on:dbl-click`)
    pub fn event_attribute(&self, event_type: &str) -> String {
        format!("{}{}", self.event_prefix, kebab_case(event_type))
    }

    /// Factory attribute for a type tag (`::todo`)
    pub fn factory_attribute(&self, type_tag: &str) -> String {
        format!("{}{}", self.factory_prefix, type_tag)
    }
}
