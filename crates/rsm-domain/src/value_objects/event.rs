//! Native and re-emitted events

use super::{NodeId, Props};
use serde::{Deserialize, Serialize};

/// An event raised at a node
///
/// `properties` holds the event's own properties. Re-emitted events carry the
/// query parameters of the emitting QRL here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event type name (`click`, `open`, `dblClick`)
    pub event_type: String,
    /// Node the event originates from
    pub target: NodeId,
    /// Own properties of the event
    #[serde(default)]
    pub properties: Props,
}

impl Event {
    /// Create an event without own properties
    pub fn new<S: Into<String>>(event_type: S, target: NodeId) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            properties: Props::new(),
        }
    }

    /// Attach own properties
    pub fn with_properties(mut self, properties: Props) -> Self {
        self.properties = properties;
        self
    }

    /// Add a single own property
    pub fn with_property<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up an own property
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Attribute name listening for this event under the given prefix
    pub fn attribute_name(&self, prefix: &str) -> String {
        format!("{prefix}{}", kebab_case(&self.event_type))
    }
}

/// Convert a camelCase event name to kebab-case (`dblClick` -> `dbl-click`)
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
