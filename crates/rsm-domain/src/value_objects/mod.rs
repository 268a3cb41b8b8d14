//! Value objects
//!
//! Immutable values that cross layer boundaries: symbol references, instance
//! keys, events and node handles.

pub mod event;
pub mod key;
pub mod node;
pub mod qrl;

pub use event::{Event, kebab_case};
pub use key::{CompositeKey, KeyCodec};
pub use node::NodeId;
pub use qrl::Qrl;

/// Flat string-keyed property map (URL query props, entity identity props)
pub type Props = std::collections::BTreeMap<String, String>;
