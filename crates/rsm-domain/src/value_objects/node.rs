//! Node handles

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a node of a [`DocumentTree`](crate::ports::DocumentTree)
///
/// Handles are only meaningful for the document that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a handle from its raw index
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw index of this handle
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
