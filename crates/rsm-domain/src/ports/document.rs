//! Document Tree Port
//!
//! The DOM-like tree is the only persistence substrate of the runtime:
//! instance state and factory references live in string attributes of its
//! nodes. Implementations must be safe to share across tasks; every method is
//! synchronous and must not block on I/O.

use crate::error::Result;
use crate::value_objects::NodeId;

/// Read/write access to an element tree with string attributes
pub trait DocumentTree: Send + Sync {
    /// Root node of the document
    fn root(&self) -> NodeId;

    /// Whether the node is currently attached to this document
    fn contains(&self, node: NodeId) -> bool;

    /// Parent of a node, `None` for the root or a detached node
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of a node in document order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Read an attribute
    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Write an attribute, replacing any previous value
    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()>;

    /// Remove an attribute, returning its previous value
    fn remove_attribute(&self, node: NodeId, name: &str) -> Result<Option<String>>;

    /// Detach a node and its subtree, returning every removed node
    fn remove(&self, node: NodeId) -> Result<Vec<NodeId>>;

    /// Short human-readable description for diagnostics (`<div id="x">`)
    fn describe(&self, node: NodeId) -> String;
}
