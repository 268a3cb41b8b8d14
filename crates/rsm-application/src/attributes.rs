//! Attribute Store
//!
//! Thin façade over the document tree's string attributes. Attributes are the
//! only persistence substrate of the runtime: instance state, factory
//! references, listener QRLs and base URI overrides all live here.

use rsm_domain::error::Result;
use rsm_domain::{DocumentTree, NodeId};
use std::sync::Arc;

/// Scoped attribute access over a document tree
#[derive(Clone)]
pub struct AttributeStore {
    document: Arc<dyn DocumentTree>,
}

impl AttributeStore {
    /// Wrap a document tree
    pub fn new(document: Arc<dyn DocumentTree>) -> Self {
        Self { document }
    }

    /// Underlying document
    pub fn document(&self) -> &Arc<dyn DocumentTree> {
        &self.document
    }

    /// Read an attribute on `node`
    pub fn get(&self, node: NodeId, name: &str) -> Option<String> {
        self.document.get_attribute(node, name)
    }

    /// Read an attribute on `node`, treating the empty string as absent
    pub fn get_non_empty(&self, node: NodeId, name: &str) -> Option<String> {
        self.get(node, name).filter(|value| !value.is_empty())
    }

    /// Write an attribute on `node`
    pub fn set(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.document.set_attribute(node, name, value)
    }

    /// Remove an attribute from `node`
    pub fn remove(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        self.document.remove_attribute(node, name)
    }

    /// Ancestors of `node`, nearest first, excluding `node` itself
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self.document.as_ref(),
            cursor: self.document.parent(node),
        }
    }

    /// Nearest node, starting at `node` itself, carrying `name`
    pub fn find_closest(&self, node: NodeId, name: &str) -> Option<(NodeId, String)> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find_map(|candidate| self.get(candidate, name).map(|value| (candidate, value)))
    }

    /// Diagnostic description of `node`
    pub fn describe(&self, node: NodeId) -> String {
        self.document.describe(node)
    }
}

/// Iterator over the ancestors of a node
pub struct Ancestors<'a> {
    document: &'a dyn DocumentTree,
    cursor: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.cursor?;
        self.cursor = self.document.parent(current);
        Some(current)
    }
}
