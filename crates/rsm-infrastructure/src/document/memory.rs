//! In-memory document tree
//!
//! A DOM-like tree of tagged nodes with string attributes, used by the CLI and
//! the test suites. Documents can be built programmatically or loaded from a
//! JSON fixture:
//!
//! ```json
//! { "tag": "html", "attributes": { "q:base": "/app/" },
//!   "children": [ { "tag": "button", "attributes": { "on:click": "./todo.js#toggle" } } ] }
//! ```
//!
//! Removed nodes are dropped from the tree entirely; their ids are never reused.

use rsm_domain::error::{Error, Result};
use rsm_domain::{DocumentTree, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Serializable description of a node and its subtree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Element tag
    pub tag: String,
    /// Attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Node without attributes or children
    pub fn new<S: Into<String>>(tag: S) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Add an attribute
    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a child
    pub fn with_child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug)]
struct NodeData {
    tag: String,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Tree {
    nodes: HashMap<NodeId, NodeData>,
    root: NodeId,
    next_id: u64,
}

impl Tree {
    fn insert(&mut self, parent: Option<NodeId>, spec: &NodeSpec) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            NodeData {
                tag: spec.tag.clone(),
                attributes: spec.attributes.clone(),
                parent,
                children: Vec::new(),
            },
        );
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.push(id);
        }
        for child in &spec.children {
            self.insert(Some(id), child);
        }
        id
    }

    fn node(&self, node: NodeId) -> Result<&NodeData> {
        self.nodes
            .get(&node)
            .ok_or_else(|| Error::node_not_found(node.to_string()))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(&node)
            .ok_or_else(|| Error::node_not_found(node.to_string()))
    }

    fn spec(&self, node: NodeId) -> Option<NodeSpec> {
        let data = self.nodes.get(&node)?;
        Some(NodeSpec {
            tag: data.tag.clone(),
            attributes: data.attributes.clone(),
            children: data
                .children
                .iter()
                .filter_map(|&child| self.spec(child))
                .collect(),
        })
    }

    /// `node` and its descendants in document order
    fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.get(&current) {
                order.push(current);
                stack.extend(data.children.iter().rev());
            }
        }
        order
    }
}

/// Thread-safe in-memory document
#[derive(Debug)]
pub struct MemoryDocument {
    tree: RwLock<Tree>,
}

impl MemoryDocument {
    /// Document with a single root node
    pub fn new<S: Into<String>>(root_tag: S) -> Self {
        Self::from_spec(&NodeSpec::new(root_tag))
    }

    /// Document built from a node description
    pub fn from_spec(spec: &NodeSpec) -> Self {
        let mut tree = Tree {
            nodes: HashMap::new(),
            root: NodeId::new(0),
            next_id: 0,
        };
        tree.root = tree.insert(None, spec);
        Self {
            tree: RwLock::new(tree),
        }
    }

    /// Document parsed from a JSON fixture
    pub fn from_json(raw: &str) -> Result<Self> {
        let spec: NodeSpec = serde_json::from_str(raw)?;
        Ok(Self::from_spec(&spec))
    }

    fn read(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a new node under `parent`
    pub fn append_child<S: Into<String>>(&self, parent: NodeId, tag: S) -> Result<NodeId> {
        self.append_spec(parent, &NodeSpec::new(tag))
    }

    /// Append a described subtree under `parent`, returning its root
    pub fn append_spec(&self, parent: NodeId, spec: &NodeSpec) -> Result<NodeId> {
        let mut tree = self.write();
        tree.node(parent)?;
        Ok(tree.insert(Some(parent), spec))
    }

    /// Tag of `node`
    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.read().nodes.get(&node).map(|data| data.tag.clone())
    }

    /// Attributes of `node`
    pub fn attributes(&self, node: NodeId) -> Option<BTreeMap<String, String>> {
        self.read()
            .nodes
            .get(&node)
            .map(|data| data.attributes.clone())
    }

    /// First node in document order whose attribute `name` equals `value`
    pub fn find_by_attribute(&self, name: &str, value: &str) -> Option<NodeId> {
        let tree = self.read();
        tree.subtree(tree.root).into_iter().find(|node| {
            tree.nodes
                .get(node)
                .and_then(|data| data.attributes.get(name))
                .is_some_and(|found| found == value)
        })
    }

    /// Node with the given `id` attribute
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_attribute("id", id)
    }

    /// Description of the whole document
    pub fn to_spec(&self) -> NodeSpec {
        let tree = self.read();
        tree.spec(tree.root).unwrap_or_default()
    }

    /// Pretty-printed JSON fixture of the whole document
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_spec())?)
    }

    /// Number of attached nodes
    pub fn len(&self) -> usize {
        self.read().nodes.len()
    }

    /// Whether the document has no nodes (never true: the root always exists)
    pub fn is_empty(&self) -> bool {
        self.read().nodes.is_empty()
    }
}

impl DocumentTree for MemoryDocument {
    fn root(&self) -> NodeId {
        self.read().root
    }

    fn contains(&self, node: NodeId) -> bool {
        self.read().nodes.contains_key(&node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.read().nodes.get(&node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.read()
            .nodes
            .get(&node)
            .map(|data| data.children.clone())
            .unwrap_or_default()
    }

    fn get_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.read().nodes.get(&node)?.attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.write()
            .node_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        Ok(self.write().node_mut(node)?.attributes.remove(name))
    }

    fn remove(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut tree = self.write();
        if node == tree.root {
            return Err(Error::internal("the document root cannot be removed"));
        }
        let parent = tree.node(node)?.parent;
        if let Some(parent) = parent.and_then(|p| tree.nodes.get_mut(&p)) {
            parent.children.retain(|&child| child != node);
        }
        let removed = tree.subtree(node);
        for gone in &removed {
            tree.nodes.remove(gone);
        }
        Ok(removed)
    }

    fn describe(&self, node: NodeId) -> String {
        let tree = self.read();
        match tree.nodes.get(&node) {
            Some(data) => match data.attributes.get("id") {
                Some(id) => format!("<{} id=\"{id}\"> ({node})", data.tag),
                None => format!("<{}> ({node})", data.tag),
            },
            None => format!("detached node ({node})"),
        }
    }
}
