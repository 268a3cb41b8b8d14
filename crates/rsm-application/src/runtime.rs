//! Runtime
//!
//! Shared state behind every resolution context of one document: the
//! attribute store, the symbol resolver, the per-node instance caches, the
//! type registry and the settings. Contexts are cheap views over it and are
//! created per resolution pass.

use crate::attributes::AttributeStore;
use crate::dispatch::Dispatcher;
use crate::injector::ElementInjector;
use crate::instances::{InstanceCaches, TypeRegistry};
use crate::ports::symbols::{EntityType, ModuleLoader, ResolvedSymbol};
use crate::resolver::SymbolResolver;
use crate::settings::{RuntimeSettings, ScopeBoundary};
use rsm_domain::error::{Error, Result};
use rsm_domain::{CompositeKey, DocumentTree, NodeId, Qrl};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Resolution state of one document
pub struct Runtime {
    attributes: AttributeStore,
    symbols: SymbolResolver,
    instances: InstanceCaches,
    types: TypeRegistry,
    settings: RuntimeSettings,
}

impl Runtime {
    /// Create a runtime that keeps every resolved module
    pub fn new(
        document: Arc<dyn DocumentTree>,
        loader: Arc<dyn ModuleLoader>,
        settings: RuntimeSettings,
    ) -> Arc<Self> {
        Self::with_module_capacity(document, loader, settings, None)
    }

    /// Create a runtime with a cap on resolved modules kept in memory
    pub fn with_module_capacity(
        document: Arc<dyn DocumentTree>,
        loader: Arc<dyn ModuleLoader>,
        settings: RuntimeSettings,
        max_cached: Option<u64>,
    ) -> Arc<Self> {
        let symbols = SymbolResolver::new(loader, settings.protocols.clone(), max_cached);
        info!(
            loader = symbols.loader_name(),
            base_uri = %settings.base_uri,
            "Runtime created"
        );
        Arc::new(Self {
            attributes: AttributeStore::new(document),
            symbols,
            instances: InstanceCaches::new(),
            types: TypeRegistry::default(),
            settings,
        })
    }

    /// Underlying document
    pub fn document(&self) -> &Arc<dyn DocumentTree> {
        self.attributes.document()
    }

    /// Attribute store
    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    /// Symbol resolver
    pub fn symbols(&self) -> &SymbolResolver {
        &self.symbols
    }

    /// Per-node instance caches
    pub fn instances(&self) -> &InstanceCaches {
        &self.instances
    }

    /// Known entity types
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Runtime settings
    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    /// Remember an entity type so rehydration can construct it directly
    pub fn register_type(&self, entity_type: Arc<dyn EntityType>) {
        self.types.register(entity_type);
    }

    /// Element-scoped context for `node`
    pub fn injector(self: &Arc<Self>, node: NodeId) -> Result<Arc<ElementInjector>> {
        self.ensure_attached(node)?;
        Ok(Arc::new(ElementInjector::new(Arc::clone(self), node)))
    }

    /// Event dispatcher over this runtime
    pub fn dispatcher(self: &Arc<Self>) -> Dispatcher {
        Dispatcher::new(Arc::clone(self))
    }

    /// Base URI in effect at `node`
    ///
    /// The closest ancestor-or-self base attribute is joined onto the document
    /// default.
    pub fn base_uri(&self, node: NodeId) -> Result<Url> {
        match self
            .attributes
            .find_closest(node, &self.settings.base_attribute)
        {
            Some((owner, value)) => self.settings.base_uri.join(&value).map_err(|e| {
                Error::invalid_qrl(
                    value.clone(),
                    format!(
                        "invalid base URI override on {}: {e}",
                        self.attributes.describe(owner)
                    ),
                )
            }),
            None => Ok(self.settings.base_uri.clone()),
        }
    }

    /// Resolve a QRL relative to `node`
    pub async fn resolve(&self, qrl: &Qrl, node: NodeId) -> Result<ResolvedSymbol> {
        let base = self.base_uri(node)?;
        self.symbols.resolve(qrl, &base).await
    }

    /// Resolve the factory type for `type_tag` declared at or above `node`
    pub async fn factory_type(&self, node: NodeId, type_tag: &str) -> Result<Arc<dyn EntityType>> {
        let attribute = self.settings.factory_attribute(type_tag);
        let (owner, value) = self
            .attributes
            .find_closest(node, &attribute)
            .ok_or_else(|| {
                Error::no_attribute_found(&attribute, None, self.attributes.describe(node))
            })?;
        let qrl: Qrl = value.parse()?;
        let entity_type = self.resolve(&qrl, owner).await?.entity_type()?;
        if entity_type.overrides_constructor() {
            return Err(Error::overridden_constructor(type_tag));
        }
        self.types.register(Arc::clone(&entity_type));
        Ok(entity_type)
    }

    /// Next-outer scope node of `node`, `None` at the root
    pub fn parent_scope(&self, node: NodeId) -> Option<NodeId> {
        let root = self.document().root();
        if node == root {
            return None;
        }
        let mut ancestors = self.attributes.ancestors(node);
        match &self.settings.boundary {
            ScopeBoundary::Element => ancestors.next(),
            ScopeBoundary::Marker(marker) => ancestors
                .find(|&ancestor| ancestor == root || self.attributes.get(ancestor, marker).is_some()),
        }
    }

    /// Release the instance `key` owned by `node`, running its teardown hook
    pub fn release(&self, node: NodeId, key: &CompositeKey) -> bool {
        self.instances.release(node, &key.encode()).is_some()
    }

    /// Detach `node` and its subtree, releasing every instance they own
    ///
    /// Returns the number of released instances.
    pub fn remove_node(&self, node: NodeId) -> Result<usize> {
        let removed = self.document().remove(node)?;
        let released: usize = removed
            .iter()
            .map(|&gone| self.instances.release_node(gone).len())
            .sum();
        debug!(node = %node, nodes = removed.len(), released, "Removed subtree");
        Ok(released)
    }

    /// Persist the state of every live instance into the document
    ///
    /// Returns the number of instances written.
    pub fn serialize(self: &Arc<Self>) -> Result<usize> {
        let mut written = 0;
        for owner in self.instances.owners() {
            if self.document().contains(owner) {
                written += ElementInjector::new(Arc::clone(self), owner).write_state()?;
            }
        }
        info!(written, "Serialized instance state");
        Ok(written)
    }

    pub(crate) fn ensure_attached(&self, node: NodeId) -> Result<()> {
        if self.document().contains(node) {
            Ok(())
        } else {
            Err(Error::node_not_found(node.to_string()))
        }
    }
}
