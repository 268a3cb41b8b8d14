//! QRL Resolution
//!
//! Turns a [`Qrl`] into a [`ResolvedSymbol`]:
//!
//! ```text
//! "ui:/todo.js#toggle?id=3"
//!        │  protocol alias expansion (ui -> https://cdn.example/app/)
//!        ▼
//! https://cdn.example/app/todo.js     ← joined onto the node's base URI
//!        │  import (once per module URL, concurrent imports coalesced)
//!        ▼
//! Module { "toggle": Handler, .. }
//!        │  export lookup
//!        ▼
//! ResolvedSymbol { url: …/todo.js#toggle?id=3, captured: [...] }
//! ```
//!
//! Successful imports are cached for the lifetime of the resolver. Failed
//! imports are not cached and not retried; the error goes to the caller.

use crate::ports::symbols::{Module, ModuleLoader, ResolvedSymbol};
use moka::future::Cache;
use rsm_domain::Qrl;
use rsm_domain::error::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Resolves QRLs to exports through a module loader
pub struct SymbolResolver {
    loader: Arc<dyn ModuleLoader>,
    modules: Cache<String, Arc<Module>>,
    protocols: BTreeMap<String, Url>,
}

impl SymbolResolver {
    /// Create a resolver
    ///
    /// `max_cached` caps the number of resolved modules kept; `None` keeps
    /// every module, so each one is imported exactly once.
    pub fn new(
        loader: Arc<dyn ModuleLoader>,
        protocols: BTreeMap<String, Url>,
        max_cached: Option<u64>,
    ) -> Self {
        let builder = Cache::builder();
        let modules = match max_cached {
            Some(capacity) => builder.max_capacity(capacity).build(),
            None => builder.build(),
        };
        Self {
            loader,
            modules,
            protocols,
        }
    }

    /// Name of the underlying loader
    pub fn loader_name(&self) -> &str {
        self.loader.loader_name()
    }

    /// Module URL a QRL points to, relative to `base`
    pub fn locate(&self, qrl: &Qrl, base: &Url) -> Result<Url> {
        let path = qrl.module_path();
        let alias = qrl
            .protocol()
            .and_then(|protocol| self.protocols.get(protocol).map(|url| (protocol, url)));

        let joined = match alias {
            Some((protocol, alias_base)) => {
                let rest = &path[protocol.len() + 1..];
                alias_base.join(rest.trim_start_matches('/'))
            }
            None => base.join(path),
        };
        let mut url = joined.map_err(|e| Error::invalid_qrl(qrl.to_string(), e.to_string()))?;
        url.set_fragment(None);
        url.set_query(None);
        Ok(url)
    }

    /// Import the module at `url`, loading it at most once
    pub async fn import(&self, url: &Url) -> Result<Arc<Module>> {
        let loader = Arc::clone(&self.loader);
        let target = url.clone();
        self.modules
            .try_get_with(url.as_str().to_string(), async move {
                info!(url = %target, loader = loader.loader_name(), "Loading module");
                loader.load(&target).await.map(Arc::new)
            })
            .await
            .map_err(|err| (*err).clone())
    }

    /// Resolve a QRL relative to `base`
    pub async fn resolve(&self, qrl: &Qrl, base: &Url) -> Result<ResolvedSymbol> {
        let module_url = self.locate(qrl, base)?;
        let module = self.import(&module_url).await?;
        let export = module
            .export(qrl.export_name())
            .cloned()
            .ok_or_else(|| Error::symbol_not_found(module_url.as_str(), qrl.export_name()))?;

        let mut url = module_url;
        url.set_fragment(Some(qrl.export_name()));
        let query = qrl.query_string();
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        debug!(url = %url, kind = export.kind(), "Resolved symbol");
        Ok(ResolvedSymbol::new(
            url,
            qrl.export_name(),
            export,
            qrl.captured().to_vec(),
        ))
    }
}
