//! Command implementations
//!
//! Each command returns the text it prints so that the binary stays a thin
//! argument parser.

use rsm_application::DispatchOutcome;
use rsm_domain::error::{Error, Result};
use rsm_domain::{CompositeKey, DocumentTree, Event, Props, Qrl};
use rsm_infrastructure::logging::init_logging;
use rsm_infrastructure::modules::find_module;
use rsm_infrastructure::{AppConfig, ConfigLoader, ErrorContext, MemoryDocument, init_app, list_modules};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Load configuration and install the log subscriber
pub fn init(config_path: Option<&Path>) -> Result<AppConfig> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;
    init_logging(&config.logging)?;
    Ok(config)
}

/// Event to dispatch against a document fixture
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// JSON document fixture
    pub document: PathBuf,
    /// `id` attribute of the target node
    pub target: String,
    /// Event type
    pub event: String,
    /// Event properties
    pub properties: Props,
}

/// Result of a command-line dispatch
#[derive(Debug, Clone)]
pub struct DispatchSummary {
    /// Description of the node whose listener ran
    pub listener: Option<String>,
    /// JSON result of the handler
    pub result: Option<Value>,
    /// Number of instance states written back into the document
    pub serialized: usize,
    /// The document after serialization
    pub document: String,
}

impl DispatchSummary {
    /// One-line description of the outcome
    pub fn headline(&self) -> String {
        match (&self.listener, &self.result) {
            (Some(listener), Some(result)) => format!("handled by {listener}: {result}"),
            (Some(listener), None) => format!("handled by {listener}"),
            (None, _) => "no listener".to_string(),
        }
    }
}

/// Dispatch an event at a node of a document fixture and serialize the result
pub async fn dispatch(config: AppConfig, request: &DispatchRequest) -> Result<DispatchSummary> {
    let raw = std::fs::read_to_string(&request.document).io_context(format!(
        "Failed to read document {}",
        request.document.display()
    ))?;
    let document = Arc::new(MemoryDocument::from_json(&raw)?);
    let target = document
        .find_by_id(&request.target)
        .ok_or_else(|| Error::node_not_found(format!("id=\"{}\"", request.target)))?;

    let app = init_app(config, Arc::clone(&document))?;
    let event = Event::new(request.event.as_str(), target).with_properties(request.properties.clone());
    let outcome = app.runtime.dispatcher().dispatch(event).await?;

    let listener = outcome.node().map(|node| document.describe(node));
    let result = match outcome {
        DispatchOutcome::Handled { result, .. } => result.as_json().cloned(),
        DispatchOutcome::Unhandled => None,
    };
    let serialized = app.runtime.serialize()?;
    info!(serialized, "Dispatch complete");

    Ok(DispatchSummary {
        listener,
        result,
        serialized,
        document: document.to_json_pretty()?,
    })
}

/// Parsed form of a QRL string, one part per line
pub fn describe_qrl(raw: &str) -> Result<String> {
    let qrl: Qrl = raw.parse()?;
    let mut lines = vec![
        format!("module: {}", qrl.module_path()),
        format!("export: {}", qrl.export_name()),
    ];
    if let Some(protocol) = qrl.protocol() {
        lines.push(format!("protocol: {protocol}"));
    }
    lines.extend(
        qrl.params()
            .iter()
            .map(|(key, value)| format!("param: {key}={value}")),
    );
    if !qrl.captured().is_empty() {
        lines.push(format!("captured: {}", Value::Array(qrl.captured().to_vec())));
    }
    lines.push(format!("canonical: {qrl}"));
    Ok(lines.join("\n"))
}

/// Encoded form of a composite key
pub fn encode_key(type_tag: &str, identity: &[String]) -> Result<String> {
    if type_tag.is_empty() {
        return Err(Error::invalid_key(type_tag, "empty type tag"));
    }
    Ok(CompositeKey::new(type_tag, identity.iter().cloned()).encode())
}

/// Type tag and identity values of an encoded key, one per line
pub fn decode_key(raw: &str) -> Result<String> {
    let key = CompositeKey::decode(raw)?;
    let mut lines = vec![format!("type: {}", key.type_tag())];
    lines.extend(key.identity().iter().map(|value| format!("identity: {value}")));
    Ok(lines.join("\n"))
}

/// Registered modules and their exports, one per line
pub fn modules() -> String {
    list_modules()
        .into_iter()
        .map(|(url, description)| {
            let exports = find_module(url)
                .map(|entry| (entry.build)().export_names().join(", "))
                .unwrap_or_default();
            format!("{url:<20} {description} [{exports}]")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
