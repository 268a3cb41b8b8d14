//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for symbol resolution, instance materialization and dispatch
///
/// Every variant carries owned strings only, so the error is `Clone`. A
/// single in-flight materialization shares its outcome with every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A QRL's module could not be fetched or imported
    #[error("Failed to load module {url}: {message}")]
    ModuleLoad {
        /// Resolved module URL
        url: String,
        /// Loader diagnostic
        message: String,
    },

    /// The module loaded but does not export the requested symbol
    #[error("Symbol '{export}' not found in module {url}")]
    SymbolNotFound {
        /// Resolved module URL
        url: String,
        /// Requested export name
        export: String,
    },

    /// The export exists but is not the kind of symbol the caller needs
    #[error("Symbol '{export}' in module {url} is not a {expected}")]
    SymbolKind {
        /// Resolved module URL
        url: String,
        /// Requested export name
        export: String,
        /// Expected symbol kind
        expected: String,
    },

    /// Neither state nor factory attribute was found up the resolution chain
    #[error("No attribute '{attribute}'{} found starting at {node}", .secondary.as_ref().map(|s| format!(" or '{s}'")).unwrap_or_default())]
    NoAttributeFound {
        /// Primary attribute searched (the encoded key)
        attribute: String,
        /// Secondary attribute searched (the factory attribute), if any
        secondary: Option<String>,
        /// Description of the node where the search started
        node: String,
    },

    /// A factory type overrode the protected construction hook
    #[error("Type '{type_tag}' overrides the protected constructor")]
    OverriddenConstructor {
        /// Offending type tag
        type_tag: String,
    },

    /// A re-emit request did not name the event to raise
    #[error("Missing '$type' parameter in {url}")]
    MissingEventType {
        /// URL of the re-emit request
        url: String,
    },

    /// A re-emit walk reached the root without finding a listener
    #[error("No listener '{attribute}' for event '{event}' found from {node}")]
    NoListenerFound {
        /// Event type being re-emitted
        event: String,
        /// Attribute name searched for
        attribute: String,
        /// Description of the node where the walk started
        node: String,
    },

    /// A transient context was asked to serialize itself
    #[error("{context} is transient and cannot be serialized")]
    NotSerializable {
        /// Description of the context
        context: String,
    },

    /// A QRL string could not be parsed or resolved to a URL
    #[error("Invalid QRL '{input}': {message}")]
    InvalidQrl {
        /// Offending input
        input: String,
        /// Description of the problem
        message: String,
    },

    /// A composite key could not be decoded or built
    #[error("Invalid key '{input}': {message}")]
    InvalidKey {
        /// Offending input
        input: String,
        /// Description of the problem
        message: String,
    },

    /// A node id does not belong to the document
    #[error("Node not found: {node}")]
    NodeNotFound {
        /// The missing node
        node: String,
    },

    /// JSON encoding or decoding error
    #[error("JSON error: {message}")]
    Json {
        /// Description of the JSON error
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error
        message: String,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

// Resolution error creation methods
impl Error {
    /// Create a module load error
    pub fn module_load<U: Into<String>, S: Into<String>>(url: U, message: S) -> Self {
        Self::ModuleLoad {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a symbol not found error
    pub fn symbol_not_found<U: Into<String>, S: Into<String>>(url: U, export: S) -> Self {
        Self::SymbolNotFound {
            url: url.into(),
            export: export.into(),
        }
    }

    /// Create a symbol kind mismatch error
    pub fn symbol_kind<U: Into<String>, S: Into<String>>(
        url: U,
        export: S,
        expected: &str,
    ) -> Self {
        Self::SymbolKind {
            url: url.into(),
            export: export.into(),
            expected: expected.to_string(),
        }
    }

    /// Create a no attribute found error
    pub fn no_attribute_found<A: Into<String>, N: Into<String>>(
        attribute: A,
        secondary: Option<String>,
        node: N,
    ) -> Self {
        Self::NoAttributeFound {
            attribute: attribute.into(),
            secondary,
            node: node.into(),
        }
    }

    /// Create an overridden constructor error
    pub fn overridden_constructor<S: Into<String>>(type_tag: S) -> Self {
        Self::OverriddenConstructor {
            type_tag: type_tag.into(),
        }
    }
}

// Dispatch error creation methods
impl Error {
    /// Create a missing event type error
    pub fn missing_event_type<S: Into<String>>(url: S) -> Self {
        Self::MissingEventType { url: url.into() }
    }

    /// Create a no listener found error
    pub fn no_listener_found<E: Into<String>, A: Into<String>, N: Into<String>>(
        event: E,
        attribute: A,
        node: N,
    ) -> Self {
        Self::NoListenerFound {
            event: event.into(),
            attribute: attribute.into(),
            node: node.into(),
        }
    }

    /// Create a not serializable error
    pub fn not_serializable<S: Into<String>>(context: S) -> Self {
        Self::NotSerializable {
            context: context.into(),
        }
    }
}

// Input and system error creation methods
impl Error {
    /// Create an invalid QRL error
    pub fn invalid_qrl<I: Into<String>, S: Into<String>>(input: I, message: S) -> Self {
        Self::InvalidQrl {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create an invalid key error
    pub fn invalid_key<I: Into<String>, S: Into<String>>(input: I, message: S) -> Self {
        Self::InvalidKey {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a node not found error
    pub fn node_not_found<S: Into<String>>(node: S) -> Self {
        Self::NodeNotFound { node: node.into() }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl Error {
    /// Whether this error means "nothing declared here" rather than a broken declaration
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NoAttributeFound { .. } | Self::NoListenerFound { .. } | Self::NodeNotFound { .. }
        )
    }
}
