//! Domain layer constants
//!
//! Wire-format constants shared by the QRL parser, the key codec and the
//! attribute naming rules. Defaults for configurable attribute names live here
//! so that the infrastructure config and the application settings agree.

// ============================================================================
// QRL WIRE FORMAT
// ============================================================================

/// Export name used when a QRL string omits `#exportName`
pub const DEFAULT_EXPORT_NAME: &str = "default";

/// Separator between the module locator and the export name
pub const QRL_EXPORT_SEPARATOR: char = '#';

/// Separator between the symbol part and the query parameters
pub const QRL_QUERY_SEPARATOR: char = '?';

/// Reserved query parameter carrying captured arguments as a JSON array
pub const CAPTURE_PARAM: &str = "$capture";

/// Reserved query parameter naming the event to re-emit
pub const EVENT_TYPE_PARAM: &str = "$type";

// ============================================================================
// COMPOSITE KEY ENCODING
// ============================================================================

/// Delimiter between the type tag and each identity value
pub const KEY_DELIMITER: char = ':';

/// Escape character for delimiters and escapes inside key segments
pub const KEY_ESCAPE: char = '\\';

// ============================================================================
// ATTRIBUTE NAMING DEFAULTS
// ============================================================================

/// Prefix prepended to the kebab-case event name (`on:click`)
pub const DEFAULT_EVENT_PREFIX: &str = "on:";

/// Prefix prepended to a type tag to name its factory attribute (`::todo`)
pub const DEFAULT_FACTORY_PREFIX: &str = "::";

/// Attribute overriding the base URI for a subtree
pub const DEFAULT_BASE_ATTRIBUTE: &str = "q:base";

/// Attribute marking a node as a resolution scope boundary
pub const DEFAULT_HOST_ATTRIBUTE: &str = "q:host";

/// Base URI used when neither the document nor an ancestor declares one
pub const DEFAULT_BASE_URI: &str = "file:///";
