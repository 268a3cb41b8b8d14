//! # Resumable Runtime - Domain Layer
//!
//! Core types shared by every layer of the resumable runtime:
//!
//! - [`value_objects`] - QRL symbol references, composite instance keys,
//!   events, node identifiers
//! - [`ports`] - the document tree port and the `Codec` serialization boundary
//! - [`error`] - the error taxonomy for resolution and dispatch
//! - [`constants`] - wire-format constants and attribute defaults
//!
//! The domain layer has no async runtime dependency. Everything that awaits
//! (module loading, instance materialization, dispatch) lives in
//! `rsm-application`.

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use ports::{Codec, DocumentTree};
pub use value_objects::{CompositeKey, Event, KeyCodec, NodeId, Props, Qrl};
