//! Domain ports
//!
//! Interfaces the domain expects the outer layers to provide.

pub mod codec;
pub mod document;

pub use codec::{Codec, JsonCodec};
pub use document::DocumentTree;
