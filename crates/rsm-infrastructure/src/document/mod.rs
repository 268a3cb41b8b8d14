//! Document tree implementations

pub mod memory;

pub use memory::{MemoryDocument, NodeSpec};
