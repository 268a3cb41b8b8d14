//! Resolution contexts
//!
//! [`ElementInjector`] owns the instance cache of one node and walks outward
//! through scope boundaries when the node does not own a requested key.
//! [`EventInjector`] is created per dispatched event and delegates every
//! lookup to the element-scoped context of the listener node.

mod element;
mod event;

pub use element::ElementInjector;
pub use event::EventInjector;
