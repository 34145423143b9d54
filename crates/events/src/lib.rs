//! Change notification plumbing.
//!
//! Screens (or any other consumer) subscribe to the slice of store state they
//! render and are told when it changes. This crate holds the transport only;
//! the change payloads live next to the state that emits them.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
