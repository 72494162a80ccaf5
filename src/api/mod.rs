//! This mod is meant to hold most of the code for the library's client-facing API.
mod client;
mod events;
mod handle;
mod options;
mod wiring;

pub use client::RingNode;
pub use events::RingEventStream;
pub use events::RingStateListener;
pub use handle::RingHandle;
pub use options::RingOptions;
pub use wiring::try_create_ring_node;
pub use wiring::RingNodeConfig;
pub use wiring::RingNodeCreationError;
