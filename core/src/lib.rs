//! Platform-agnostic core of the mesh sensor node
//!
//! This crate holds everything the node does that does not depend on a
//! particular board or network stack:
//!
//! - **`registry`**: named sensor and actuator slots with reporting state
//! - **`codec`**: CBOR bodies exchanged with peers
//! - **`handlers`**: the `boot`, `info`, `set`, `get` and `sub` resources
//! - **`subscription`**: discovery broadcasts and change reports
//! - **`sampling`**: interrupt-safe hand-off of hardware readings
//! - **`node`**: ties the above together behind a single owner
//!
//! Hardware and the network stack are reached only through the traits in
//! `meshnode-hal`, passed in per call.
//!
//! Enable the `defmt` feature to get log output on target.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod codec;
pub mod config;
pub mod error;
pub mod handlers;
pub mod node;
pub mod registry;
pub mod sampling;
pub mod subscription;

#[cfg(test)]
mod testing;

pub use config::NodeConfig;
pub use error::{CodecError, NodeError, SensorError};
pub use handlers::Resource;
pub use node::{on_echo_request, Node, Platform};
pub use registry::{Registry, SensorSlot};
pub use sampling::{Sample, SampleDrain, SampleProducer, SampleQueue};
pub use subscription::{SubscriptionTarget, TargetState, TickOutcome};
