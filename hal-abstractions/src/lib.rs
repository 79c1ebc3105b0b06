//! Hardware and network abstraction traits for the mesh sensor node
//!
//! This crate defines the seams between the platform-agnostic node core and
//! everything it does not own: the mesh network stack, the monotonic clock,
//! the reset controller, notification LEDs and actuator outputs. Board
//! support crates implement these traits; `meshnode-core` consumes them.
//!
//! The `embedded-hal` adapters in [`actuator`] and [`indicator`] cover the
//! common cases (PWM dimmer channels, GPIO LEDs) so a board only has to hand
//! over its pins.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod actuator;
pub mod indicator;
pub mod network;
pub mod timer;

pub use actuator::{ActuatorError, PwmDimmer, SensorActuator};
pub use indicator::{Activity, ActivityIndicator, LedIndicator, RoleLeds};
pub use network::{
    DeviceRole, MessageTransport, MessageType, Method, NetworkInfo, Request, TransportError,
};
pub use timer::{Clock, ResetScheduler};
