//! Node configuration
//!
//! Everything here is fixed at build time. Boards that need different values
//! construct a [`NodeConfig`] by hand instead of using `Default`.
//!
//! Most fields are read by the node itself. The timer periods
//! `subscription_tick_ms` and `activity_blink_ms` belong to board code, which
//! owns the timers that call [`Node::tick`](crate::Node::tick) and
//! [`LedIndicator::settle`](meshnode_hal::LedIndicator::settle); they live here
//! so one struct describes the whole node.

use core::net::Ipv6Addr;

/// Upper bound for every request and response body
pub const PAYLOAD_CAPACITY: usize = 256;

/// Default CoAP port
pub const COAP_DEFAULT_PORT: u16 = 5683;

/// Realm-local all-nodes group used for discovery broadcasts (`ff03::1`)
pub const DISCOVERY_GROUP: Ipv6Addr = Ipv6Addr::new(0xff03, 0, 0, 0, 0, 0, 0, 1);

/// Static node settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    /// Firmware type reported in the info map (`t`)
    pub firmware_type: &'static str,
    /// Firmware version reported in the info map (`v`)
    pub firmware_version: &'static str,
    /// Period of the board timer that calls `Node::tick` (board side)
    pub subscription_tick_ms: u32,
    /// Discovery broadcast period before any backoff
    pub discovery_initial_interval_ms: u32,
    /// Backoff ceiling for discovery broadcasts
    pub discovery_max_interval_ms: u32,
    /// Report interval `Node::new` gives slots built without one
    pub default_report_interval_ms: u32,
    /// Delay between the `boot` acknowledgement and the reset
    pub reset_delay_ms: u32,
    /// Delay before the board's one-shot timer settles the notification
    /// LEDs (board side)
    pub activity_blink_ms: u32,
    /// Port used for outbound discovery and reports
    pub coap_port: u16,
    /// Destination of discovery broadcasts
    pub discovery_group: Ipv6Addr,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            firmware_type: "dimmer",
            firmware_version: "1.0.0",
            subscription_tick_ms: 500,
            discovery_initial_interval_ms: 1000,
            discovery_max_interval_ms: 60_000,
            default_report_interval_ms: 10_000,
            reset_delay_ms: 1000,
            activity_blink_ms: 25,
            coap_port: COAP_DEFAULT_PORT,
            discovery_group: DISCOVERY_GROUP,
        }
    }
}
