//! Resource handlers
//!
//! One function per inbound resource. Each checks the request method and
//! message type, does its work against the registry and answers through the
//! transport. Any error aborts the request without a response; the peer's
//! retransmission logic takes it from there.
//!
//! | Resource | Method | Message types | Response |
//! |----------|--------|---------------|----------|
//! | `boot`   | POST   | any           | empty ack, then reset |
//! | `info`   | GET    | any           | info map |
//! | `set`    | PUT    | CON, NON      | map of applied pairs (CON only) |
//! | `get`    | GET    | CON           | map of requested values |
//! | `sub`    | PUT    | CON, NON      | applied configuration (CON only) |

use meshnode_hal::{MessageType, Method, Request};

use crate::codec::{
    decode_key_list, decode_kv_map, encode_info, encode_subscription_echo, KvMapEncoder,
    NodeInfo, Payload, SubscriptionDecoder,
};
use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::node::Platform;
use crate::registry::Registry;
use crate::subscription::{SubscriptionApplier, SubscriptionTarget};

/// Outbound path of discovery broadcasts
pub const DISCOVERY_PATH: &str = "up";

/// Outbound path of subscription reports
pub const REPORT_PATH: &str = "rep";

/// Inbound resources served by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resource {
    Boot,
    Info,
    Set,
    Get,
    Sub,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Boot,
        Resource::Info,
        Resource::Set,
        Resource::Get,
        Resource::Sub,
    ];

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "boot" => Some(Self::Boot),
            "info" => Some(Self::Info),
            "set" => Some(Self::Set),
            "get" => Some(Self::Get),
            "sub" => Some(Self::Sub),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::Info => "info",
            Self::Set => "set",
            Self::Get => "get",
            Self::Sub => "sub",
        }
    }
}

fn require_method(request: &Request<'_>, method: Method) -> Result<(), NodeError> {
    if request.method != method {
        return Err(NodeError::Rejected);
    }
    Ok(())
}

fn require_con_or_non(request: &Request<'_>) -> Result<(), NodeError> {
    match request.kind {
        MessageType::Confirmable | MessageType::NonConfirmable => Ok(()),
        _ => Err(NodeError::Rejected),
    }
}

/// Acknowledge, then ask for a reset
///
/// The reset is scheduled even when the acknowledgement could not be sent.
pub(crate) fn boot(
    request: &Request<'_>,
    config: &NodeConfig,
    platform: &mut Platform<'_>,
) -> Result<(), NodeError> {
    require_method(request, Method::Post)?;

    let ack = platform.transport.send_response(request, &[]);
    if let Err(e) = ack {
        warn!("Boot acknowledgement failed: {}", e);
    }
    platform.reset.schedule_reset(config.reset_delay_ms);
    info!("Reset scheduled in {} ms", config.reset_delay_ms);

    ack.map_err(NodeError::from)
}

pub(crate) fn info<const N: usize>(
    request: &Request<'_>,
    registry: &Registry<'_, N>,
    config: &NodeConfig,
    platform: &mut Platform<'_>,
) -> Result<(), NodeError> {
    require_method(request, Method::Get)?;

    let info = NodeInfo::collect(config, platform.network);
    let mut payload = Payload::new();
    encode_info(&mut payload, &info, registry.names())?;

    platform.transport.send_response(request, &payload)?;
    Ok(())
}

/// Write every known, writable key and echo what was written
///
/// Unknown and read-only keys are skipped. A decoding error aborts the
/// request; pairs applied before it stay applied.
pub(crate) fn set<const N: usize>(
    request: &Request<'_>,
    registry: &mut Registry<'_, N>,
    platform: &mut Platform<'_>,
) -> Result<(), NodeError> {
    require_method(request, Method::Put)?;
    require_con_or_non(request)?;

    let pairs = decode_kv_map(request.payload)?;
    let mut payload = Payload::new();
    let mut echo = KvMapEncoder::new(&mut payload)?;

    for pair in pairs {
        let (name, value) = pair?;
        if let Err(e) = registry.check_writable(name) {
            debug!("Skipping '{}': {}", name, e);
            continue;
        }
        registry.set_value(name, value, true)?;
        echo.entry(name, value)?;
    }
    let written = echo.finish()?;
    debug!("Set {} values", written);

    if request.is_confirmable() {
        platform.transport.send_response(request, &payload)?;
    }
    Ok(())
}

/// Answer with the value of every requested key
///
/// Fails fast: one unknown or uninitialized key drops the whole request.
pub(crate) fn get<const N: usize>(
    request: &Request<'_>,
    registry: &Registry<'_, N>,
    platform: &mut Platform<'_>,
) -> Result<(), NodeError> {
    require_method(request, Method::Get)?;
    if !request.is_confirmable() {
        return Err(NodeError::Rejected);
    }

    let keys = decode_key_list(request.payload)?;
    let mut payload = Payload::new();
    let mut values = KvMapEncoder::new(&mut payload)?;
    for key in keys {
        let name = key?;
        values.entry(name, registry.get_value(name)?)?;
    }
    values.finish()?;

    platform.transport.send_response(request, &payload)?;
    Ok(())
}

/// Take over the subscription
///
/// Once the body is known to be a map every slot is re-armed, then the
/// address and per-slot settings are applied as they are parsed.
pub(crate) fn sub<const N: usize>(
    request: &Request<'_>,
    registry: &mut Registry<'_, N>,
    target: &mut SubscriptionTarget,
    platform: &mut Platform<'_>,
) -> Result<(), NodeError> {
    require_method(request, Method::Put)?;
    require_con_or_non(request)?;

    let decoder = SubscriptionDecoder::new(request.payload)?;
    registry.rearm(platform.clock.now_ms());

    let mut applier = SubscriptionApplier::new(registry, target);
    decoder.apply(&mut applier)?;

    if request.is_confirmable() {
        let mut payload = Payload::new();
        encode_subscription_echo(
            &mut payload,
            applier.applied_address(),
            applier.applied().into_iter(),
        )?;
        platform.transport.send_response(request, &payload)?;
    }
    Ok(())
}
