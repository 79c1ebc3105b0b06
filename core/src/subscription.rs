//! Subscription engine
//!
//! The node has at most one subscriber. Until a peer claims the role with a
//! `sub` request, the engine advertises the node by broadcasting its info map
//! with exponential backoff. Once subscribed, every tick scans the registry
//! and pushes the slots whose value moved past their dead-band or whose
//! report interval elapsed.
//!
//! Nothing is sent while the device is detached from the mesh, and nothing at
//! all while the target is muted.

use core::net::{Ipv6Addr, SocketAddrV6};

use heapless::Vec;
use meshnode_hal::Activity;

use crate::codec::{encode_info, KvMapEncoder, NodeInfo, Payload, SubscriptionSink};
use crate::config::NodeConfig;
use crate::error::{CodecError, NodeError};
use crate::handlers::{DISCOVERY_PATH, REPORT_PATH};
use crate::node::Platform;
use crate::registry::Registry;

/// Target address that silences both discovery and reporting
pub const MUTED_ADDRESS: Ipv6Addr = Ipv6Addr::new(
    0xffff, 0xffff, 0xffff, 0xffff, 0xffff, 0xffff, 0xffff, 0xffff,
);

/// What the engine does on its next tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    /// No subscriber; broadcast discovery
    Discovery,
    /// Reporting switched off
    Muted,
    /// Push reports to this address
    Subscribed(Ipv6Addr),
}

/// The single subscriber and the discovery schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionTarget {
    address: Ipv6Addr,
    interval_ms: u32,
    last_action_at: u32,
}

impl SubscriptionTarget {
    /// Unsubscribed target broadcasting every `initial_interval_ms` at first
    pub const fn new(initial_interval_ms: u32) -> Self {
        Self {
            address: Ipv6Addr::UNSPECIFIED,
            interval_ms: initial_interval_ms,
            last_action_at: 0,
        }
    }

    pub fn address(&self) -> Ipv6Addr {
        self.address
    }

    /// Current discovery period
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn last_action_at(&self) -> u32 {
        self.last_action_at
    }

    pub fn state(&self) -> TargetState {
        if self.address.is_unspecified() {
            TargetState::Discovery
        } else if self.address == MUTED_ADDRESS {
            TargetState::Muted
        } else {
            TargetState::Subscribed(self.address)
        }
    }

    pub(crate) fn set_address(&mut self, address: Ipv6Addr) {
        self.address = address;
    }
}

/// Result of one engine tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Device role does not allow traffic
    Detached,
    Muted,
    /// Discovery period has not elapsed
    Waiting,
    /// Discovery broadcast sent
    Discovery,
    /// Subscribed, but no slot was due
    NothingDue,
    /// Report sent with this many values
    Reported(usize),
}

/// Run one engine step at the current clock time
pub(crate) fn tick<const N: usize>(
    registry: &mut Registry<'_, N>,
    target: &mut SubscriptionTarget,
    config: &NodeConfig,
    platform: &mut Platform<'_>,
) -> Result<TickOutcome, NodeError> {
    let role = platform.network.device_role();
    if !role.is_attached() {
        trace!("Tick skipped, role {}", role);
        return Ok(TickOutcome::Detached);
    }

    let now = platform.clock.now_ms();
    match target.state() {
        TargetState::Muted => Ok(TickOutcome::Muted),
        TargetState::Discovery => discover(registry, target, config, platform, now),
        TargetState::Subscribed(address) => {
            report(registry, target, config, platform, address, now)
        }
    }
}

fn discover<const N: usize>(
    registry: &Registry<'_, N>,
    target: &mut SubscriptionTarget,
    config: &NodeConfig,
    platform: &mut Platform<'_>,
    now: u32,
) -> Result<TickOutcome, NodeError> {
    if now.wrapping_sub(target.last_action_at) < target.interval_ms {
        return Ok(TickOutcome::Waiting);
    }

    target.last_action_at = now;
    target.interval_ms = target
        .interval_ms
        .saturating_mul(2)
        .min(config.discovery_max_interval_ms);

    let info = NodeInfo::collect(config, platform.network);
    let mut payload = Payload::new();
    encode_info(&mut payload, &info, registry.names())?;

    let destination = SocketAddrV6::new(config.discovery_group, config.coap_port, 0, 0);
    platform
        .transport
        .send_request(destination, DISCOVERY_PATH, &payload)?;
    platform.indicator.signal(Activity::Sent);

    info!(
        "Discovery broadcast sent, next in {} ms",
        target.interval_ms
    );
    Ok(TickOutcome::Discovery)
}

fn report<const N: usize>(
    registry: &mut Registry<'_, N>,
    target: &mut SubscriptionTarget,
    config: &NodeConfig,
    platform: &mut Platform<'_>,
    address: Ipv6Addr,
    now: u32,
) -> Result<TickOutcome, NodeError> {
    let mut payload = Payload::new();
    let mut map = KvMapEncoder::new(&mut payload)?;
    let mut count = 0;

    for slot in registry.slots_mut() {
        if !slot.reporting_enabled() || !slot.is_initialized() || !slot.is_due(now) {
            continue;
        }
        match map.entry(slot.name(), slot.current_value()) {
            Ok(()) => {
                slot.mark_reported(now);
                count += 1;
            }
            // Left unstamped; it goes out on a later tick
            Err(CodecError::BufferFull) => break,
            Err(e) => return Err(e.into()),
        }
    }

    if count == 0 {
        return Ok(TickOutcome::NothingDue);
    }
    map.finish()?;

    target.last_action_at = now;
    let destination = SocketAddrV6::new(address, config.coap_port, 0, 0);
    platform
        .transport
        .send_request(destination, REPORT_PATH, &payload)?;
    platform.indicator.signal(Activity::Sent);

    debug!("Report sent with {} values", count);
    Ok(TickOutcome::Reported(count))
}

/// Applies a decoded `sub` request to the registry and target
///
/// Remembers the address and the slots the request named so the response
/// can echo what was applied.
pub(crate) struct SubscriptionApplier<'r, 'a, const N: usize> {
    registry: &'r mut Registry<'a, N>,
    target: &'r mut SubscriptionTarget,
    address: Option<Ipv6Addr>,
    current: Option<usize>,
    named: Vec<char, N>,
}

impl<'r, 'a, const N: usize> SubscriptionApplier<'r, 'a, N> {
    pub(crate) fn new(
        registry: &'r mut Registry<'a, N>,
        target: &'r mut SubscriptionTarget,
    ) -> Self {
        Self {
            registry,
            target,
            address: None,
            current: None,
            named: Vec::new(),
        }
    }

    /// Address set by the request, if any
    pub(crate) fn applied_address(&self) -> Option<Ipv6Addr> {
        self.address
    }

    /// `(name, interval_ms, reportable_change)` of every named slot
    pub(crate) fn applied(&self) -> Vec<(char, u32, u64), N> {
        self.named
            .iter()
            .filter_map(|&name| self.registry.slot(name))
            .map(|slot| {
                (
                    slot.name(),
                    slot.report_interval_ms(),
                    slot.reportable_change(),
                )
            })
            .collect()
    }
}

impl<const N: usize> SubscriptionSink for SubscriptionApplier<'_, '_, N> {
    fn address(&mut self, address: Ipv6Addr) {
        self.target.set_address(address);
        self.address = Some(address);
    }

    fn begin_sensor(&mut self, name: char) -> Result<(), CodecError> {
        let index = self
            .registry
            .find_index(name)
            .ok_or(CodecError::UnknownSensor)?;
        self.current = Some(index);
        Ok(())
    }

    fn report_interval(&mut self, _name: char, interval_ms: u32) {
        if let Some(slot) = self.current.and_then(|i| self.registry.slot_at_mut(i)) {
            slot.set_report_interval(interval_ms);
        }
    }

    fn reportable_change(&mut self, _name: char, change: u64) {
        if let Some(slot) = self.current.and_then(|i| self.registry.slot_at_mut(i)) {
            slot.set_reportable_change(change);
        }
    }

    fn end_sensor(&mut self, name: char) {
        if let Some(slot) = self.current.take().and_then(|i| self.registry.slot_at_mut(i)) {
            slot.enable_reporting();
        }
        // Names come from the registry, so there is always room
        if !self.named.contains(&name) {
            let _ = self.named.push(name);
        }
    }
}
