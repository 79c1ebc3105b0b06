//! The node
//!
//! [`Node`] owns the sensor registry, the subscription target and the
//! configuration. Board code creates one at startup and feeds it from the
//! network stack's callbacks and a periodic timer. Every entry point borrows
//! the collaborators it needs through a [`Platform`], so the node holds no
//! references to hardware and no global state exists.

use meshnode_hal::{
    Activity, ActivityIndicator, Clock, MessageTransport, NetworkInfo, Request, ResetScheduler,
};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::handlers::{self, Resource};
use crate::registry::Registry;
use crate::sampling::SampleDrain;
use crate::subscription::{self, SubscriptionTarget, TickOutcome};

/// Collaborators lent to the node for one call
pub struct Platform<'p> {
    pub transport: &'p mut dyn MessageTransport,
    pub clock: &'p dyn Clock,
    pub network: &'p dyn NetworkInfo,
    pub indicator: &'p mut dyn ActivityIndicator,
    pub reset: &'p mut dyn ResetScheduler,
}

/// Sensor node with room for `N` slots
pub struct Node<'a, const N: usize> {
    registry: Registry<'a, N>,
    target: SubscriptionTarget,
    config: NodeConfig,
}

impl<'a, const N: usize> Node<'a, N> {
    /// Take ownership of a populated registry
    ///
    /// Slots without their own report interval get
    /// `config.default_report_interval_ms`. The node starts unsubscribed, in
    /// discovery.
    pub fn new(mut registry: Registry<'a, N>, config: NodeConfig) -> Self {
        registry.apply_default_report_interval(config.default_report_interval_ms);
        Self {
            registry,
            target: SubscriptionTarget::new(config.discovery_initial_interval_ms),
            config,
        }
    }

    pub fn registry(&self) -> &Registry<'a, N> {
        &self.registry
    }

    /// For hardware updates that do not go through the sample queue
    pub fn registry_mut(&mut self) -> &mut Registry<'a, N> {
        &mut self.registry
    }

    pub fn target(&self) -> &SubscriptionTarget {
        &self.target
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Serve a request for `path`
    ///
    /// Unknown paths are ignored. The receive indicator fires for every
    /// request, answered or not. An error means no response was sent.
    pub fn handle(
        &mut self,
        path: &str,
        request: &Request<'_>,
        platform: &mut Platform<'_>,
    ) -> Result<(), NodeError> {
        platform.indicator.signal(Activity::Received);

        let Some(resource) = Resource::from_path(path) else {
            trace!("No resource at '{}'", path);
            return Ok(());
        };

        let result = match resource {
            Resource::Boot => handlers::boot(request, &self.config, platform),
            Resource::Info => handlers::info(request, &self.registry, &self.config, platform),
            Resource::Set => handlers::set(request, &mut self.registry, platform),
            Resource::Get => handlers::get(request, &self.registry, platform),
            Resource::Sub => {
                handlers::sub(request, &mut self.registry, &mut self.target, platform)
            }
        };

        match result {
            Ok(()) => debug!("{} handled", resource),
            Err(NodeError::Transport(e)) => warn!("{} response not sent: {}", resource, e),
            Err(e) => debug!("{} dropped: {}", resource, e),
        }
        result
    }

    /// Run one subscription engine step
    pub fn tick(&mut self, platform: &mut Platform<'_>) -> Result<TickOutcome, NodeError> {
        let outcome = subscription::tick(
            &mut self.registry,
            &mut self.target,
            &self.config,
            platform,
        );
        if let Err(e) = outcome {
            warn!("Subscription tick failed: {}", e);
        }
        outcome
    }

    /// Apply queued hardware samples
    pub fn drain_samples<const Q: usize>(&mut self, drain: &mut SampleDrain<'_, Q>) -> usize {
        drain.drain_into(&mut self.registry)
    }
}

/// The stack answered an ICMPv6 echo request on our behalf
///
/// Pings never reach the node's resources; they only flash the receive LED.
pub fn on_echo_request(indicator: &mut dyn ActivityIndicator) {
    indicator.signal(Activity::Received);
}

#[cfg(test)]
mod tests {
    use ciborium_ll::Header;
    use meshnode_hal::{DeviceRole, MessageType, Method};

    use super::*;
    use crate::error::SensorError;
    use crate::registry::SensorSlot;
    use crate::sampling::SampleQueue;
    use crate::subscription::TargetState;
    use crate::testing::{cbor, dimmer_registry, request, Fakes};

    fn node() -> Node<'static, 8> {
        Node::new(dimmer_registry(), NodeConfig::default())
    }

    #[test]
    fn test_new_node_is_in_discovery() {
        let node = node();
        assert_eq!(node.target().state(), TargetState::Discovery);
        assert_eq!(node.target().interval_ms(), 1000);
        assert_eq!(node.registry().len(), 7);
    }

    #[test]
    fn test_configured_default_report_interval() {
        let mut registry = dimmer_registry();
        registry
            .register(SensorSlot::read_only('h').with_report_interval(1500))
            .unwrap();
        let config = NodeConfig {
            default_report_interval_ms: 30_000,
            ..Default::default()
        };

        let node = Node::new(registry, config);
        assert_eq!(node.registry().slot('r').unwrap().report_interval_ms(), 30_000);
        assert_eq!(node.registry().slot('t').unwrap().report_interval_ms(), 30_000);
        assert_eq!(node.registry().slot('h').unwrap().report_interval_ms(), 1500);
    }

    #[test]
    fn test_every_request_signals_received() {
        let mut node = node();
        let mut fakes = Fakes::new();

        let req = request(Method::Get, MessageType::Confirmable, &[]);
        node.handle("info", &req, &mut fakes.platform()).unwrap();
        node.handle("nope", &req, &mut fakes.platform()).unwrap();
        let _ = node.handle("boot", &req, &mut fakes.platform());
        let _ = node.handle("get", &req, &mut fakes.platform());

        assert_eq!(fakes.indicator.received, 4);
        assert_eq!(fakes.transport.responses.len(), 1);
    }

    #[test]
    fn test_unknown_path_is_ignored() {
        let mut node = node();
        let mut fakes = Fakes::new();
        let req = request(Method::Post, MessageType::Confirmable, &[]);

        assert_eq!(node.handle("rep", &req, &mut fakes.platform()), Ok(()));
        assert!(fakes.transport.responses.is_empty());
        assert!(fakes.reset.scheduled.is_empty());
    }

    #[test]
    fn test_set_then_get_through_node() {
        let mut node = node();
        let mut fakes = Fakes::new();

        let body = cbor(|e| {
            e.push(Header::Map(Some(1)))?;
            e.text("b", None)?;
            e.push(Header::Positive(77))
        });
        let req = request(Method::Put, MessageType::NonConfirmable, &body);
        node.handle("set", &req, &mut fakes.platform()).unwrap();

        let body = cbor(|e| {
            e.push(Header::Array(Some(1)))?;
            e.text("b", None)
        });
        let req = request(Method::Get, MessageType::Confirmable, &body);
        node.handle("get", &req, &mut fakes.platform()).unwrap();

        let (_, values) = &fakes.transport.responses[0];
        let pairs: std::vec::Vec<_> = crate::codec::decode_kv_map(values).unwrap().collect();
        assert_eq!(pairs, vec![Ok(('b', 77))]);
    }

    #[test]
    fn test_subscribe_then_report() {
        let mut node = node();
        let mut fakes = Fakes::new();
        let subscriber: [u8; 16] = [0xfd, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x09];

        let mut queue: SampleQueue<4> = SampleQueue::new();
        let (mut producer, mut drain) = queue.split();
        producer.push('t', 100);
        assert_eq!(node.drain_samples(&mut drain), 1);

        let body = cbor(|e| {
            e.push(Header::Map(Some(2)))?;
            e.text("a", None)?;
            e.bytes(&subscriber, None)?;
            e.text("s", None)?;
            e.push(Header::Map(Some(1)))?;
            e.text("t", None)?;
            e.push(Header::Map(Some(2)))?;
            e.text("i", None)?;
            e.push(Header::Positive(60_000))?;
            e.text("r", None)?;
            e.push(Header::Positive(5))
        });
        fakes.clock.now = 1000;
        let req = request(Method::Put, MessageType::Confirmable, &body);
        node.handle("sub", &req, &mut fakes.platform()).unwrap();

        fakes.clock.now = 1500;
        producer.push('t', 104);
        node.drain_samples(&mut drain);
        assert_eq!(node.tick(&mut fakes.platform()), Ok(TickOutcome::NothingDue));

        fakes.clock.now = 2000;
        producer.push('t', 106);
        node.drain_samples(&mut drain);
        assert_eq!(node.tick(&mut fakes.platform()), Ok(TickOutcome::Reported(1)));

        let (destination, path, _) = fakes.transport.requests.last().unwrap();
        assert_eq!(destination.ip().octets(), subscriber);
        assert_eq!(path, "rep");
        assert_eq!(node.target().last_action_at(), 2000);
    }

    #[test]
    fn test_tick_while_detached() {
        let mut node = node();
        let mut fakes = Fakes::new();
        fakes.network.role = DeviceRole::Disabled;
        fakes.clock.now = 10_000;
        assert_eq!(node.tick(&mut fakes.platform()), Ok(TickOutcome::Detached));
        assert!(fakes.transport.requests.is_empty());
    }

    #[test]
    fn test_registry_mut_for_direct_updates() {
        let mut node = node();
        assert_eq!(node.registry().get_value('V'), Err(SensorError::NotInitialized));
        node.registry_mut().set_value('V', 5, false).unwrap();
        assert_eq!(node.registry().get_value('V'), Ok(5));
    }

    #[test]
    fn test_echo_request_signals_received() {
        let mut fakes = Fakes::new();
        on_echo_request(&mut fakes.indicator);
        assert_eq!(fakes.indicator.received, 1);
        assert_eq!(fakes.indicator.sent, 0);
    }
}
