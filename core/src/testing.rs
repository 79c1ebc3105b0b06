//! Fakes for host tests

use core::net::{Ipv6Addr, SocketAddrV6};

use meshnode_hal::{
    ActuatorError, Activity, ActivityIndicator, Clock, DeviceRole, MessageTransport, MessageType,
    Method, NetworkInfo, Request, ResetScheduler, SensorActuator, TransportError,
};

use crate::codec::{encoder, CborEncoder, Payload};
use crate::error::CodecError;
use crate::node::Platform;
use crate::registry::{Registry, SensorSlot};

/// Build a body by hand, header by header
pub(crate) fn cbor(
    build: impl FnOnce(&mut CborEncoder<'_>) -> Result<(), CodecError>,
) -> Payload {
    let mut payload = Payload::new();
    let mut enc = encoder(&mut payload);
    build(&mut enc).unwrap();
    drop(enc);
    payload
}

pub(crate) const PEER: Ipv6Addr = Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 0x99);
pub(crate) const TOKEN: &[u8] = &[0x5a, 0x17];

pub(crate) fn request(method: Method, kind: MessageType, payload: &[u8]) -> Request<'_> {
    Request {
        method,
        kind,
        token: TOKEN,
        payload,
        peer: SocketAddrV6::new(PEER, 5683, 0, 0),
    }
}

/// The dimmer board's table: four writable channels, two voltages and a
/// temperature
pub(crate) fn dimmer_registry() -> Registry<'static, 8> {
    let mut registry = Registry::new();
    for name in ['r', 'g', 'b', 'w'] {
        registry.register(SensorSlot::writable(name)).unwrap();
    }
    for name in ['v', 'V', 't'] {
        registry.register(SensorSlot::read_only(name)).unwrap();
    }
    registry
}

/// Records everything sent
#[derive(Default)]
pub(crate) struct FakeTransport {
    /// `(token, payload)` per response
    pub responses: Vec<(Vec<u8>, Vec<u8>)>,
    /// `(destination, path, payload)` per request
    pub requests: Vec<(SocketAddrV6, String, Vec<u8>)>,
    pub fail: bool,
}

impl MessageTransport for FakeTransport {
    fn send_response(
        &mut self,
        request: &Request<'_>,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::SendFailed);
        }
        self.responses
            .push((request.token.to_vec(), payload.to_vec()));
        Ok(())
    }

    fn send_request(
        &mut self,
        destination: SocketAddrV6,
        path: &str,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError::SendFailed);
        }
        self.requests
            .push((destination, path.to_string(), payload.to_vec()));
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct ManualClock {
    pub now: u32,
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.now
    }
}

pub(crate) struct FixedNetwork {
    pub role: DeviceRole,
}

impl NetworkInfo for FixedNetwork {
    fn eui64(&self) -> [u8; 8] {
        [0xf4, 0xce, 0x36, 0x00, 0x00, 0x12, 0x34, 0x56]
    }

    fn extended_address(&self) -> [u8; 8] {
        [0x2a, 0x91, 0x0c, 0x44, 0x7e, 0x01, 0xb3, 0x6d]
    }

    fn mesh_local_eid(&self) -> Ipv6Addr {
        Ipv6Addr::new(0xfdde, 0xad00, 0xbeef, 0, 0x1c2d, 0x3e4f, 0x5061, 0x7283)
    }

    fn device_role(&self) -> DeviceRole {
        self.role
    }
}

#[derive(Default)]
pub(crate) struct CountingIndicator {
    pub received: usize,
    pub sent: usize,
}

impl ActivityIndicator for CountingIndicator {
    fn signal(&mut self, activity: Activity) {
        match activity {
            Activity::Received => self.received += 1,
            Activity::Sent => self.sent += 1,
        }
    }
}

#[derive(Default)]
pub(crate) struct RecordingReset {
    pub scheduled: Vec<u32>,
}

impl ResetScheduler for RecordingReset {
    fn schedule_reset(&mut self, delay_ms: u32) {
        self.scheduled.push(delay_ms);
    }
}

#[derive(Default)]
pub(crate) struct RecordingActuator {
    pub calls: Vec<(char, i64)>,
    pub fail: bool,
}

impl SensorActuator for RecordingActuator {
    fn on_external_set(&mut self, name: char, value: i64) -> Result<(), ActuatorError> {
        if self.fail {
            return Err(ActuatorError::Hardware);
        }
        self.calls.push((name, value));
        Ok(())
    }
}

/// One of every collaborator, attached to the mesh as a child
pub(crate) struct Fakes {
    pub transport: FakeTransport,
    pub clock: ManualClock,
    pub network: FixedNetwork,
    pub indicator: CountingIndicator,
    pub reset: RecordingReset,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            transport: FakeTransport::default(),
            clock: ManualClock::default(),
            network: FixedNetwork {
                role: DeviceRole::Child,
            },
            indicator: CountingIndicator::default(),
            reset: RecordingReset::default(),
        }
    }

    pub fn platform(&mut self) -> Platform<'_> {
        Platform {
            transport: &mut self.transport,
            clock: &self.clock,
            network: &self.network,
            indicator: &mut self.indicator,
            reset: &mut self.reset,
        }
    }
}
