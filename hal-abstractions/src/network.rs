//! Network stack abstraction
//!
//! The mesh stack owns sockets, message buffers and retransmission. The node
//! core only sees parsed requests and two ways to send: a response to a
//! request, or a new non-confirmable POST to a peer.

use core::net::{Ipv6Addr, SocketAddrV6};

/// Request method codes understood by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Transmission mode of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageType {
    /// The sender expects a response
    Confirmable,
    /// Fire-and-forget
    NonConfirmable,
    Acknowledgement,
    Reset,
}

/// A parsed incoming request
///
/// The payload is borrowed from the stack's message buffer and is only valid
/// for the duration of the handler call.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub method: Method,
    pub kind: MessageType,
    pub token: &'a [u8],
    pub payload: &'a [u8],
    pub peer: SocketAddrV6,
}

impl Request<'_> {
    /// Whether the peer demanded a response
    pub fn is_confirmable(&self) -> bool {
        self.kind == MessageType::Confirmable
    }
}

/// Errors reported by the network stack when sending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// No message buffer could be allocated
    NoBuffers,
    /// The stack refused or failed to send the message
    SendFailed,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoBuffers => write!(f, "No message buffers"),
            Self::SendFailed => write!(f, "Send failed"),
        }
    }
}

impl core::error::Error for TransportError {}

/// Sending side of the request/response transport
///
/// Implementors build the message (token, content format, payload marker)
/// and free it on failure; callers only see the outcome.
pub trait MessageTransport {
    /// Send a non-confirmable `Content` response echoing the request token
    ///
    /// An empty payload is sent as a bare acknowledgement without a content
    /// format option.
    fn send_response(&mut self, request: &Request<'_>, payload: &[u8])
        -> Result<(), TransportError>;

    /// Send a non-confirmable POST to `path` on `destination`
    fn send_request(
        &mut self,
        destination: SocketAddrV6,
        path: &str,
        payload: &[u8],
    ) -> Result<(), TransportError>;
}

/// Role of the device in the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceRole {
    Disabled,
    Detached,
    Child,
    Router,
    Leader,
}

impl DeviceRole {
    /// Attached devices can reach peers outside their own radio range
    pub fn is_attached(self) -> bool {
        matches!(self, Self::Child | Self::Router | Self::Leader)
    }
}

/// Identity and state exposed by the network stack
pub trait NetworkInfo {
    /// Factory-assigned IEEE EUI-64
    fn eui64(&self) -> [u8; 8];
    /// Extended (MAC) address currently in use
    fn extended_address(&self) -> [u8; 8];
    /// Mesh-local endpoint identifier
    fn mesh_local_eid(&self) -> Ipv6Addr;
    /// Current device role
    fn device_role(&self) -> DeviceRole;
}
