//! Error types for the node core
//!
//! None of these are fatal. A handler that hits one drops the request
//! without answering; the peer retries at the protocol layer.

use meshnode_hal::TransportError;

/// Registry lookup and registration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// No slot with that name
    NotFound,
    /// The slot has never received a value
    NotInitialized,
    /// External writes to the slot are not allowed
    ReadOnly,
    /// A slot with that name is already registered
    DuplicateName,
    /// The registry table is full
    CapacityExceeded,
}

impl core::fmt::Display for SensorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Sensor not found"),
            Self::NotInitialized => write!(f, "Sensor not initialized"),
            Self::ReadOnly => write!(f, "Sensor is read-only"),
            Self::DuplicateName => write!(f, "Duplicate sensor name"),
            Self::CapacityExceeded => write!(f, "Sensor table full"),
        }
    }
}

impl core::error::Error for SensorError {}

/// Payload encoding and decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Incoming body larger than the payload buffer
    Oversized,
    /// Outgoing payload does not fit the buffer
    BufferFull,
    /// Body ended in the middle of an item
    Truncated,
    /// Not well-formed CBOR
    Malformed,
    /// Item has the wrong major type
    UnexpectedType,
    /// Map key is not exactly one character
    InvalidKey,
    /// Map key is not part of the schema
    UnknownField,
    /// Subscription names a sensor that does not exist
    UnknownSensor,
    /// Address is not 16 bytes
    InvalidAddress,
    /// Integer outside the range of the target field
    OutOfRange,
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Oversized => write!(f, "Payload too large"),
            Self::BufferFull => write!(f, "Payload buffer full"),
            Self::Truncated => write!(f, "Payload truncated"),
            Self::Malformed => write!(f, "Malformed payload"),
            Self::UnexpectedType => write!(f, "Unexpected item type"),
            Self::InvalidKey => write!(f, "Invalid key"),
            Self::UnknownField => write!(f, "Unknown field"),
            Self::UnknownSensor => write!(f, "Unknown sensor"),
            Self::InvalidAddress => write!(f, "Invalid address"),
            Self::OutOfRange => write!(f, "Integer out of range"),
        }
    }
}

impl core::error::Error for CodecError {}

impl From<ciborium_ll::Error<CodecError>> for CodecError {
    fn from(e: ciborium_ll::Error<CodecError>) -> Self {
        match e {
            ciborium_ll::Error::Io(e) => e,
            ciborium_ll::Error::Syntax(_) => CodecError::Malformed,
        }
    }
}

/// Reason a request or tick was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeError {
    /// Method or message type not accepted by the resource
    Rejected,
    Sensor(SensorError),
    Codec(CodecError),
    Transport(TransportError),
}

impl core::fmt::Display for NodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Rejected => write!(f, "Request rejected"),
            Self::Sensor(e) => write!(f, "{}", e),
            Self::Codec(e) => write!(f, "{}", e),
            Self::Transport(e) => write!(f, "{}", e),
        }
    }
}

impl core::error::Error for NodeError {}

impl From<SensorError> for NodeError {
    fn from(e: SensorError) -> Self {
        NodeError::Sensor(e)
    }
}

impl From<CodecError> for NodeError {
    fn from(e: CodecError) -> Self {
        NodeError::Codec(e)
    }
}

impl From<TransportError> for NodeError {
    fn from(e: TransportError) -> Self {
        NodeError::Transport(e)
    }
}
