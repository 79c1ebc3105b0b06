//! Wire codec
//!
//! Schema-level encoders and decoders for the CBOR bodies exchanged with
//! peers. The header-level work is done by `ciborium-ll`; this module adds
//! the shapes the node speaks:
//!
//! - **`info`**: identity map sent by `info` and discovery broadcasts
//! - **`kv`**: single-character key to integer maps, and key arrays
//! - **`subscription`**: subscription configuration and its echo
//!
//! Every outgoing body is written into a [`Payload`], a fixed-capacity
//! buffer, so an oversized encoding fails with [`CodecError::BufferFull`]
//! instead of truncating. Incoming bodies larger than the same bound are
//! refused before any parsing.
//!
//! Containers are written with indefinite length and closed with a break.
//! Decoders accept both definite and indefinite containers.

pub mod info;
pub mod kv;
pub mod subscription;

use core::net::Ipv6Addr;

use ciborium_ll::{Decoder, Encoder, Header};

use crate::config::PAYLOAD_CAPACITY;
use crate::error::CodecError;

pub use info::{encode_info, NodeInfo};
pub use kv::{decode_key_list, decode_kv_map, KeyList, KvMapEncoder, KvPairs};
pub use subscription::{encode_subscription_echo, SubscriptionDecoder, SubscriptionSink};

/// Bounded body buffer
pub type Payload = heapless::Vec<u8, PAYLOAD_CAPACITY>;

pub(crate) type CborEncoder<'p> = Encoder<PayloadWriter<'p>>;
pub(crate) type CborDecoder<'a> = Decoder<SliceReader<'a>>;

/// Appends encoder output to a [`Payload`]
pub(crate) struct PayloadWriter<'p> {
    payload: &'p mut Payload,
}

impl ciborium_io::Write for PayloadWriter<'_> {
    type Error = CodecError;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.payload
            .extend_from_slice(data)
            .map_err(|_| CodecError::BufferFull)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Feeds a borrowed body to the decoder
pub(crate) struct SliceReader<'a> {
    remaining: &'a [u8],
}

impl ciborium_io::Read for SliceReader<'_> {
    type Error = CodecError;

    fn read_exact(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        if data.len() > self.remaining.len() {
            return Err(CodecError::Truncated);
        }
        let (head, tail) = self.remaining.split_at(data.len());
        data.copy_from_slice(head);
        self.remaining = tail;
        Ok(())
    }
}

/// Start encoding at the end of `payload`
pub(crate) fn encoder(payload: &mut Payload) -> CborEncoder<'_> {
    Encoder::from(PayloadWriter { payload })
}

/// Start decoding `body`, refusing anything over the payload bound
pub(crate) fn decoder(body: &[u8]) -> Result<CborDecoder<'_>, CodecError> {
    if body.len() > PAYLOAD_CAPACITY {
        return Err(CodecError::Oversized);
    }
    Ok(Decoder::from(SliceReader { remaining: body }))
}

pub(crate) fn write_key(encoder: &mut CborEncoder<'_>, key: char) -> Result<(), CodecError> {
    let mut buf = [0u8; 4];
    encoder.text(key.encode_utf8(&mut buf), None)
}

pub(crate) fn write_int(encoder: &mut CborEncoder<'_>, value: i64) -> Result<(), CodecError> {
    let header = if value >= 0 {
        Header::Positive(value as u64)
    } else {
        // CBOR stores -1 - n; in two's complement that is !value
        Header::Negative(!value as u64)
    };
    encoder.push(header)
}

pub(crate) fn write_uint(encoder: &mut CborEncoder<'_>, value: u64) -> Result<(), CodecError> {
    encoder.push(Header::Positive(value))
}

/// Remaining entries of an open container
#[derive(Debug, Clone, Copy)]
pub(crate) enum Entries {
    Counted(usize),
    UntilBreak,
}

impl Entries {
    pub(crate) fn new(len: Option<usize>) -> Self {
        match len {
            Some(n) => Self::Counted(n),
            None => Self::UntilBreak,
        }
    }

    /// Header of the next entry, or `None` once the container is exhausted
    pub(crate) fn next(&mut self, decoder: &mut CborDecoder<'_>) -> Result<Option<Header>, CodecError> {
        match self {
            Self::Counted(0) => Ok(None),
            Self::Counted(n) => {
                *n -= 1;
                Ok(Some(decoder.pull()?))
            }
            Self::UntilBreak => match decoder.pull()? {
                Header::Break => Ok(None),
                header => Ok(Some(header)),
            },
        }
    }
}

/// Open a map, returning its entry counter
pub(crate) fn enter_map(decoder: &mut CborDecoder<'_>) -> Result<Entries, CodecError> {
    match decoder.pull()? {
        Header::Map(len) => Ok(Entries::new(len)),
        _ => Err(CodecError::UnexpectedType),
    }
}

/// Open an array, returning its entry counter
pub(crate) fn enter_array(decoder: &mut CborDecoder<'_>) -> Result<Entries, CodecError> {
    match decoder.pull()? {
        Header::Array(len) => Ok(Entries::new(len)),
        _ => Err(CodecError::UnexpectedType),
    }
}

/// Read a one-character text key whose header was already pulled
pub(crate) fn read_key(decoder: &mut CborDecoder<'_>, header: Header) -> Result<char, CodecError> {
    let len = match header {
        Header::Text(len) => len,
        _ => return Err(CodecError::UnexpectedType),
    };

    let mut key = heapless::String::<4>::new();
    let mut buf = [0u8; 16];
    let mut segments = decoder.text(len);
    while let Some(mut segment) = segments.pull()? {
        while let Some(chunk) = segment.pull(&mut buf)? {
            key.push_str(chunk).map_err(|_| CodecError::InvalidKey)?;
        }
    }

    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CodecError::InvalidKey),
    }
}

/// Read a signed integer that must fit in `i64`
pub(crate) fn read_int(decoder: &mut CborDecoder<'_>) -> Result<i64, CodecError> {
    match decoder.pull()? {
        Header::Positive(n) => i64::try_from(n).map_err(|_| CodecError::OutOfRange),
        Header::Negative(n) => {
            let n = i64::try_from(n).map_err(|_| CodecError::OutOfRange)?;
            Ok(!n)
        }
        _ => Err(CodecError::UnexpectedType),
    }
}

/// Read a 16-byte byte string as an IPv6 address
pub(crate) fn read_address(decoder: &mut CborDecoder<'_>) -> Result<Ipv6Addr, CodecError> {
    let len = match decoder.pull()? {
        Header::Bytes(len) => len,
        _ => return Err(CodecError::UnexpectedType),
    };
    if matches!(len, Some(n) if n != 16) {
        return Err(CodecError::InvalidAddress);
    }

    let mut octets = [0u8; 16];
    let mut filled = 0;
    let mut buf = [0u8; 16];
    let mut segments = decoder.bytes(len);
    while let Some(mut segment) = segments.pull()? {
        while let Some(chunk) = segment.pull(&mut buf)? {
            let end = filled + chunk.len();
            if end > octets.len() {
                return Err(CodecError::InvalidAddress);
            }
            octets[filled..end].copy_from_slice(chunk);
            filled = end;
        }
    }
    if filled != octets.len() {
        return Err(CodecError::InvalidAddress);
    }
    Ok(Ipv6Addr::from(octets))
}
