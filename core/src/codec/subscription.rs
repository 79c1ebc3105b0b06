//! Subscription configuration map
//!
//! ```text
//! { "a": h'<16-byte subscriber address>',
//!   "s": { "r": { "i": 5000, "r": 2 }, ... } }
//! ```
//!
//! Both top-level keys are optional. `i` is the report interval in
//! milliseconds and `r` the reportable change; either may be omitted for a
//! sensor, which leaves that field untouched.
//!
//! Decoding streams each field into a [`SubscriptionSink`] as soon as it is
//! parsed. A parse error stops the walk; fields applied before it stand.

use core::net::Ipv6Addr;

use ciborium_ll::Header;

use super::{
    decoder, encoder, enter_map, read_address, read_key, write_key, write_uint, CborDecoder,
    Entries, Payload,
};
use crate::error::CodecError;

/// Receiver of decoded subscription fields
pub trait SubscriptionSink {
    /// `a` was present
    fn address(&mut self, address: Ipv6Addr);

    /// An entry for `name` starts; refusing it aborts the parse
    fn begin_sensor(&mut self, name: char) -> Result<(), CodecError>;

    fn report_interval(&mut self, name: char, interval_ms: u32);

    fn reportable_change(&mut self, name: char, change: u64);

    /// The entry for `name` was parsed completely
    fn end_sensor(&mut self, name: char);
}

/// Decoder positioned inside the top-level map
pub struct SubscriptionDecoder<'a> {
    decoder: CborDecoder<'a>,
    entries: Entries,
}

impl<'a> SubscriptionDecoder<'a> {
    /// Check that `body` starts with a map
    ///
    /// Nothing is handed to a sink until [`apply`](Self::apply), so callers
    /// can reset state between the two steps.
    pub fn new(body: &'a [u8]) -> Result<Self, CodecError> {
        let mut decoder = decoder(body)?;
        let entries = enter_map(&mut decoder)?;
        Ok(Self { decoder, entries })
    }

    /// Walk the map, feeding `sink`
    pub fn apply<S>(mut self, sink: &mut S) -> Result<(), CodecError>
    where
        S: SubscriptionSink + ?Sized,
    {
        while let Some(header) = self.entries.next(&mut self.decoder)? {
            match read_key(&mut self.decoder, header)? {
                'a' => {
                    let address = read_address(&mut self.decoder)?;
                    sink.address(address);
                }
                's' => self.apply_sensors(sink)?,
                _ => return Err(CodecError::UnknownField),
            }
        }
        Ok(())
    }

    fn apply_sensors<S>(&mut self, sink: &mut S) -> Result<(), CodecError>
    where
        S: SubscriptionSink + ?Sized,
    {
        let mut sensors = enter_map(&mut self.decoder)?;
        while let Some(header) = sensors.next(&mut self.decoder)? {
            let name = read_key(&mut self.decoder, header)?;
            sink.begin_sensor(name)?;

            let mut fields = enter_map(&mut self.decoder)?;
            while let Some(header) = fields.next(&mut self.decoder)? {
                match read_key(&mut self.decoder, header)? {
                    'i' => {
                        let interval = read_uint(&mut self.decoder)?;
                        let interval =
                            u32::try_from(interval).map_err(|_| CodecError::OutOfRange)?;
                        sink.report_interval(name, interval);
                    }
                    'r' => {
                        let change = read_uint(&mut self.decoder)?;
                        sink.reportable_change(name, change);
                    }
                    _ => return Err(CodecError::UnknownField),
                }
            }

            sink.end_sensor(name);
        }
        Ok(())
    }
}

fn read_uint(decoder: &mut CborDecoder<'_>) -> Result<u64, CodecError> {
    match decoder.pull()? {
        Header::Positive(n) => Ok(n),
        Header::Negative(_) => Err(CodecError::OutOfRange),
        _ => Err(CodecError::UnexpectedType),
    }
}

/// Append the applied configuration to `payload`
///
/// `sensors` yields `(name, interval_ms, reportable_change)` for every slot
/// named in the request.
pub fn encode_subscription_echo(
    payload: &mut Payload,
    address: Option<Ipv6Addr>,
    sensors: impl Iterator<Item = (char, u32, u64)>,
) -> Result<(), CodecError> {
    let mut enc = encoder(payload);
    enc.push(Header::Map(None))?;

    if let Some(address) = address {
        write_key(&mut enc, 'a')?;
        enc.bytes(&address.octets(), None)?;
    }

    write_key(&mut enc, 's')?;
    enc.push(Header::Map(None))?;
    for (name, interval_ms, change) in sensors {
        write_key(&mut enc, name)?;
        enc.push(Header::Map(None))?;
        write_key(&mut enc, 'i')?;
        write_uint(&mut enc, u64::from(interval_ms))?;
        write_key(&mut enc, 'r')?;
        write_uint(&mut enc, change)?;
        enc.push(Header::Break)?;
    }
    enc.push(Header::Break)?;

    enc.push(Header::Break)
}
