//! Node identity map
//!
//! ```text
//! { "t": "dimmer", "v": "1.0.0", "m": h'<eui64>', "e": h'<ext addr>',
//!   "a": h'<mesh-local eid>', "s": ["r", "g", ...] }
//! ```
//!
//! Sent as the `info` response and as the body of discovery broadcasts.

use core::net::Ipv6Addr;

use ciborium_ll::Header;
use meshnode_hal::NetworkInfo;

use super::{encoder, write_key, Payload};
use crate::config::NodeConfig;
use crate::error::CodecError;

/// Identity fields of the info map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInfo<'c> {
    pub firmware_type: &'c str,
    pub firmware_version: &'c str,
    pub eui64: [u8; 8],
    pub extended_address: [u8; 8],
    pub mesh_local_eid: Ipv6Addr,
}

impl<'c> NodeInfo<'c> {
    /// Gather identity from the configuration and the network stack
    pub fn collect(config: &'c NodeConfig, network: &dyn NetworkInfo) -> Self {
        Self {
            firmware_type: config.firmware_type,
            firmware_version: config.firmware_version,
            eui64: network.eui64(),
            extended_address: network.extended_address(),
            mesh_local_eid: network.mesh_local_eid(),
        }
    }
}

/// Append the info map to `payload`, listing `names` under `s`
pub fn encode_info(
    payload: &mut Payload,
    info: &NodeInfo<'_>,
    names: impl Iterator<Item = char>,
) -> Result<(), CodecError> {
    let mut enc = encoder(payload);
    enc.push(Header::Map(None))?;

    write_key(&mut enc, 't')?;
    enc.text(info.firmware_type, None)?;
    write_key(&mut enc, 'v')?;
    enc.text(info.firmware_version, None)?;
    write_key(&mut enc, 'm')?;
    enc.bytes(&info.eui64, None)?;
    write_key(&mut enc, 'e')?;
    enc.bytes(&info.extended_address, None)?;
    write_key(&mut enc, 'a')?;
    enc.bytes(&info.mesh_local_eid.octets(), None)?;

    write_key(&mut enc, 's')?;
    enc.push(Header::Array(None))?;
    for name in names {
        write_key(&mut enc, name)?;
    }
    enc.push(Header::Break)?;

    enc.push(Header::Break)
}
