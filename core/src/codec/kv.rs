//! Key/value maps and key arrays
//!
//! `{ "r": 10, "g": 20 }` is the body of `set` requests and responses, `get`
//! responses and reports. `[ "r", "g" ]` is the body of `get` requests.
//!
//! Both decoders are iterators so handlers can act on each entry as it is
//! parsed. An iterator yields at most one error and then stops.

use ciborium_ll::Header;

use super::{
    decoder, encoder, enter_array, enter_map, read_int, read_key, write_int, write_key,
    CborDecoder, CborEncoder, Entries, Payload,
};
use crate::error::CodecError;

/// Streaming writer for a key/value map
pub struct KvMapEncoder<'p> {
    encoder: CborEncoder<'p>,
    entries: usize,
}

impl<'p> KvMapEncoder<'p> {
    /// Open a map at the end of `payload`
    pub fn new(payload: &'p mut Payload) -> Result<Self, CodecError> {
        let mut encoder = encoder(payload);
        encoder.push(Header::Map(None))?;
        Ok(Self {
            encoder,
            entries: 0,
        })
    }

    pub fn entry(&mut self, key: char, value: i64) -> Result<(), CodecError> {
        write_key(&mut self.encoder, key)?;
        write_int(&mut self.encoder, value)?;
        self.entries += 1;
        Ok(())
    }

    /// Close the map, returning the number of entries written
    pub fn finish(mut self) -> Result<usize, CodecError> {
        self.encoder.push(Header::Break)?;
        Ok(self.entries)
    }
}

/// Pairs of a key/value map body
pub struct KvPairs<'a> {
    decoder: CborDecoder<'a>,
    entries: Entries,
    done: bool,
}

/// Parse the opening of a key/value map body
pub fn decode_kv_map(body: &[u8]) -> Result<KvPairs<'_>, CodecError> {
    let mut decoder = decoder(body)?;
    let entries = enter_map(&mut decoder)?;
    Ok(KvPairs {
        decoder,
        entries,
        done: false,
    })
}

impl KvPairs<'_> {
    fn read_pair(&mut self) -> Result<Option<(char, i64)>, CodecError> {
        let Some(header) = self.entries.next(&mut self.decoder)? else {
            return Ok(None);
        };
        let key = read_key(&mut self.decoder, header)?;
        let value = read_int(&mut self.decoder)?;
        Ok(Some((key, value)))
    }
}

impl Iterator for KvPairs<'_> {
    type Item = Result<(char, i64), CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.read_pair().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

/// Keys of a key array body
pub struct KeyList<'a> {
    decoder: CborDecoder<'a>,
    entries: Entries,
    done: bool,
}

/// Parse the opening of a key array body
pub fn decode_key_list(body: &[u8]) -> Result<KeyList<'_>, CodecError> {
    let mut decoder = decoder(body)?;
    let entries = enter_array(&mut decoder)?;
    Ok(KeyList {
        decoder,
        entries,
        done: false,
    })
}

impl KeyList<'_> {
    fn read_key(&mut self) -> Result<Option<char>, CodecError> {
        match self.entries.next(&mut self.decoder)? {
            Some(header) => read_key(&mut self.decoder, header).map(Some),
            None => Ok(None),
        }
    }
}

impl Iterator for KeyList<'_> {
    type Item = Result<char, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.read_key().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}
