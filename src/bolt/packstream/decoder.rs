//! PackStream decoder.

use bytes::Buf;
use std::collections::HashMap;

use super::marker::{classify, Container, Marker};
use super::types::{PackStreamStructure, PackStreamValue};
use super::PackStreamError;

/// Nesting limit for lists, maps and structures.
pub const MAX_DEPTH: usize = 64;

/// Reads PackStream values from a byte slice.
pub struct PackStreamDecoder<'a> {
    input: &'a [u8],
    consumed: usize,
}

impl<'a> PackStreamDecoder<'a> {
    /// Create a decoder over `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, consumed: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.consumed
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// Whether all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Decode the next value.
    pub fn decode(&mut self) -> Result<PackStreamValue, PackStreamError> {
        self.decode_nested(0)
    }

    fn decode_nested(&mut self, depth: usize) -> Result<PackStreamValue, PackStreamError> {
        if depth > MAX_DEPTH {
            return Err(PackStreamError::TooDeep(MAX_DEPTH));
        }

        let marker = self.take(1)?[0];
        match classify(marker) {
            Marker::Null => Ok(PackStreamValue::Null),
            Marker::Bool(b) => Ok(PackStreamValue::Boolean(b)),
            Marker::TinyInt(i) => Ok(PackStreamValue::Integer(i as i64)),
            Marker::Int(width) => {
                let mut raw = self.take(width)?;
                Ok(PackStreamValue::Integer(raw.get_int(width)))
            }
            Marker::Float => {
                let mut raw = self.take(8)?;
                Ok(PackStreamValue::Float(raw.get_f64()))
            }
            Marker::Tiny(container, size) => self.read_container(container, size, depth),
            Marker::Sized(container, width) => {
                let mut raw = self.take(width)?;
                let size = raw.get_uint(width) as usize;
                self.read_container(container, size, depth)
            }
            Marker::Unknown(byte) => Err(PackStreamError::UnknownMarker(byte)),
        }
    }

    fn read_container(
        &mut self,
        container: Container,
        size: usize,
        depth: usize,
    ) -> Result<PackStreamValue, PackStreamError> {
        match container {
            Container::String => {
                let raw = self.take(size)?;
                let s = std::str::from_utf8(raw)
                    .map_err(|e| PackStreamError::InvalidUtf8(e.to_string()))?;
                Ok(PackStreamValue::String(s.to_owned()))
            }
            Container::List => {
                // the declared size is untrusted until the items are actually read
                let mut items = Vec::with_capacity(size.min(self.remaining()));
                for _ in 0..size {
                    items.push(self.decode_nested(depth + 1)?);
                }
                Ok(PackStreamValue::List(items))
            }
            Container::Map => {
                let mut map = HashMap::with_capacity(size.min(self.remaining()));
                for _ in 0..size {
                    let key = match self.decode_nested(depth + 1)? {
                        PackStreamValue::String(s) => s,
                        _ => return Err(PackStreamError::InvalidMapKey),
                    };
                    let value = self.decode_nested(depth + 1)?;
                    map.insert(key, value);
                }
                Ok(PackStreamValue::Map(map))
            }
            Container::Struct => {
                let tag = self.take(1)?[0];
                let mut fields = Vec::with_capacity(size.min(self.remaining()));
                for _ in 0..size {
                    fields.push(self.decode_nested(depth + 1)?);
                }
                Ok(PackStreamValue::Structure(PackStreamStructure::new(tag, fields)))
            }
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], PackStreamError> {
        if self.input.len() < len {
            return Err(PackStreamError::UnexpectedEof);
        }
        let (head, tail) = self.input.split_at(len);
        self.input = tail;
        self.consumed += len;
        Ok(head)
    }
}

/// Decode exactly one value; trailing bytes are an error.
pub fn decode(data: &[u8]) -> Result<PackStreamValue, PackStreamError> {
    let mut decoder = PackStreamDecoder::new(data);
    let value = decoder.decode()?;
    if !decoder.is_empty() {
        return Err(PackStreamError::TrailingBytes(decoder.remaining()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_scalars() {
        assert!(decode(&[0xC0]).unwrap().is_null());
        assert_eq!(decode(&[0xC3]).unwrap(), PackStreamValue::Boolean(true));
        assert_eq!(decode(&[0xC2]).unwrap(), PackStreamValue::Boolean(false));
        assert_eq!(decode(&[0xF0]).unwrap(), PackStreamValue::Integer(-16));
        assert_eq!(decode(&[0x7F]).unwrap(), PackStreamValue::Integer(127));
    }

    #[test]
    fn test_decode_sized_integers() {
        assert_eq!(decode(&[0xC8, 0x80]).unwrap(), PackStreamValue::Integer(-128));
        assert_eq!(decode(&[0xC9, 0xFC, 0x18]).unwrap(), PackStreamValue::Integer(-1000));
        assert_eq!(
            decode(&[0xCA, 0x00, 0x01, 0x86, 0xA0]).unwrap(),
            PackStreamValue::Integer(100_000)
        );
        let max = [0xCB, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(decode(&max).unwrap(), PackStreamValue::Integer(i64::MAX));
    }

    #[test]
    fn test_decode_float() {
        let mut data = vec![0xC1];
        data.extend_from_slice(&(-2.5f64).to_be_bytes());
        assert_eq!(decode(&data).unwrap(), PackStreamValue::Float(-2.5));
    }

    #[test]
    fn test_decode_strings() {
        assert_eq!(decode(b"\x85hello").unwrap(), PackStreamValue::from("hello"));
        assert_eq!(decode(&[0x80]).unwrap(), PackStreamValue::from(""));

        let mut data = vec![0xD0, 20];
        data.extend_from_slice(&[b'a'; 20]);
        assert_eq!(decode(&data).unwrap(), PackStreamValue::String("a".repeat(20)));
    }

    #[test]
    fn test_decode_containers() {
        let list = decode(&[0x93, 1, 2, 3]).unwrap();
        assert_eq!(list, PackStreamValue::List(vec![1.into(), 2.into(), 3.into()]));

        let map = decode(&[0xA1, 0x81, b'x', 0x05]).unwrap();
        assert_eq!(map.as_map().unwrap()["x"], PackStreamValue::Integer(5));

        let s = decode(&[0xB1, 0x4E, 0x01]).unwrap();
        let s = s.as_structure().unwrap();
        assert_eq!(s.tag, 0x4E);
        assert_eq!(s.fields, vec![PackStreamValue::Integer(1)]);
    }

    #[test]
    fn test_decode_truncated() {
        assert!(matches!(decode(&[0xC9]), Err(PackStreamError::UnexpectedEof)));
        assert!(matches!(decode(&[0x93, 1, 2]), Err(PackStreamError::UnexpectedEof)));
        assert!(matches!(decode(&[0xB1]), Err(PackStreamError::UnexpectedEof)));
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(matches!(decode(&[0x82, 0xFF, 0xFE]), Err(PackStreamError::InvalidUtf8(_))));
        assert!(matches!(decode(&[0xA1, 0x01, 0x01]), Err(PackStreamError::InvalidMapKey)));
        assert!(matches!(decode(&[0xCC, 0x00]), Err(PackStreamError::UnknownMarker(0xCC))));
        assert!(matches!(decode(&[0x01, 0x02]), Err(PackStreamError::TrailingBytes(1))));
    }

    #[test]
    fn test_decode_depth_limit() {
        let data = vec![0x91; MAX_DEPTH + 2];
        assert!(matches!(decode(&data), Err(PackStreamError::TooDeep(_))));
    }

    #[test]
    fn test_decoder_tracks_position() {
        let data = [0x01, 0xC9, 0x03, 0xE8];
        let mut decoder = PackStreamDecoder::new(&data);
        decoder.decode().unwrap();
        assert_eq!(decoder.position(), 1);
        assert_eq!(decoder.decode().unwrap(), PackStreamValue::Integer(1000));
        assert_eq!(decoder.position(), 4);
        assert!(decoder.is_empty());
    }
}
