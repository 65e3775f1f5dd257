//! PackStream encoder.

use bytes::{BufMut, BytesMut};
use std::collections::HashMap;

use super::marker::*;
use super::types::{PackStreamStructure, PackStreamValue};
use super::PackStreamError;

/// Writes PackStream values into any [`BufMut`].
pub struct PackStreamEncoder<'a, B: BufMut> {
    out: &'a mut B,
}

impl<'a, B: BufMut> PackStreamEncoder<'a, B> {
    /// Create an encoder appending to `out`.
    pub fn new(out: &'a mut B) -> Self {
        Self { out }
    }

    /// Encode one value.
    pub fn encode(&mut self, value: &PackStreamValue) -> Result<(), PackStreamError> {
        match value {
            PackStreamValue::Null => self.out.put_u8(NULL),
            PackStreamValue::Boolean(b) => self.out.put_u8(if *b { TRUE } else { FALSE }),
            PackStreamValue::Integer(i) => self.encode_int(*i),
            PackStreamValue::Float(v) => {
                self.out.put_u8(FLOAT_64);
                self.out.put_f64(*v);
            }
            PackStreamValue::String(s) => self.encode_string(s)?,
            PackStreamValue::List(items) => self.encode_list(items)?,
            PackStreamValue::Map(map) => self.encode_map(map)?,
            PackStreamValue::Structure(s) => self.encode_structure(s)?,
        }
        Ok(())
    }

    /// Integers use the narrowest representation that holds them.
    pub fn encode_int(&mut self, value: i64) {
        if TINY_INT_RANGE.contains(&value) {
            self.out.put_i8(value as i8);
        } else if let Ok(v) = i8::try_from(value) {
            self.out.put_u8(INT_8);
            self.out.put_i8(v);
        } else if let Ok(v) = i16::try_from(value) {
            self.out.put_u8(INT_16);
            self.out.put_i16(v);
        } else if let Ok(v) = i32::try_from(value) {
            self.out.put_u8(INT_32);
            self.out.put_i32(v);
        } else {
            self.out.put_u8(INT_64);
            self.out.put_i64(value);
        }
    }

    /// Encode a string.
    pub fn encode_string(&mut self, value: &str) -> Result<(), PackStreamError> {
        self.write_header(Container::String, value.len())?;
        self.out.put_slice(value.as_bytes());
        Ok(())
    }

    /// Encode a list.
    pub fn encode_list(&mut self, items: &[PackStreamValue]) -> Result<(), PackStreamError> {
        self.write_header(Container::List, items.len())?;
        items.iter().try_for_each(|item| self.encode(item))
    }

    /// Encode a map.
    pub fn encode_map(
        &mut self,
        map: &HashMap<String, PackStreamValue>,
    ) -> Result<(), PackStreamError> {
        self.write_header(Container::Map, map.len())?;
        for (key, value) in map {
            self.encode_string(key)?;
            self.encode(value)?;
        }
        Ok(())
    }

    /// Encode a structure.
    pub fn encode_structure(&mut self, s: &PackStreamStructure) -> Result<(), PackStreamError> {
        self.write_header(Container::Struct, s.fields.len())?;
        self.out.put_u8(s.tag);
        s.fields.iter().try_for_each(|field| self.encode(field))
    }

    /// Emit the marker (and size bytes) announcing a container of `len` entries.
    fn write_header(&mut self, container: Container, len: usize) -> Result<(), PackStreamError> {
        if len <= TINY_SIZE_MAX {
            self.out.put_u8(container.tiny_base() | len as u8);
            return Ok(());
        }

        let [m8, m16, m32] = container.sized();
        match (m8, m16, m32) {
            (Some(marker), _, _) if len <= u8::MAX as usize => {
                self.out.put_u8(marker);
                self.out.put_u8(len as u8);
            }
            (_, Some(marker), _) if len <= u16::MAX as usize => {
                self.out.put_u8(marker);
                self.out.put_u16(len as u16);
            }
            (_, _, Some(marker)) if len <= u32::MAX as usize => {
                self.out.put_u8(marker);
                self.out.put_u32(len as u32);
            }
            _ => return Err(PackStreamError::ValueTooLarge(container.name(), len)),
        }
        Ok(())
    }
}

/// Encode a single value into a fresh buffer.
pub fn encode(value: &PackStreamValue) -> Result<BytesMut, PackStreamError> {
    let mut buf = BytesMut::with_capacity(128);
    PackStreamEncoder::new(&mut buf).encode(value)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of(value: PackStreamValue) -> Vec<u8> {
        encode(&value).unwrap().to_vec()
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(bytes_of(PackStreamValue::Null), [0xC0]);
        assert_eq!(bytes_of(PackStreamValue::Boolean(true)), [0xC3]);
        assert_eq!(bytes_of(PackStreamValue::Boolean(false)), [0xC2]);

        let float = bytes_of(PackStreamValue::Float(1.1));
        assert_eq!(float[0], 0xC1);
        assert_eq!(&float[1..], &1.1f64.to_be_bytes());
    }

    #[test]
    fn test_encode_integer_widths() {
        assert_eq!(bytes_of(PackStreamValue::Integer(-16)), [0xF0]);
        assert_eq!(bytes_of(PackStreamValue::Integer(127)), [0x7F]);
        assert_eq!(bytes_of(PackStreamValue::Integer(-17)), [0xC8, 0xEF]);
        assert_eq!(bytes_of(PackStreamValue::Integer(128)), [0xC9, 0x00, 0x80]);
        assert_eq!(
            bytes_of(PackStreamValue::Integer(100_000)),
            [0xCA, 0x00, 0x01, 0x86, 0xA0]
        );
        let wide = bytes_of(PackStreamValue::Integer(i64::MIN));
        assert_eq!(wide[0], 0xCB);
        assert_eq!(wide.len(), 9);
    }

    #[test]
    fn test_encode_strings() {
        assert_eq!(bytes_of("".into()), [0x80]);
        assert_eq!(bytes_of("hello".into()), b"\x85hello");

        let medium = bytes_of("a".repeat(16).into());
        assert_eq!(&medium[..2], &[0xD0, 16]);

        let long = bytes_of("b".repeat(300).into());
        assert_eq!(&long[..3], &[0xD1, 0x01, 0x2C]);
    }

    #[test]
    fn test_encode_list_of_tiny_ints() {
        let list = PackStreamValue::List(vec![1.into(), 2.into(), 3.into()]);
        assert_eq!(bytes_of(list), [0x93, 1, 2, 3]);
    }

    #[test]
    fn test_encode_map_header() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), PackStreamValue::Integer(1));
        assert_eq!(bytes_of(PackStreamValue::Map(map)), [0xA1, 0x81, b'a', 0x01]);
        assert_eq!(bytes_of(PackStreamValue::Map(HashMap::new())), [0xA0]);
    }

    #[test]
    fn test_encode_structure() {
        let s = PackStreamStructure::new(NODE_TAG, vec![PackStreamValue::Integer(1)]);
        assert_eq!(bytes_of(PackStreamValue::Structure(s)), [0xB1, 0x4E, 0x01]);
    }

    #[test]
    fn test_encode_structure_sized_header() {
        let fields = vec![PackStreamValue::Null; 16];
        let bytes = bytes_of(PackStreamValue::Structure(PackStreamStructure::new(0x01, fields)));
        assert_eq!(&bytes[..3], &[0xDC, 16, 0x01]);
    }

    #[test]
    fn test_encode_into_existing_buffer() {
        let mut buf = BytesMut::from(&b"xy"[..]);
        PackStreamEncoder::new(&mut buf)
            .encode(&PackStreamValue::Integer(5))
            .unwrap();
        assert_eq!(&buf[..], b"xy\x05");
    }
}
