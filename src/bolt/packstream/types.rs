//! PackStream value types.

use std::collections::HashMap;
use std::fmt;

use super::marker::{NODE_TAG, PATH_TAG, RELATIONSHIP_TAG, UNBOUND_RELATIONSHIP_TAG};

/// A value as it travels on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum PackStreamValue {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    String(String),
    /// List of values
    List(Vec<PackStreamValue>),
    /// Map of string keys to values
    Map(HashMap<String, PackStreamValue>),
    /// Tagged structure (messages and graph entities)
    Structure(PackStreamStructure),
}

/// A PackStream structure with a signature tag and positional fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PackStreamStructure {
    /// Structure tag
    pub tag: u8,
    /// Positional fields
    pub fields: Vec<PackStreamValue>,
}

impl PackStreamStructure {
    /// Create a structure from its tag and fields.
    pub fn new(tag: u8, fields: Vec<PackStreamValue>) -> Self {
        Self { tag, fields }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True for a field-less structure.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl PackStreamValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, PackStreamValue::Null)
    }

    /// Boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PackStreamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if any.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PackStreamValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Float payload. Integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PackStreamValue::Float(f) => Some(*f),
            PackStreamValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// String contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PackStreamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Items, if this is a list.
    pub fn as_list(&self) -> Option<&[PackStreamValue]> {
        match self {
            PackStreamValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// Entries, if this is a map.
    pub fn as_map(&self) -> Option<&HashMap<String, PackStreamValue>> {
        match self {
            PackStreamValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// String contents, if this is a string.
    /// The structure, if this is one.
    pub fn as_structure(&self) -> Option<&PackStreamStructure> {
        match self {
            PackStreamValue::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PackStreamValue::Null => "Null",
            PackStreamValue::Boolean(_) => "Boolean",
            PackStreamValue::Integer(_) => "Integer",
            PackStreamValue::Float(_) => "Float",
            PackStreamValue::String(_) => "String",
            PackStreamValue::List(_) => "List",
            PackStreamValue::Map(_) => "Map",
            PackStreamValue::Structure(_) => "Structure",
        }
    }
}

/// Write a map as `{k1=v1, k2=v2}` with keys in sorted order.
pub(crate) fn write_map(
    f: &mut fmt::Formatter<'_>,
    map: &HashMap<String, PackStreamValue>,
) -> fmt::Result {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    f.write_str("{")?;
    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}={}", key, map[key])?;
    }
    f.write_str("}")
}

/// Write a list as `[a, b]`.
pub(crate) fn write_list(f: &mut fmt::Formatter<'_>, items: &[PackStreamValue]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

impl fmt::Display for PackStreamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackStreamValue::Null => f.write_str("null"),
            PackStreamValue::Boolean(b) => write!(f, "{}", b),
            PackStreamValue::Integer(i) => write!(f, "{}", i),
            PackStreamValue::Float(v) => write!(f, "{:?}", v),
            PackStreamValue::String(s) => write!(f, "{:?}", s),
            PackStreamValue::List(items) => write_list(f, items),
            PackStreamValue::Map(map) => write_map(f, map),
            PackStreamValue::Structure(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for PackStreamStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.fields.first().and_then(PackStreamValue::as_int);
        match (self.tag, id) {
            (NODE_TAG, Some(id)) => write!(f, "node<{}>", id),
            (RELATIONSHIP_TAG, Some(id)) | (UNBOUND_RELATIONSHIP_TAG, Some(id)) => {
                write!(f, "relationship<{}>", id)
            }
            (PATH_TAG, _) => {
                let hops = self
                    .fields
                    .get(2)
                    .and_then(PackStreamValue::as_list)
                    .map_or(0, |indices| indices.len() / 2);
                write!(f, "path[{}]", hops)
            }
            _ => {
                write!(f, "Structure<0x{:02X}>", self.tag)?;
                write_list(f, &self.fields)
            }
        }
    }
}

impl From<bool> for PackStreamValue {
    fn from(v: bool) -> Self {
        PackStreamValue::Boolean(v)
    }
}

impl From<i64> for PackStreamValue {
    fn from(v: i64) -> Self {
        PackStreamValue::Integer(v)
    }
}

impl From<i32> for PackStreamValue {
    fn from(v: i32) -> Self {
        PackStreamValue::Integer(v as i64)
    }
}

impl From<f64> for PackStreamValue {
    fn from(v: f64) -> Self {
        PackStreamValue::Float(v)
    }
}

impl From<String> for PackStreamValue {
    fn from(v: String) -> Self {
        PackStreamValue::String(v)
    }
}

impl From<&str> for PackStreamValue {
    fn from(v: &str) -> Self {
        PackStreamValue::String(v.to_string())
    }
}

impl From<Vec<PackStreamValue>> for PackStreamValue {
    fn from(v: Vec<PackStreamValue>) -> Self {
        PackStreamValue::List(v)
    }
}

impl From<HashMap<String, PackStreamValue>> for PackStreamValue {
    fn from(v: HashMap<String, PackStreamValue>) -> Self {
        PackStreamValue::Map(v)
    }
}

impl From<PackStreamStructure> for PackStreamValue {
    fn from(v: PackStreamStructure) -> Self {
        PackStreamValue::Structure(v)
    }
}
