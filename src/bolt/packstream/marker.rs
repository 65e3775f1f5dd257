//! PackStream marker bytes.
//!
//! Every encoded value starts with a marker byte. Small strings, lists,
//! maps and structures carry their size in the low nibble of the marker;
//! larger ones use a sized marker followed by a big-endian length.

/// Null.
pub const NULL: u8 = 0xC0;
/// 64-bit float.
pub const FLOAT_64: u8 = 0xC1;
/// Boolean false.
pub const FALSE: u8 = 0xC2;
/// Boolean true.
pub const TRUE: u8 = 0xC3;

/// 8-bit integer follows.
pub const INT_8: u8 = 0xC8;
/// 16-bit integer follows.
pub const INT_16: u8 = 0xC9;
/// 32-bit integer follows.
pub const INT_32: u8 = 0xCA;
/// 64-bit integer follows.
pub const INT_64: u8 = 0xCB;

/// String with size in the low nibble.
pub const TINY_STRING: u8 = 0x80;
/// String with 8-bit size.
pub const STRING_8: u8 = 0xD0;
/// String with 16-bit size.
pub const STRING_16: u8 = 0xD1;
/// String with 32-bit size.
pub const STRING_32: u8 = 0xD2;

/// List with size in the low nibble.
pub const TINY_LIST: u8 = 0x90;
/// List with 8-bit size.
pub const LIST_8: u8 = 0xD4;
/// List with 16-bit size.
pub const LIST_16: u8 = 0xD5;
/// List with 32-bit size.
pub const LIST_32: u8 = 0xD6;

/// Map with size in the low nibble.
pub const TINY_MAP: u8 = 0xA0;
/// Map with 8-bit size.
pub const MAP_8: u8 = 0xD8;
/// Map with 16-bit size.
pub const MAP_16: u8 = 0xD9;
/// Map with 32-bit size.
pub const MAP_32: u8 = 0xDA;

/// Structure with field count in the low nibble.
pub const TINY_STRUCT: u8 = 0xB0;
/// Structure with 8-bit field count.
pub const STRUCT_8: u8 = 0xDC;
/// Structure with 16-bit field count.
pub const STRUCT_16: u8 = 0xDD;

/// Largest size that fits in the low nibble of a tiny marker.
pub const TINY_SIZE_MAX: usize = 0x0F;

/// Inclusive range of integers encoded directly in the marker byte.
pub const TINY_INT_RANGE: std::ops::RangeInclusive<i64> = -16..=127;

/// Graph structure signatures.
pub const NODE_TAG: u8 = 0x4E;
/// Relationship signature.
pub const RELATIONSHIP_TAG: u8 = 0x52;
/// Unbound relationship signature.
pub const UNBOUND_RELATIONSHIP_TAG: u8 = 0x72;
/// Path signature.
pub const PATH_TAG: u8 = 0x50;

/// Field counts of the graph structures.
pub const NODE_FIELDS: usize = 3;
/// Relationship field count.
pub const RELATIONSHIP_FIELDS: usize = 5;
/// Unbound relationship field count.
pub const UNBOUND_RELATIONSHIP_FIELDS: usize = 3;
/// Path field count.
pub const PATH_FIELDS: usize = 3;

/// Which kind of container a sized marker opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// UTF-8 string.
    String,
    /// List of values.
    List,
    /// Map with string keys.
    Map,
    /// Tagged structure.
    Struct,
}

impl Container {
    /// Marker for sizes up to [`TINY_SIZE_MAX`].
    pub const fn tiny_base(self) -> u8 {
        match self {
            Container::String => TINY_STRING,
            Container::List => TINY_LIST,
            Container::Map => TINY_MAP,
            Container::Struct => TINY_STRUCT,
        }
    }

    /// Sized markers in 8, 16 and 32 bit order. Structures have no 32-bit form.
    pub const fn sized(self) -> [Option<u8>; 3] {
        match self {
            Container::String => [Some(STRING_8), Some(STRING_16), Some(STRING_32)],
            Container::List => [Some(LIST_8), Some(LIST_16), Some(LIST_32)],
            Container::Map => [Some(MAP_8), Some(MAP_16), Some(MAP_32)],
            Container::Struct => [Some(STRUCT_8), Some(STRUCT_16), None],
        }
    }

    /// Name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Container::String => "string",
            Container::List => "list",
            Container::Map => "map",
            Container::Struct => "structure",
        }
    }
}

/// How the bytes following a marker must be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Null value.
    Null,
    /// Boolean stored in the marker.
    Bool(bool),
    /// 64-bit float follows.
    Float,
    /// Integer stored in the marker itself.
    TinyInt(i8),
    /// Integer of the given byte width follows.
    Int(usize),
    /// Container whose size is stored in the marker.
    Tiny(Container, usize),
    /// Container whose size follows in the given number of bytes.
    Sized(Container, usize),
    /// Reserved or unassigned marker byte.
    Unknown(u8),
}

/// Classify a marker byte.
pub fn classify(marker: u8) -> Marker {
    let size = (marker & 0x0F) as usize;
    match marker {
        0x00..=0x7F | 0xF0..=0xFF => Marker::TinyInt(marker as i8),
        0x80..=0x8F => Marker::Tiny(Container::String, size),
        0x90..=0x9F => Marker::Tiny(Container::List, size),
        0xA0..=0xAF => Marker::Tiny(Container::Map, size),
        0xB0..=0xBF => Marker::Tiny(Container::Struct, size),
        NULL => Marker::Null,
        FLOAT_64 => Marker::Float,
        FALSE => Marker::Bool(false),
        TRUE => Marker::Bool(true),
        INT_8 => Marker::Int(1),
        INT_16 => Marker::Int(2),
        INT_32 => Marker::Int(4),
        INT_64 => Marker::Int(8),
        STRING_8 => Marker::Sized(Container::String, 1),
        STRING_16 => Marker::Sized(Container::String, 2),
        STRING_32 => Marker::Sized(Container::String, 4),
        LIST_8 => Marker::Sized(Container::List, 1),
        LIST_16 => Marker::Sized(Container::List, 2),
        LIST_32 => Marker::Sized(Container::List, 4),
        MAP_8 => Marker::Sized(Container::Map, 1),
        MAP_16 => Marker::Sized(Container::Map, 2),
        MAP_32 => Marker::Sized(Container::Map, 4),
        STRUCT_8 => Marker::Sized(Container::Struct, 1),
        STRUCT_16 => Marker::Sized(Container::Struct, 2),
        other => Marker::Unknown(other),
    }
}
