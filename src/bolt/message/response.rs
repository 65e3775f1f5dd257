//! Bolt protocol response messages.
//!
//! Response messages are sent from the server to the client.

use std::collections::HashMap;
use std::fmt;

use super::{expect_arity, tag};
use crate::bolt::packstream::types::{write_list, write_map};
use crate::bolt::packstream::{PackStreamError, PackStreamStructure, PackStreamValue};

/// All Bolt v1 response messages.
#[derive(Debug, Clone, PartialEq)]
pub enum BoltResponse {
    /// SUCCESS - Request completed, with metadata
    Success(SuccessMessage),
    /// RECORD - One row of a streamed result
    Record(RecordMessage),
    /// FAILURE - Request failed
    Failure(FailureMessage),
    /// IGNORED - Request skipped because the session is in the failed state
    Ignored,
}

impl BoltResponse {
    /// Get the message tag.
    pub fn tag(&self) -> u8 {
        match self {
            BoltResponse::Success(_) => tag::SUCCESS,
            BoltResponse::Record(_) => tag::RECORD,
            BoltResponse::Failure(_) => tag::FAILURE,
            BoltResponse::Ignored => tag::IGNORED,
        }
    }

    /// Get message name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            BoltResponse::Success(_) => "SUCCESS",
            BoltResponse::Record(_) => "RECORD",
            BoltResponse::Failure(_) => "FAILURE",
            BoltResponse::Ignored => "IGNORED",
        }
    }

    /// True for the replies that end a request (everything but RECORD).
    pub fn is_summary(&self) -> bool {
        !matches!(self, BoltResponse::Record(_))
    }

    /// Convert to PackStream structure.
    pub fn to_structure(&self) -> PackStreamStructure {
        match self {
            BoltResponse::Success(msg) => msg.to_structure(),
            BoltResponse::Record(msg) => msg.to_structure(),
            BoltResponse::Failure(msg) => msg.to_structure(),
            BoltResponse::Ignored => PackStreamStructure::new(tag::IGNORED, vec![]),
        }
    }

    /// Parse from PackStream structure.
    pub fn from_structure(s: &PackStreamStructure) -> Result<Self, PackStreamError> {
        match s.tag {
            tag::SUCCESS => Ok(BoltResponse::Success(SuccessMessage::from_structure(s)?)),
            tag::RECORD => Ok(BoltResponse::Record(RecordMessage::from_structure(s)?)),
            tag::FAILURE => Ok(BoltResponse::Failure(FailureMessage::from_structure(s)?)),
            tag::IGNORED => {
                // servers may attach an (empty) metadata map
                expect_arity(s, "IGNORED", &[0, 1])?;
                if let Some(field) = s.fields.first() {
                    if field.as_map().is_none() {
                        return Err(PackStreamError::InvalidStructure(
                            "IGNORED metadata must be map".into(),
                        ));
                    }
                }
                Ok(BoltResponse::Ignored)
            }
            _ => Err(PackStreamError::InvalidStructure(format!(
                "Unknown response message tag: 0x{:02X}",
                s.tag
            ))),
        }
    }
}

impl fmt::Display for BoltResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoltResponse::Success(msg) => write!(f, "{}", msg),
            BoltResponse::Record(msg) => write!(f, "{}", msg),
            BoltResponse::Failure(msg) => write!(f, "{}", msg),
            BoltResponse::Ignored => f.write_str("[IGNORED]"),
        }
    }
}

/// SUCCESS message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuccessMessage {
    /// Response metadata
    pub metadata: HashMap<String, PackStreamValue>,
}

impl SuccessMessage {
    /// Create a SUCCESS message with empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a SUCCESS message with metadata.
    pub fn with_metadata(metadata: HashMap<String, PackStreamValue>) -> Self {
        Self { metadata }
    }

    /// Add metadata entry.
    pub fn add(&mut self, key: &str, value: impl Into<PackStreamValue>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    /// Get metadata entry.
    pub fn get(&self, key: &str) -> Option<&PackStreamValue> {
        self.metadata.get(key)
    }

    /// Server agent reported in reply to INIT.
    pub fn server(&self) -> Option<&str> {
        self.get("server").and_then(PackStreamValue::as_str)
    }

    /// Column names reported in reply to RUN.
    pub fn fields(&self) -> Option<Vec<String>> {
        self.get("fields").and_then(PackStreamValue::as_list).map(|list| {
            list.iter()
                .filter_map(|item| item.as_str().map(str::to_owned))
                .collect()
        })
    }

    /// Convert to PackStream structure.
    pub fn to_structure(&self) -> PackStreamStructure {
        PackStreamStructure::new(tag::SUCCESS, vec![PackStreamValue::Map(self.metadata.clone())])
    }

    /// Parse from PackStream structure.
    pub fn from_structure(s: &PackStreamStructure) -> Result<Self, PackStreamError> {
        expect_arity(s, "SUCCESS", &[1])?;
        let metadata = s.fields[0]
            .as_map()
            .ok_or_else(|| PackStreamError::InvalidStructure("SUCCESS metadata must be map".into()))?;
        Ok(Self::with_metadata(metadata.clone()))
    }
}

impl fmt::Display for SuccessMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[SUCCESS ")?;
        write_map(f, &self.metadata)?;
        f.write_str("]")
    }
}

/// RECORD message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordMessage {
    /// Field values in column order
    pub fields: Vec<PackStreamValue>,
}

impl RecordMessage {
    /// Create a new RECORD message.
    pub fn new(fields: Vec<PackStreamValue>) -> Self {
        Self { fields }
    }

    /// Get field count.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if record is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert to PackStream structure.
    pub fn to_structure(&self) -> PackStreamStructure {
        PackStreamStructure::new(tag::RECORD, vec![PackStreamValue::List(self.fields.clone())])
    }

    /// Parse from PackStream structure.
    pub fn from_structure(s: &PackStreamStructure) -> Result<Self, PackStreamError> {
        expect_arity(s, "RECORD", &[1])?;
        let fields = s.fields[0]
            .as_list()
            .ok_or_else(|| PackStreamError::InvalidStructure("RECORD fields must be list".into()))?;
        Ok(Self::new(fields.to_vec()))
    }
}

impl fmt::Display for RecordMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[RECORD ")?;
        write_list(f, &self.fields)?;
        f.write_str("]")
    }
}

/// FAILURE message.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureMessage {
    /// Dotted status code, e.g. `Neo.ClientError.Statement.SyntaxError`
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl FailureMessage {
    /// Create a new FAILURE message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Convert to PackStream structure.
    pub fn to_structure(&self) -> PackStreamStructure {
        let mut metadata = HashMap::new();
        metadata.insert("code".to_string(), PackStreamValue::String(self.code.clone()));
        metadata.insert("message".to_string(), PackStreamValue::String(self.message.clone()));
        PackStreamStructure::new(tag::FAILURE, vec![PackStreamValue::Map(metadata)])
    }

    /// Parse from PackStream structure.
    pub fn from_structure(s: &PackStreamStructure) -> Result<Self, PackStreamError> {
        expect_arity(s, "FAILURE", &[1])?;
        let metadata = s.fields[0]
            .as_map()
            .ok_or_else(|| PackStreamError::InvalidStructure("FAILURE metadata must be map".into()))?;
        let text = |key: &str| {
            metadata
                .get(key)
                .and_then(PackStreamValue::as_str)
                .map(str::to_owned)
                .ok_or_else(|| {
                    PackStreamError::InvalidStructure(format!("FAILURE metadata lacks `{}`", key))
                })
        };
        Ok(Self::new(text("code")?, text("message")?))
    }
}

impl fmt::Display for FailureMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FAILURE {} {:?}]", self.code, self.message)
    }
}
