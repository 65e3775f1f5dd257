//! Bolt protocol request messages.
//!
//! Request messages are sent from the client to the server.

use std::collections::HashMap;
use std::fmt;

use super::{expect_arity, tag};
use crate::bolt::packstream::types::write_map;
use crate::bolt::packstream::{PackStreamError, PackStreamStructure, PackStreamValue};

/// All Bolt v1 request messages.
#[derive(Debug, Clone, PartialEq)]
pub enum BoltRequest {
    /// INIT - Identify the client and authenticate
    Init(InitMessage),
    /// RUN - Execute a statement
    Run(RunMessage),
    /// DISCARD_ALL - Drop the remaining records of the current result
    DiscardAll,
    /// PULL_ALL - Stream the remaining records of the current result
    PullAll,
    /// RESET - Return the session to a clean state
    Reset,
    /// ACK_FAILURE - Acknowledge a failure and leave the failed state
    AckFailure,
}

impl BoltRequest {
    /// Get the message tag.
    pub fn tag(&self) -> u8 {
        match self {
            BoltRequest::Init(_) => tag::INIT,
            BoltRequest::Run(_) => tag::RUN,
            BoltRequest::DiscardAll => tag::DISCARD_ALL,
            BoltRequest::PullAll => tag::PULL_ALL,
            BoltRequest::Reset => tag::RESET,
            BoltRequest::AckFailure => tag::ACK_FAILURE,
        }
    }

    /// Get message name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            BoltRequest::Init(_) => "INIT",
            BoltRequest::Run(_) => "RUN",
            BoltRequest::DiscardAll => "DISCARD_ALL",
            BoltRequest::PullAll => "PULL_ALL",
            BoltRequest::Reset => "RESET",
            BoltRequest::AckFailure => "ACK_FAILURE",
        }
    }

    /// Convert to PackStream structure.
    pub fn to_structure(&self) -> PackStreamStructure {
        match self {
            BoltRequest::Init(msg) => msg.to_structure(),
            BoltRequest::Run(msg) => msg.to_structure(),
            other => PackStreamStructure::new(other.tag(), vec![]),
        }
    }

    /// Parse from PackStream structure.
    pub fn from_structure(s: &PackStreamStructure) -> Result<Self, PackStreamError> {
        let bare = |request: BoltRequest| -> Result<BoltRequest, PackStreamError> {
            expect_arity(s, request.name(), &[0])?;
            Ok(request)
        };
        match s.tag {
            tag::INIT => Ok(BoltRequest::Init(InitMessage::from_structure(s)?)),
            tag::RUN => Ok(BoltRequest::Run(RunMessage::from_structure(s)?)),
            tag::DISCARD_ALL => bare(BoltRequest::DiscardAll),
            tag::PULL_ALL => bare(BoltRequest::PullAll),
            tag::RESET => bare(BoltRequest::Reset),
            tag::ACK_FAILURE => bare(BoltRequest::AckFailure),
            _ => Err(PackStreamError::InvalidStructure(format!(
                "Unknown request message tag: 0x{:02X}",
                s.tag
            ))),
        }
    }
}

impl fmt::Display for BoltRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoltRequest::Init(msg) => write!(f, "{}", msg),
            BoltRequest::Run(msg) => write!(f, "{}", msg),
            other => write!(f, "[{}]", other.name()),
        }
    }
}

/// INIT message - client name and authentication map.
#[derive(Clone, PartialEq)]
pub struct InitMessage {
    /// Client identifier, `<agent-name>/<version>`
    pub client_name: String,
    /// Authentication token map
    pub auth_token: HashMap<String, PackStreamValue>,
}

impl InitMessage {
    /// Create a new INIT message.
    pub fn new(client_name: impl Into<String>, auth_token: HashMap<String, PackStreamValue>) -> Self {
        Self {
            client_name: client_name.into(),
            auth_token,
        }
    }

    /// Convert to PackStream structure.
    pub fn to_structure(&self) -> PackStreamStructure {
        PackStreamStructure::new(
            tag::INIT,
            vec![
                PackStreamValue::String(self.client_name.clone()),
                PackStreamValue::Map(self.auth_token.clone()),
            ],
        )
    }

    /// Parse from PackStream structure.
    pub fn from_structure(s: &PackStreamStructure) -> Result<Self, PackStreamError> {
        expect_arity(s, "INIT", &[2])?;
        let client_name = s.fields[0]
            .as_str()
            .ok_or_else(|| PackStreamError::InvalidStructure("INIT client name must be string".into()))?;
        let auth_token = s.fields[1]
            .as_map()
            .ok_or_else(|| PackStreamError::InvalidStructure("INIT auth token must be map".into()))?;
        Ok(Self::new(client_name, auth_token.clone()))
    }
}

// Credentials never leave this type through formatting.
impl fmt::Debug for InitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.auth_token.keys().collect();
        keys.sort();
        f.debug_struct("InitMessage")
            .field("client_name", &self.client_name)
            .field("auth_token_keys", &keys)
            .finish()
    }
}

impl fmt::Display for InitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[INIT {:?}]", self.client_name)
    }
}

/// RUN message - statement and parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMessage {
    /// Statement text
    pub statement: String,
    /// Statement parameters
    pub parameters: HashMap<String, PackStreamValue>,
}

impl RunMessage {
    /// Create a RUN message without parameters.
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            parameters: HashMap::new(),
        }
    }

    /// Set statement parameters.
    pub fn with_parameters(mut self, parameters: HashMap<String, PackStreamValue>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Convert to PackStream structure.
    pub fn to_structure(&self) -> PackStreamStructure {
        PackStreamStructure::new(
            tag::RUN,
            vec![
                PackStreamValue::String(self.statement.clone()),
                PackStreamValue::Map(self.parameters.clone()),
            ],
        )
    }

    /// Parse from PackStream structure.
    pub fn from_structure(s: &PackStreamStructure) -> Result<Self, PackStreamError> {
        expect_arity(s, "RUN", &[2])?;
        let statement = s.fields[0]
            .as_str()
            .ok_or_else(|| PackStreamError::InvalidStructure("RUN statement must be string".into()))?;
        let parameters = s.fields[1]
            .as_map()
            .ok_or_else(|| PackStreamError::InvalidStructure("RUN parameters must be map".into()))?;
        Ok(Self::new(statement).with_parameters(parameters.clone()))
    }
}

impl fmt::Display for RunMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[RUN {:?} ", self.statement)?;
        write_map(f, &self.parameters)?;
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_auth() -> HashMap<String, PackStreamValue> {
        let mut auth = HashMap::new();
        auth.insert("scheme".to_string(), "basic".into());
        auth.insert("principal".to_string(), "neo4j".into());
        auth.insert("credentials".to_string(), "secret".into());
        auth
    }

    #[test]
    fn test_init_message() {
        let msg = InitMessage::new("bolt-client/0.1.0", basic_auth());
        let s = msg.to_structure();
        assert_eq!(s.tag, tag::INIT);
        assert_eq!(s.fields.len(), 2);
        assert_eq!(s.fields[0].as_str(), Some("bolt-client/0.1.0"));

        let parsed = InitMessage::from_structure(&s).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_init_hides_credentials() {
        let msg = BoltRequest::Init(InitMessage::new("client", basic_auth()));
        assert_eq!(msg.to_string(), "[INIT \"client\"]");
        assert!(!format!("{:?}", msg).contains("secret"));
    }

    #[test]
    fn test_run_message() {
        let mut params = HashMap::new();
        params.insert(
            "value".to_string(),
            PackStreamValue::List(vec!["cat".into(), "cat".into(), "cat".into()]),
        );
        let msg = RunMessage::new("stat").with_parameters(params);
        assert_eq!(msg.to_string(), "[RUN \"stat\" {value=[\"cat\", \"cat\", \"cat\"]}]");

        let s = msg.to_structure();
        assert_eq!(s.tag, tag::RUN);
        assert_eq!(RunMessage::from_structure(&s).unwrap(), msg);
    }

    #[test]
    fn test_run_rejects_v3_extra_field() {
        let s = PackStreamStructure::new(
            tag::RUN,
            vec![
                "RETURN 1".into(),
                PackStreamValue::Map(HashMap::new()),
                PackStreamValue::Map(HashMap::new()),
            ],
        );
        assert!(RunMessage::from_structure(&s).is_err());
    }

    #[test]
    fn test_bare_requests() {
        for (request, tag, text) in [
            (BoltRequest::PullAll, tag::PULL_ALL, "[PULL_ALL]"),
            (BoltRequest::DiscardAll, tag::DISCARD_ALL, "[DISCARD_ALL]"),
            (BoltRequest::Reset, tag::RESET, "[RESET]"),
            (BoltRequest::AckFailure, tag::ACK_FAILURE, "[ACK_FAILURE]"),
        ] {
            let s = request.to_structure();
            assert_eq!(s.tag, tag);
            assert!(s.fields.is_empty());
            assert_eq!(request.to_string(), text);
            assert_eq!(BoltRequest::from_structure(&s).unwrap(), request);
        }
    }

    #[test]
    fn test_bare_request_with_fields_is_rejected() {
        let s = PackStreamStructure::new(tag::PULL_ALL, vec![PackStreamValue::Integer(-1)]);
        assert!(BoltRequest::from_structure(&s).is_err());
    }

    #[test]
    fn test_unknown_request_tag() {
        let s = PackStreamStructure::new(0x11, vec![]);
        let err = BoltRequest::from_structure(&s).unwrap_err();
        assert!(err.to_string().contains("0x11"));
    }
}
