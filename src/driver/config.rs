//! Connection Config
//!
//! 연결 설정, 인증 토큰, 서버 주소

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{DriverError, DriverResult};
use super::types::Value;
use crate::bolt::codec::DEFAULT_MAX_MESSAGE_SIZE;
use crate::bolt::PackStreamValue;

/// 기본 Bolt 포트
pub const DEFAULT_PORT: u16 = 7687;

/// 지원하는 URI 스킴
pub const BOLT_SCHEME: &str = "bolt";

// ============================================================================
// AuthToken - 인증 토큰
// ============================================================================

/// 인증 토큰
///
/// INIT 메시지에 그대로 실리는 맵입니다. 생성자로 만든 토큰에는 항상
/// 문자열 `scheme` 이 들어 있습니다.
#[derive(Clone, PartialEq)]
pub struct AuthToken {
    map: HashMap<String, Value>,
}

impl AuthToken {
    /// Basic 인증 토큰 생성
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        let mut map = HashMap::new();
        map.insert("scheme".to_string(), Value::from("basic"));
        map.insert("principal".to_string(), Value::String(username.into()));
        map.insert("credentials".to_string(), Value::String(password.into()));
        Self { map }
    }

    /// Basic 인증 토큰 생성 (realm 포함)
    pub fn basic_with_realm(
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        let mut token = Self::basic(username, password);
        token.map.insert("realm".to_string(), Value::String(realm.into()));
        token
    }

    /// 인증 없음
    pub fn none() -> Self {
        let mut map = HashMap::new();
        map.insert("scheme".to_string(), Value::from("none"));
        Self { map }
    }

    /// 커스텀 인증 토큰 생성
    pub fn custom(
        principal: impl Into<String>,
        credentials: impl Into<String>,
        realm: impl Into<String>,
        scheme: impl Into<String>,
    ) -> Self {
        let mut map = HashMap::new();
        map.insert("scheme".to_string(), Value::String(scheme.into()));
        map.insert("principal".to_string(), Value::String(principal.into()));
        map.insert("credentials".to_string(), Value::String(credentials.into()));
        map.insert("realm".to_string(), Value::String(realm.into()));
        Self { map }
    }

    /// 커스텀 인증 토큰에 파라미터 추가
    pub fn with_parameters(mut self, parameters: HashMap<String, Value>) -> Self {
        self.map.insert("parameters".to_string(), Value::Map(parameters));
        self
    }

    /// 미리 만든 맵에서 생성. 검증은 연결 시점에 합니다.
    pub fn from_map(map: HashMap<String, Value>) -> Self {
        Self { map }
    }

    /// 인증 스킴
    pub fn scheme(&self) -> Option<&str> {
        self.map.get("scheme").and_then(Value::as_str)
    }

    /// 토큰 맵
    pub fn as_map(&self) -> &HashMap<String, Value> {
        &self.map
    }

    /// 검증 후 INIT 용 맵으로 변환
    pub fn to_wire(&self) -> DriverResult<HashMap<String, PackStreamValue>> {
        if self.scheme().is_none() {
            return Err(DriverError::client(format!(
                "Unknown authentication token, `{:?}`. Please use one of the supported tokens \
                 from `AuthToken`.",
                self
            )));
        }
        Ok(self
            .map
            .iter()
            .map(|(k, v)| (k.clone(), PackStreamValue::from(v.clone())))
            .collect())
    }
}

impl Default for AuthToken {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // credentials never leave the process through logs
        let mut keys: Vec<&str> = self.map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("AuthToken")
            .field("scheme", &self.scheme())
            .field("keys", &keys)
            .finish()
    }
}

// ============================================================================
// ServerAddress - 서버 주소
// ============================================================================

/// 서버 주소
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddress {
    /// 호스트
    pub host: String,
    /// 포트
    pub port: u16,
}

impl ServerAddress {
    /// 새 서버 주소 생성
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `bolt://host[:port]` 파싱. IPv6 호스트는 대괄호로 감쌉니다.
    pub fn parse(uri: &str) -> DriverResult<Self> {
        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| DriverError::configuration(format!("Invalid URI: `{}`", uri)))?;
        if !scheme.eq_ignore_ascii_case(BOLT_SCHEME) {
            return Err(DriverError::configuration(format!(
                "Unsupported URI scheme: `{}`",
                scheme
            )));
        }

        let authority = rest.split(['/', '?']).next().unwrap_or("");

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (host, tail) = bracketed.split_once(']').ok_or_else(|| {
                DriverError::configuration(format!("Unterminated IPv6 address in `{}`", uri))
            })?;
            match tail {
                "" => (host, None),
                _ => match tail.strip_prefix(':') {
                    Some(port) => (host, Some(port)),
                    None => {
                        return Err(DriverError::configuration(format!(
                            "Invalid server address: `{}`",
                            authority
                        )))
                    }
                },
            }
        } else {
            match authority.split_once(':') {
                Some((_, port)) if port.contains(':') => {
                    return Err(DriverError::configuration(format!(
                        "Invalid server address: `{}` (IPv6 hosts need brackets)",
                        authority
                    )))
                }
                Some((host, port)) => (host, Some(port)),
                None => (authority, None),
            }
        };

        if host.is_empty() {
            return Err(DriverError::configuration(format!("Missing host in `{}`", uri)));
        }

        let port = match port {
            None => DEFAULT_PORT,
            Some(p) => p
                .parse::<u16>()
                .ok()
                .filter(|&p| p != 0)
                .ok_or_else(|| DriverError::configuration(format!("Invalid port: `{}`", p)))?,
        };

        Ok(Self::new(host, port))
    }

    /// 소켓 주소로 변환
    pub fn to_socket_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl Default for ServerAddress {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_PORT)
    }
}

// ============================================================================
// Config - 연결 설정
// ============================================================================

/// 연결 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// INIT 에 보내는 클라이언트 이름 (`이름/버전`)
    pub user_agent: String,
    /// TCP 연결 타임아웃 (밀리초, 0 은 무제한)
    pub connection_timeout_ms: u64,
    /// 메시지 로그 (`C:` / `S:` 줄) 활성화
    pub log_messages: bool,
    /// 수신 메시지 최대 크기 (바이트)
    pub max_message_size: usize,
}

impl Config {
    /// 기본 설정
    pub fn new() -> Self {
        Self::default()
    }

    /// 빌더 시작
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// 연결 타임아웃
    pub fn connection_timeout(&self) -> Option<Duration> {
        match self.connection_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: super::bolt::CLIENT_USER_AGENT.to_string(),
            connection_timeout_ms: 5_000,
            log_messages: false,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

// ============================================================================
// ConfigBuilder - 설정 빌더
// ============================================================================

/// 연결 설정 빌더
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// 새 빌더 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// User Agent 설정
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// 연결 타임아웃 설정
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_timeout_ms = timeout.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    /// 메시지 로그 활성화
    pub fn with_message_logging(mut self, enabled: bool) -> Self {
        self.config.log_messages = enabled;
        self
    }

    /// 수신 메시지 최대 크기 설정
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// 빌드
    pub fn build(self) -> Config {
        self.config
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(
            ServerAddress::parse("bolt://localhost").unwrap(),
            ServerAddress::new("localhost", 7687)
        );
        assert_eq!(
            ServerAddress::parse("bolt://db.example.com:7688").unwrap(),
            ServerAddress::new("db.example.com", 7688)
        );
        assert_eq!(
            ServerAddress::parse("BOLT://localhost:1/").unwrap(),
            ServerAddress::new("localhost", 1)
        );
    }

    #[test]
    fn test_parse_ipv6() {
        let addr = ServerAddress::parse("bolt://[::1]:7699").unwrap();
        assert_eq!(addr, ServerAddress::new("::1", 7699));
        assert_eq!(addr.to_string(), "[::1]:7699");

        let addr = ServerAddress::parse("bolt://[fe80::1]").unwrap();
        assert_eq!(addr.port, DEFAULT_PORT);

        assert!(ServerAddress::parse("bolt://::1:7687").is_err());
        assert!(ServerAddress::parse("bolt://[::1").is_err());
    }

    #[test]
    fn test_parse_rejections() {
        for uri in [
            "http://localhost:7474",
            "localhost:7687",
            "bolt://",
            "bolt://:7687",
            "bolt://localhost:notaport",
            "bolt://localhost:0",
            "bolt://localhost:70000",
        ] {
            let err = ServerAddress::parse(uri).unwrap_err();
            assert!(matches!(err, DriverError::Configuration(_)), "{}", uri);
        }
    }

    #[test]
    fn test_auth_tokens() {
        let token = AuthToken::basic("neo4j", "secret");
        assert_eq!(token.scheme(), Some("basic"));
        assert_eq!(token.as_map().get("principal"), Some(&Value::from("neo4j")));

        let token = AuthToken::basic_with_realm("neo4j", "secret", "native");
        assert_eq!(token.as_map().get("realm"), Some(&Value::from("native")));

        assert_eq!(AuthToken::none().scheme(), Some("none"));

        let token = AuthToken::custom("me", "pw", "realm", "kerberos")
            .with_parameters(HashMap::from([("ttl".to_string(), Value::Integer(60))]));
        assert_eq!(token.scheme(), Some("kerberos"));
        assert_eq!(token.to_wire().unwrap().len(), 5);
    }

    #[test]
    fn test_auth_debug_hides_credentials() {
        let debug = format!("{:?}", AuthToken::basic("neo4j", "hunter2"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("credentials"));
    }

    #[test]
    fn test_unknown_auth_token_rejected() {
        let token = AuthToken::from_map(HashMap::from([(
            "principal".to_string(),
            Value::from("neo4j"),
        )]));
        let err = token.to_wire().unwrap_err();
        assert!(matches!(err, DriverError::Client(_)));
        let msg = err.to_string();
        assert!(msg.contains("Unknown authentication token"));
        assert!(msg.contains("Please use one of the supported tokens from `AuthToken`."));

        let wrong_type = AuthToken::from_map(HashMap::from([(
            "scheme".to_string(),
            Value::Integer(1),
        )]));
        assert!(wrong_type.to_wire().is_err());
    }

    #[test]
    fn test_config_defaults_and_builder() {
        let config = Config::default();
        assert!(config.user_agent.starts_with("bolt-client/"));
        assert_eq!(config.connection_timeout(), Some(Duration::from_secs(5)));
        assert!(!config.log_messages);
        assert_eq!(config.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);

        let config = Config::builder()
            .with_user_agent("app/1.0")
            .with_connection_timeout(Duration::from_millis(0))
            .with_message_logging(true)
            .with_max_message_size(1024)
            .build();
        assert_eq!(config.user_agent, "app/1.0");
        assert_eq!(config.connection_timeout(), None);
        assert!(config.log_messages);
        assert_eq!(config.max_message_size, 1024);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: Config =
            serde_json::from_str(r#"{"user_agent": "svc/2", "log_messages": true}"#).unwrap();
        assert_eq!(config.user_agent, "svc/2");
        assert!(config.log_messages);
        assert_eq!(config.connection_timeout_ms, 5_000);

        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
