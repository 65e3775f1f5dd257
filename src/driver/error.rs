//! Driver Error Types
//!
//! 드라이버 에러 정의

use std::fmt;
use std::io;
use thiserror::Error;

use crate::bolt::message::FailureMessage;
use crate::bolt::{BoltError, PackStreamError};

// ============================================================================
// DriverError - 드라이버 에러
// ============================================================================

/// 드라이버 에러
#[derive(Error, Debug)]
pub enum DriverError {
    /// 전송 중 연결 종료
    #[error("Connection terminated while {0}")]
    ConnectionTerminated(String),

    /// I/O 에러
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 프로토콜 에러 (잘못된 메시지, 순서 위반)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// 서버가 보고한 실패
    #[error("Server error: {0}")]
    Server(ServerError),

    /// 인증 실패
    #[error("Authentication error: {0}")]
    Authentication(ServerError),

    /// 예상하지 못한 응답 (RESET / ACK_FAILURE 에 대한 IGNORED 등)
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    /// 동시 사용 감지
    #[error("Concurrency violation: {0}")]
    Concurrency(String),

    /// 클라이언트 사용 에러
    #[error("Client error: {0}")]
    Client(String),

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 타입 변환 에러
    #[error("Type conversion error: {0}")]
    TypeConversion(String),
}

/// 에러 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 전송 계층 실패
    Transport,
    /// 프로토콜 위반
    Protocol,
    /// 서버 보고 실패
    Server,
    /// 인증 실패
    Authentication,
    /// 예상하지 못한 응답
    UnexpectedReply,
    /// 동시 사용
    Concurrency,
    /// 잘못된 사용
    Client,
    /// 설정
    Configuration,
    /// 타입 변환
    TypeConversion,
}

impl ErrorCategory {
    /// 안정적인 분류 이름
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Protocol => "protocol",
            Self::Server => "server",
            Self::Authentication => "authentication",
            Self::UnexpectedReply => "unexpected_reply",
            Self::Concurrency => "concurrency",
            Self::Client => "client",
            Self::Configuration => "configuration",
            Self::TypeConversion => "type_conversion",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DriverError {
    /// 수신 중 연결 종료 에러 생성
    pub fn terminated_receiving(expected: usize, detail: impl fmt::Display) -> Self {
        Self::ConnectionTerminated(format!(
            "receiving data. This can happen due to network instabilities, or due to restarts \
             of the database. Expected {} bytes, received {}.",
            expected, detail
        ))
    }

    /// 송신 중 연결 종료 에러 생성
    pub fn terminated_sending(expected: usize, detail: impl fmt::Display) -> Self {
        Self::ConnectionTerminated(format!(
            "sending data. This can happen due to network instabilities, or due to restarts \
             of the database. Expected {} bytes, wrote {}.",
            expected, detail
        ))
    }

    /// 프로토콜 에러 생성
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// 서버 에러 생성
    pub fn server(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Server(ServerError::new(code, message))
    }

    /// 예상하지 못한 응답 에러 생성
    pub fn unexpected_reply(msg: impl Into<String>) -> Self {
        Self::UnexpectedReply(msg.into())
    }

    /// 동시 사용 에러 생성
    pub fn concurrency(msg: impl Into<String>) -> Self {
        Self::Concurrency(msg.into())
    }

    /// 클라이언트 에러 생성
    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    /// 설정 에러 생성
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// 타입 변환 에러 생성
    pub fn type_conversion(msg: impl Into<String>) -> Self {
        Self::TypeConversion(msg.into())
    }

    /// 에러 분류
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConnectionTerminated(_) | Self::Io(_) => ErrorCategory::Transport,
            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::Server(_) => ErrorCategory::Server,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::UnexpectedReply(_) => ErrorCategory::UnexpectedReply,
            Self::Concurrency(_) => ErrorCategory::Concurrency,
            Self::Client(_) => ErrorCategory::Client,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::TypeConversion(_) => ErrorCategory::TypeConversion,
        }
    }

    /// 안정적인 에러 코드. 서버 에러는 서버 코드를 그대로 사용합니다.
    pub fn code(&self) -> &str {
        match self {
            Self::Server(e) | Self::Authentication(e) => &e.code,
            other => other.category().as_str(),
        }
    }

    /// 연결을 더 이상 사용할 수 없게 만드는 에러인지 여부
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transport | ErrorCategory::Protocol | ErrorCategory::UnexpectedReply
        )
    }

    /// 서버가 보고한 실패
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::Server(e) | Self::Authentication(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BoltError> for DriverError {
    fn from(err: BoltError) -> Self {
        match err {
            BoltError::Io(e) => DriverError::Io(e),
            other => DriverError::Protocol(other.to_string()),
        }
    }
}

impl From<PackStreamError> for DriverError {
    fn from(err: PackStreamError) -> Self {
        DriverError::Protocol(err.to_string())
    }
}

// ============================================================================
// Result Type
// ============================================================================

/// 드라이버 결과 타입
pub type DriverResult<T> = Result<T, DriverError>;

// ============================================================================
// ServerError - 서버 에러 코드
// ============================================================================

/// 서버가 FAILURE 로 보고한 에러
///
/// 에러 코드는 "Neo.{Classification}.{Category}.{Title}" 형식을 따릅니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerError {
    /// 에러 코드
    pub code: String,
    /// 에러 메시지
    pub message: String,
}

impl ServerError {
    /// 새 에러 생성
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// 분류 (ClientError, TransientError, DatabaseError)
    pub fn classification(&self) -> &str {
        self.code.split('.').nth(1).unwrap_or("")
    }

    /// 클라이언트 에러 여부
    pub fn is_client_error(&self) -> bool {
        self.classification() == "ClientError"
    }

    /// 데이터베이스 에러 여부
    pub fn is_database_error(&self) -> bool {
        self.classification() == "DatabaseError"
    }

    /// 트랜지언트 에러 여부 (재시도 가능)
    pub fn is_transient_error(&self) -> bool {
        self.classification() == "TransientError"
    }

    /// 인증 에러 여부
    pub fn is_authentication_error(&self) -> bool {
        self.code.split('.').nth(2) == Some("Security")
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ServerError {}

impl From<FailureMessage> for ServerError {
    fn from(msg: FailureMessage) -> Self {
        Self::new(msg.code, msg.message)
    }
}

impl From<ServerError> for DriverError {
    fn from(err: ServerError) -> Self {
        DriverError::Server(err)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminated_messages() {
        let err = DriverError::terminated_receiving(4, "none");
        assert_eq!(
            err.to_string(),
            "Connection terminated while receiving data. This can happen due to network \
             instabilities, or due to restarts of the database. Expected 4 bytes, received none."
        );

        let err = DriverError::terminated_sending(4, "00");
        assert!(err.to_string().ends_with("Expected 4 bytes, wrote 00."));
        assert!(err.is_fatal());
        assert_eq!(err.code(), "transport");
    }

    #[test]
    fn test_categories() {
        assert_eq!(DriverError::protocol("x").category(), ErrorCategory::Protocol);
        assert_eq!(DriverError::concurrency("x").code(), "concurrency");
        assert_eq!(DriverError::client("x").code(), "client");
        assert_eq!(DriverError::configuration("x").code(), "configuration");
        assert_eq!(DriverError::unexpected_reply("x").code(), "unexpected_reply");
    }

    #[test]
    fn test_fatality() {
        assert!(DriverError::protocol("bad tag").is_fatal());
        assert!(DriverError::unexpected_reply("ignored reset").is_fatal());
        assert!(!DriverError::server("Neo.ClientError.Statement.SyntaxError", "x").is_fatal());
        assert!(!DriverError::concurrency("busy").is_fatal());
        assert!(!DriverError::client("closed").is_fatal());
    }

    #[test]
    fn test_server_error_code_passthrough() {
        let err = DriverError::server("Neo.ClientError.Statement.SyntaxError", "Invalid syntax");
        assert_eq!(err.code(), "Neo.ClientError.Statement.SyntaxError");
        assert_eq!(
            err.to_string(),
            "Server error: Neo.ClientError.Statement.SyntaxError: Invalid syntax"
        );
        assert_eq!(err.server_error().map(|e| e.message.as_str()), Some("Invalid syntax"));
    }

    #[test]
    fn test_server_error_classification() {
        let err = ServerError::new("Neo.ClientError.Statement.SyntaxError", "Invalid syntax");
        assert!(err.is_client_error());
        assert!(!err.is_database_error());
        assert!(!err.is_transient_error());

        let err = ServerError::new("Neo.DatabaseError.General.UnknownError", "Unknown error");
        assert!(err.is_database_error());

        let err = ServerError::new("Neo.TransientError.General.TemporarilyUnavailable", "busy");
        assert!(err.is_transient_error());

        let err = ServerError::new("Neo.ClientError.Security.Unauthorized", "bad credentials");
        assert!(err.is_authentication_error());
        assert!(!ServerError::new("Neo.ClientError.Statement.SyntaxError", "").is_authentication_error());
    }

    #[test]
    fn test_from_bolt_error() {
        let err: DriverError = BoltError::from(PackStreamError::UnexpectedEof).into();
        assert!(matches!(err, DriverError::Protocol(_)));

        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe");
        let err: DriverError = BoltError::from(io_err).into();
        assert!(matches!(err, DriverError::Io(_)));
    }

    #[test]
    fn test_from_failure_message() {
        let failure = FailureMessage::new("code.error", "message");
        let err: DriverError = ServerError::from(failure).into();
        assert!(matches!(err, DriverError::Server(ref e) if e.code == "code.error"));
    }
}
