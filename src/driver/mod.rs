//! Driver Module
//!
//! Bolt 연결 엔진과 값 모델
//!
//! - `bolt` - 전송, 연결 엔진, 응답 분배, 동시 사용 보호, 연결 생성
//! - `types` - Value, Node, Relationship, Path
//! - `record` / `summary` - 결과 레코드와 요약
//! - `config` - Config, AuthToken, ServerAddress
//! - `error` - DriverError, ServerError
//!
//! # Example
//!
//! ```no_run
//! use bolt_client::driver::bolt::{ResultCollector, SocketConnector};
//! use bolt_client::driver::{AuthToken, Config};
//! use bolt_client::params;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let connection = SocketConnector::new().connect(
//!     "bolt://localhost:7687",
//!     &Config::default(),
//!     &AuthToken::basic("neo4j", "password"),
//! )?;
//!
//! // RUN 과 PULL_ALL 을 쌓아두고 한 번에 보냄
//! let result = ResultCollector::new("MATCH (n:Person {name: $name}) RETURN n");
//! connection.run(
//!     "MATCH (n:Person {name: $name}) RETURN n",
//!     params! { "name" => "Alice" },
//!     Box::new(result.clone()),
//! )?;
//! connection.pull_all(Box::new(result.clone()))?;
//! connection.sync()?;
//!
//! for record in result.records() {
//!     println!("{}", record);
//! }
//! connection.close()?;
//! # Ok(())
//! # }
//! ```

pub mod bolt;
mod config;
mod error;
mod record;
mod summary;
mod types;

// Re-exports
pub use config::{AuthToken, Config, ConfigBuilder, ServerAddress, BOLT_SCHEME, DEFAULT_PORT};
pub use error::{DriverError, DriverResult, ErrorCategory, ServerError};
pub use record::Record;
pub use summary::{
    InputPosition, Notification, Plan, ProfiledPlan, ResultSummary, StatementType,
    SummaryCounters,
};
pub use types::{Node, Path, Relationship, Segment, Value, ValueType};

/// 파라미터 맵 생성 매크로
#[macro_export]
macro_rules! params {
    () => {
        std::collections::HashMap::<String, $crate::driver::Value>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::<String, $crate::driver::Value>::new();
        $(
            map.insert($key.into(), $crate::driver::Value::from($value));
        )+
        map
    }};
}
