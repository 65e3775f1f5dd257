//! # Bolt Client
//!
//! A synchronous, pipelined Bolt v1 connection engine for graph database
//! clients.
//!
//! ## Features
//!
//! - **Bolt v1 wire protocol** - PackStream encoding, chunked framing and
//!   version negotiation
//! - **Pipelining** - Requests are buffered until `flush`/`sync`, then sent in
//!   one write; replies are routed to their collectors in FIFO order
//! - **Failure handling** - Server failures are recoverable with
//!   `ack_failure`/`reset`; transport and protocol failures mark the connection
//!   unrecoverable and notify registered observers
//! - **Fail-fast concurrency guard** - Concurrent use of one connection is
//!   rejected instead of corrupting the stream
//! - **Typed graph values** - Nodes, relationships and paths decoded from
//!   PackStream structures
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use bolt_client::{AuthToken, Config, ResultCollector, SocketConnector};
//! use std::collections::HashMap;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::builder().with_message_logging(true).build();
//!     let connection = SocketConnector::new().connect(
//!         "bolt://localhost:7687",
//!         &config,
//!         &AuthToken::basic("neo4j", "password"),
//!     )?;
//!
//!     let result = ResultCollector::new("RETURN 1 AS n");
//!     connection.run("RETURN 1 AS n", HashMap::new(), Box::new(result.clone()))?;
//!     connection.pull_all(Box::new(result.clone()))?;
//!     connection.sync()?;
//!
//!     for record in result.records() {
//!         println!("n = {}", record.get_int("n")?);
//!     }
//!     connection.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Recovering From Failures
//!
//! ```rust,no_run
//! # use bolt_client::{AuthToken, Config, DriverError, NoOpCollector, SocketConnector};
//! # use std::collections::HashMap;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let connection = SocketConnector::new()
//! #     .connect("bolt://localhost:7687", &Config::default(), &AuthToken::none())?;
//! connection.run("RETURN", HashMap::new(), Box::new(NoOpCollector))?;
//! connection.discard_all(Box::new(NoOpCollector))?;
//! match connection.sync() {
//!     Err(DriverError::Server(e)) => {
//!         eprintln!("{}", e);
//!         connection.ack_failure()?;
//!         connection.sync()?;
//!     }
//!     other => other?,
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`driver`] - Connection engine, value model, configuration and errors
//! - [`bolt`] - Low-level Bolt protocol implementation
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bolt;
pub mod driver;

// Re-exports for convenience
pub use driver::bolt::{
    Collector, ConcurrencyGuard, Connection, NoOpCollector, ResultCollector, SocketConnection,
    SocketConnector,
};
pub use driver::{
    AuthToken, Config, ConfigBuilder, DriverError, DriverResult, Node, Path, Record,
    Relationship, ResultSummary, ServerAddress, ServerError, Value,
};

pub use bolt::{BoltError, BoltVersion, PackStreamValue};
