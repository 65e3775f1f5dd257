//! Socket Connector
//!
//! Opens a connection from a `bolt://` URI and returns it after the handshake and INIT.

use tracing::{debug, info};

use super::channel::{ByteChannel, TcpChannel};
use super::client::SocketClient;
use super::connection::SocketConnection;
use super::guard::ConcurrencyGuard;
use crate::driver::config::{AuthToken, Config, ServerAddress, BOLT_SCHEME};
use crate::driver::error::DriverResult;

/// TCP connection
pub type TcpConnection = ConcurrencyGuard<SocketConnection<TcpChannel>>;

/// Socket connector
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketConnector;

impl SocketConnector {
    /// Create a connector
    pub fn new() -> Self {
        Self
    }

    /// Whether the scheme is supported
    pub fn supports(&self, scheme: &str) -> bool {
        scheme.eq_ignore_ascii_case(BOLT_SCHEME)
    }

    /// Supported schemes
    pub fn supported_schemes(&self) -> &'static [&'static str] {
        &[BOLT_SCHEME]
    }

    /// Connect to a server
    pub fn connect(
        &self,
        uri: &str,
        config: &Config,
        auth_token: &AuthToken,
    ) -> DriverResult<TcpConnection> {
        let address = ServerAddress::parse(uri)?;
        // check the token shape before opening a socket
        auth_token.to_wire()?;

        let channel = TcpChannel::connect(&address, config.connection_timeout())?;
        channel.set_nodelay(true)?;
        let mut connection = self.establish(channel, config, auth_token)?;
        info!(
            address = %address,
            server = connection.get_mut().server().unwrap_or("unknown"),
            "connected"
        );
        Ok(connection)
    }

    /// Handshake, guard and INIT over an open channel
    pub fn establish<C: ByteChannel>(
        &self,
        channel: C,
        config: &Config,
        auth_token: &AuthToken,
    ) -> DriverResult<ConcurrencyGuard<SocketConnection<C>>> {
        let mut client = SocketClient::new(channel, config.max_message_size);
        let version = client.start()?;
        debug!(version = %version, "negotiated protocol version");

        let connection = ConcurrencyGuard::new(SocketConnection::new(client, config));
        if let Err(e) = connection.init(&config.user_agent, auth_token) {
            if let Err(close_err) = connection.close() {
                debug!(error = %close_err, "failed to close connection after INIT failure");
            }
            return Err(e);
        }
        Ok(connection)
    }
}

// ============================================================================
// Tests
// ============================================================================
