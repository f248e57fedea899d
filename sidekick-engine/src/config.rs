//! Configuration for one agent session.

use std::time::Duration;

use sidekick_types::TeamName;

/// Protocol version sent in the init command when none is configured.
pub const DEFAULT_PROTOCOL_VERSION: u32 = 9;

/// Default bound on the wait for the init ack.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the agent loop.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server host name or IP address.
    pub host: String,
    /// Server port initially contacted; the ack's source port replaces it
    /// for all subsequent sends.
    pub port: u16,
    /// The team to join.
    pub team: TeamName,
    /// Protocol version announced in the init command.
    pub protocol_version: u32,
    /// How long the handshake waits for the init ack before failing.
    /// Without a bound a dropped ack would hang the agent forever.
    pub handshake_timeout: Duration,
}

impl ClientConfig {
    /// Configuration with the default protocol version and handshake bound.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, team: TeamName) -> Self {
        Self {
            host: host.into(),
            port,
            team,
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// The `host:port` pair the handshake contacts first.
    #[must_use]
    pub fn server_endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
