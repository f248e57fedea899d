//! Error types for each layer of the engine.
//!
//! The taxonomy mirrors how failures are handled at runtime: decode errors
//! are recoverable (except during the handshake), transport receive errors
//! end the loop, transport send errors do not, and configuration errors
//! surface before anything touches the network.

use std::time::Duration;

use thiserror::Error;

/// A recognized message kind failed to decode.
///
/// Recoverable everywhere except the handshake: the event is dropped,
/// the failure is reported, and the loop continues.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The init ack did not match `(init <side> <number> <mode>)`.
    #[error("malformed init ack: {0}")]
    MalformedInit(String),

    /// The hear message did not match `(hear <time> <sender> <utterance>)`.
    #[error("malformed hear message: {0}")]
    MalformedHear(String),

    /// The side token was neither `l` nor `r`.
    #[error("invalid side token: {0:?}")]
    InvalidSide(String),

    /// The uniform number was not a 1-2 digit integer.
    #[error("invalid uniform number: {0:?}")]
    InvalidUniformNumber(String),

    /// The simulation time field was not a non-negative integer.
    #[error("invalid simulation time: {0:?}")]
    InvalidTime(String),

    /// The hear sender was neither `referee`, `self`, nor a uniform number.
    #[error("invalid hear sender: {0:?}")]
    InvalidSender(String),
}

/// A failure at the datagram transport boundary.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport was deliberately closed; a blocked receive returns
    /// this instead of hanging.
    #[error("transport closed")]
    Closed,

    /// An unexpected lower-level socket error.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid configuration, caught before the engine touches the network.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The team name is empty or contains whitespace.
    #[error("invalid team name: {reason}")]
    InvalidTeamName {
        /// Why the name was rejected.
        reason: String,
    },

    /// The configured server host/port did not resolve to an address.
    #[error("cannot resolve server address {0:?}")]
    UnresolvableServer(String),
}

/// A fatal engine failure; the loop cannot continue past any of these.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The init ack was absent, of the wrong kind, or malformed. The agent
    /// cannot proceed without its side and number, so this is fatal.
    #[error("handshake failed: {reason}")]
    HandshakeFailed {
        /// What was wrong with the ack.
        reason: String,
    },

    /// No init ack arrived within the configured bound.
    #[error("handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    /// A session transition was requested in the wrong phase. This is a
    /// driver bug, not a protocol condition.
    #[error("session transition {transition} invalid in phase {phase}")]
    InvalidTransition {
        /// The transition that was attempted.
        transition: &'static str,
        /// The phase the session was in.
        phase: &'static str,
    },

    /// The transport failed while the engine still needed it.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
