//! Collaborator traits: Brain, Transport, ReportSink.
//!
//! Uses RPITIT (return position impl trait in trait) — native async without
//! heap allocation. `Brain` and `Transport` are not object-safe by design;
//! compose them through generics. `ReportSink` is object-safe so the engine
//! can hold a heterogeneous list of sinks.

use std::future::Future;
use std::net::SocketAddr;

use crate::error::{DecodeError, TransportError};
use crate::types::{Event, Intent, MessageKind};

/// The decision collaborator: turns typed events into intents.
///
/// The engine calls this once per successfully decoded event and does not
/// receive again until it returns (cooperative, not concurrent). It never
/// sees a malformed event or an error.
///
/// # Example
///
/// ```ignore
/// struct Spectator;
///
/// impl Brain for Spectator {
///     async fn decide(&mut self, _event: Event) -> Vec<Intent> {
///         Vec::new()
///     }
/// }
/// ```
pub trait Brain: Send {
    /// Process one event, returning zero or more intents for this cycle.
    fn decide(&mut self, event: Event) -> impl Future<Output = Vec<Intent>> + Send;
}

/// One datagram as received: payload plus the sender's address.
///
/// The address matters during the handshake — the server acks from a
/// session-specific port that becomes the destination for every
/// subsequent send.
#[derive(Debug, Clone)]
pub struct Datagram {
    /// The raw payload, one complete message.
    pub payload: Vec<u8>,
    /// Where the datagram came from.
    pub from: SocketAddr,
}

/// The datagram transport boundary: connectionless, unordered, unreliable.
///
/// One outstanding receive at a time; the receive may await indefinitely,
/// and a deliberately closed transport must resolve it with
/// [`TransportError::Closed`] rather than hang.
pub trait Transport: Send {
    /// Await the next datagram.
    fn recv(&mut self) -> impl Future<Output = Result<Datagram, TransportError>> + Send;

    /// Send one datagram to the given peer.
    fn send_to(
        &mut self,
        payload: &[u8],
        peer: SocketAddr,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// A structured, non-fatal runtime report.
///
/// Everything here is survivable by design: the event or command involved
/// is dropped and the loop continues.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Report {
    /// A recognized message kind failed to decode; the event was dropped.
    DecodeFailed {
        /// The kind the classifier matched before decoding failed.
        kind: MessageKind,
        /// The decode failure.
        error: DecodeError,
    },
    /// Sending a single command failed; the match continues without it.
    SendFailed {
        /// The underlying failure, rendered.
        detail: String,
    },
    /// The receive side failed unexpectedly; the loop is about to exit.
    ReceiveFailed {
        /// The underlying failure, rendered.
        detail: String,
    },
}

/// Where the engine delivers [`Report`]s.
///
/// Replaces global logging state with an explicitly passed sink, so tests
/// capture reports deterministically. The engine installs a [`TracingSink`]
/// by default; add more for programmatic observation.
pub trait ReportSink: Send + Sync {
    /// Deliver one report. Must not block the loop.
    fn report(&self, report: &Report);
}

/// A [`ReportSink`] that forwards reports to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, report: &Report) {
        match report {
            Report::DecodeFailed { kind, error } => {
                tracing::warn!(?kind, %error, "dropped undecodable message");
            }
            Report::SendFailed { detail } => {
                tracing::warn!(%detail, "command send failed");
            }
            Report::ReceiveFailed { detail } => {
                tracing::warn!(%detail, "receive failed");
            }
        }
    }
}
