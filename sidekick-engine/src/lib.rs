//! Session state machine, UDP transport, and agent loop driver for the
//! sidekick soccer-sim client.
//!
//! This crate provides:
//! - [`AgentLoop`] — the core loop: handshake, then receive → decode →
//!   dispatch → send, one cycle at a time
//! - [`Session`] / [`Phase`] — the connection state machine
//! - [`UdpTransport`] — the datagram transport over `tokio`
//! - [`ClientConfig`] — host, port, team, protocol version, handshake bound
//!
//! The decision collaborator plugs in through the
//! [`Brain`](sidekick_types::Brain) trait; tests drive the loop with a
//! scripted transport and brain instead of a live server.

#![deny(missing_docs)]

pub mod config;
pub mod loop_impl;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_PROTOCOL_VERSION};
pub use loop_impl::AgentLoop;
pub use session::{Phase, Session};
pub use transport::UdpTransport;
