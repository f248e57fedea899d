//! Wire codec for the sidekick soccer-sim protocol.
//!
//! The protocol is textual, case-sensitive, and parenthesis-delimited:
//! `(<keyword> <space-separated fields>)`, one message per datagram, no
//! length prefix. This crate provides:
//! - [`classify`] — leading-keyword kind classification, total over any input
//! - [`decode_init`] / [`decode_hear`] — explicit per-kind parsers
//! - [`encode_intent`] / [`encode_init`] — intent-to-command encoding
//!
//! Everything here is pure: no sockets, no session state.

#![deny(missing_docs)]

pub mod classify;
pub mod decode;
pub mod encode;

pub use classify::{Classified, classify};
pub use decode::{InitAck, decode_hear, decode_init};
pub use encode::{encode_init, encode_intent};
