//! Shared types and traits for the sidekick soccer-sim agent client.
//!
//! This crate defines:
//! - the protocol data model ([`Event`], [`Intent`], [`HeardEvent`], …)
//! - the three collaborator seams ([`Brain`], [`Transport`], [`ReportSink`])
//! - the error taxonomy ([`DecodeError`], [`TransportError`], [`EngineError`])
//!
//! The wire codec lives in `sidekick-wire`; the session state machine and
//! loop driver live in `sidekick-engine`.

#![deny(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::*;
pub use traits::*;
pub use types::*;
