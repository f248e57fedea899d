//! Core protocol types: session identity, percept events, and action intents.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum payload of a single datagram, inbound or outbound.
///
/// The server frames one message per datagram with no length prefix, so this
/// is also the hard upper bound on any encoded command.
pub const DATAGRAM_CAPACITY: usize = 4096;

/// Which half of the pitch the agent was assigned during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// The left team.
    Left,
    /// The right team.
    Right,
}

impl Side {
    /// The single-character wire token for this side.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "l",
            Side::Right => "r",
        }
    }
}

/// A validated team name.
///
/// The name is embedded unescaped in the init command, so it must be
/// non-empty and free of whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamName(String);

impl TeamName {
    /// Validate and wrap a team name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTeamName`] if the name is empty or
    /// contains whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigError::InvalidTeamName {
                reason: "team name must not be empty".to_string(),
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidTeamName {
                reason: format!("team name {name:?} must not contain whitespace"),
            });
        }
        Ok(Self(name))
    }

    /// The validated name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TeamName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeamName> for String {
    fn from(value: TeamName) -> Self {
        value.0
    }
}

/// The kind tag assigned to an inbound message by the classifier.
///
/// Exactly one kind per message; anything the classifier cannot match is
/// [`MessageKind::Unrecognized`], which is a valid outcome and never an
/// error.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// The `(init …)` handshake acknowledgement.
    Init,
    /// A `(see …)` visual percept.
    Visual,
    /// A `(hear …)` audio percept.
    Heard,
    /// A `(sense_body …)` body percept.
    Body,
    /// Any message whose leading keyword the engine does not consume.
    Unrecognized,
}

/// One received datagram: receipt timestamp plus an immutable payload.
///
/// Created per datagram and discarded after dispatch; payloads are never
/// shared with the next receive, so the classifier and decoders can hold
/// slices into it without aliasing a live buffer.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// When the datagram was received.
    pub received_at: Instant,
    /// The datagram payload, exactly as it came off the wire.
    pub payload: Vec<u8>,
}

impl RawMessage {
    /// Wrap a freshly received payload, timestamping it now.
    #[must_use]
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            received_at: Instant::now(),
            payload,
        }
    }
}

/// Who uttered a heard message.
///
/// The agent's own voice (`self` on the wire) is dropped by the decoder and
/// never appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeardSource {
    /// The referee.
    Referee,
    /// Another player, by uniform number.
    Player(u32),
}

/// A decoded audio percept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeardEvent {
    /// Simulation time of the utterance.
    pub time: u32,
    /// Who spoke.
    pub source: HeardSource,
    /// The uttered text, sliced verbatim from the wire (surrounding quotes
    /// removed), never re-tokenized.
    pub text: String,
}

/// A typed event handed to the decision collaborator.
///
/// The engine guarantees every event it dispatches is well-formed; decode
/// failures are reported to the [`ReportSink`](crate::ReportSink)s instead.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// The handshake completed: the server assigned session identity.
    InitConfirmed {
        /// Assigned side of the pitch.
        side: Side,
        /// Assigned uniform number.
        number: u8,
        /// The starting play mode token.
        play_mode: String,
    },
    /// A visual percept; the payload is the raw matched message for the
    /// world-model collaborator to interpret.
    Visual {
        /// The full `(see …)` message text.
        payload: String,
    },
    /// A body percept; raw passthrough like [`Event::Visual`].
    Body {
        /// The full `(sense_body …)` message text.
        payload: String,
    },
    /// A decoded audio percept.
    Heard(HeardEvent),
}

/// View cone width for the `change_view` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewAngle {
    /// Narrow cone, highest detail.
    Narrow,
    /// The default cone.
    Normal,
    /// Wide cone, lowest detail.
    Wide,
}

impl ViewAngle {
    /// The wire token for this angle.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ViewAngle::Narrow => "narrow",
            ViewAngle::Normal => "normal",
            ViewAngle::Wide => "wide",
        }
    }
}

/// View quality for the `change_view` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewQuality {
    /// Full detail.
    High,
    /// Reduced detail, higher frequency.
    Low,
}

impl ViewQuality {
    /// The wire token for this quality.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ViewQuality::High => "high",
            ViewQuality::Low => "low",
        }
    }
}

/// An outbound action for the current cycle.
///
/// Constructed by the decision collaborator, consumed exactly once by the
/// command encoder. Exhaustive: the encoder is total over every variant,
/// so adding a variant is a breaking change by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Teleport to a position (only legal before kickoff and after goals).
    Move {
        /// Target x coordinate.
        x: f64,
        /// Target y coordinate.
        y: f64,
    },
    /// Rotate the body.
    Turn {
        /// Turn moment in degrees.
        moment: f64,
    },
    /// Rotate the neck relative to the body.
    TurnNeck {
        /// Turn moment in degrees.
        moment: f64,
    },
    /// Accelerate in the facing direction.
    Dash {
        /// Dash power.
        power: f64,
    },
    /// Kick the ball.
    Kick {
        /// Kick power.
        power: f64,
        /// Kick direction in degrees, relative to the body.
        direction: f64,
    },
    /// Broadcast a message to nearby players.
    Say {
        /// The message text, embedded verbatim in the command.
        message: String,
    },
    /// Change the visual sensor's cone and quality.
    ChangeView {
        /// The view cone width.
        angle: ViewAngle,
        /// The view quality.
        quality: ViewQuality,
    },
    /// Leave the match; the engine terminates the session after sending it.
    Bye,
}
