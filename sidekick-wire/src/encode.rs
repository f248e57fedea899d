//! Command encoding: pure, stateless, total functions from intents to
//! their exact wire strings.
//!
//! Numbers render in Rust's locale-independent shortest round-trip decimal
//! form, so re-parsing an encoded command recovers the original values.

use sidekick_types::{DATAGRAM_CAPACITY, Intent, TeamName};

/// Encode the handshake command: `(init <team> (version <v>))`.
#[must_use]
pub fn encode_init(team: &TeamName, version: u32) -> String {
    checked(format!("(init {team} (version {version}))"))
}

/// Encode one intent as its wire command.
///
/// # Panics
///
/// Panics if the encoded command would exceed [`DATAGRAM_CAPACITY`]. The
/// wire format assumes one command per datagram, so an oversized command is
/// a programming error, not a recoverable condition. Only `say` can grow
/// without bound; callers own the length of what they say.
#[must_use]
pub fn encode_intent(intent: &Intent) -> String {
    let command = match intent {
        Intent::Move { x, y } => format!("(move {x} {y})"),
        Intent::Turn { moment } => format!("(turn {moment})"),
        Intent::TurnNeck { moment } => format!("(turn_neck {moment})"),
        Intent::Dash { power } => format!("(dash {power})"),
        Intent::Kick { power, direction } => format!("(kick {power} {direction})"),
        Intent::Say { message } => format!("(say {message})"),
        Intent::ChangeView { angle, quality } => {
            format!("(change_view {} {})", angle.as_str(), quality.as_str())
        }
        Intent::Bye => "(bye)".to_string(),
    };
    checked(command)
}

fn checked(command: String) -> String {
    assert!(
        command.len() <= DATAGRAM_CAPACITY,
        "encoded command exceeds datagram capacity ({} > {DATAGRAM_CAPACITY} bytes)",
        command.len(),
    );
    command
}
