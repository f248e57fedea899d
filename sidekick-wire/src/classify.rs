//! Kind classification for inbound messages.
//!
//! Classification only inspects the leading keyword; it never fails.
//! Malformed leading structure is itself a valid outcome
//! ([`MessageKind::Unrecognized`]), distinct from a decode error that
//! occurs after a kind has been matched.

use sidekick_types::MessageKind;

/// A message with its kind tag and the payload text it was matched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified<'a> {
    /// The matched kind.
    pub kind: MessageKind,
    /// The payload as text, trailing padding stripped. Empty when the
    /// payload was not valid UTF-8 (which classifies as Unrecognized).
    pub text: &'a str,
}

/// Classify one datagram payload.
///
/// Trailing NUL padding and whitespace are stripped before matching; the
/// token between the leading `(` and the next whitespace selects the kind.
/// Classifying the same payload twice yields the same result.
#[must_use]
pub fn classify(payload: &[u8]) -> Classified<'_> {
    let trimmed = trim_padding(payload);
    let Ok(text) = std::str::from_utf8(trimmed) else {
        return Classified {
            kind: MessageKind::Unrecognized,
            text: "",
        };
    };
    let kind = match leading_keyword(text) {
        Some("init") => MessageKind::Init,
        Some("see") => MessageKind::Visual,
        Some("hear") => MessageKind::Heard,
        Some("sense_body") => MessageKind::Body,
        _ => MessageKind::Unrecognized,
    };
    Classified { kind, text }
}

/// Strip trailing NUL bytes and ASCII whitespace.
///
/// The server pads datagrams to a fixed size; the padding is not part of
/// the message.
fn trim_padding(payload: &[u8]) -> &[u8] {
    let end = payload
        .iter()
        .rposition(|&b| b != 0 && !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &payload[..end]
}

/// The token between the leading `(` and the next whitespace, if any.
fn leading_keyword(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('(')?;
    let end = rest.find(|c: char| c.is_ascii_whitespace())?;
    if end == 0 {
        return None;
    }
    Some(&rest[..end])
}
