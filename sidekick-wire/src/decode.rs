//! Per-kind decoders: small explicit parsers, one per message kind.
//!
//! Each decoder takes the classified message text and returns a structured
//! result or a [`DecodeError`]. Fields are positional within each kind.
//! Visual and body percepts are not decoded here — the engine hands their
//! raw payloads to the world-model collaborator verbatim.

use sidekick_types::{DecodeError, HeardEvent, HeardSource, Side};

/// The decoded handshake acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitAck {
    /// The assigned side.
    pub side: Side,
    /// The assigned uniform number.
    pub number: u8,
    /// The starting play mode token.
    pub play_mode: String,
}

/// Decode `(init <side> <number> <mode>)`; trailing content after the
/// closing paren is ignored.
///
/// # Errors
///
/// Any structural violation is a [`DecodeError`]. During the handshake the
/// driver escalates it to a fatal failure — the agent cannot guess its
/// side or number.
pub fn decode_init(text: &str) -> Result<InitAck, DecodeError> {
    let malformed = || DecodeError::MalformedInit(text.to_string());
    let rest = text.strip_prefix("(init ").ok_or_else(malformed)?;

    let (side_token, rest) = rest.split_once(' ').ok_or_else(malformed)?;
    let side = match side_token {
        "l" => Side::Left,
        "r" => Side::Right,
        other => return Err(DecodeError::InvalidSide(other.to_string())),
    };

    let (number_token, rest) = rest.split_once(' ').ok_or_else(malformed)?;
    if number_token.is_empty()
        || number_token.len() > 2
        || !number_token.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(DecodeError::InvalidUniformNumber(number_token.to_string()));
    }
    let number: u8 = number_token
        .parse()
        .map_err(|_| DecodeError::InvalidUniformNumber(number_token.to_string()))?;

    let mode = rest.split(')').next().ok_or_else(malformed)?;
    if mode.is_empty() || !rest.contains(')') || mode.chars().any(char::is_whitespace) {
        return Err(malformed());
    }

    Ok(InitAck {
        side,
        number,
        play_mode: mode.to_string(),
    })
}

/// Decode `(hear <time> <sender> <utterance>)`.
///
/// The utterance is the remainder of the message up to the final closing
/// paren, sliced rather than re-tokenized, so it may itself contain nested
/// parentheses. A single pair of surrounding double quotes is removed.
///
/// Returns `Ok(None)` when the sender is `self`: the agent's own voice is
/// dropped, never forwarded.
///
/// # Errors
///
/// Structural violations and a sender that is neither `referee`, `self`,
/// nor a uniform number are [`DecodeError`]s.
pub fn decode_hear(text: &str) -> Result<Option<HeardEvent>, DecodeError> {
    let malformed = || DecodeError::MalformedHear(text.to_string());
    let rest = text.strip_prefix("(hear ").ok_or_else(malformed)?;

    let (time_token, rest) = rest.split_once(' ').ok_or_else(malformed)?;
    let time: u32 = time_token
        .parse()
        .map_err(|_| DecodeError::InvalidTime(time_token.to_string()))?;

    let (sender_token, rest) = rest.split_once(' ').ok_or_else(malformed)?;
    let source = match sender_token {
        "referee" => HeardSource::Referee,
        "self" => return Ok(None),
        other => other
            .parse::<u32>()
            .map(HeardSource::Player)
            .map_err(|_| DecodeError::InvalidSender(other.to_string()))?,
    };

    let end = rest.rfind(')').ok_or_else(malformed)?;
    let utterance = &rest[..end];
    let text = utterance
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(utterance);

    Ok(Some(HeardEvent {
        time,
        source,
        text: text.to_string(),
    }))
}
