//! The session state machine.
//!
//! `Unregistered → AwaitingInitAck → Active → Terminated`, with side,
//! number, and peer address set exactly once during the handshake.
//! Terminated is terminal.

use std::net::SocketAddr;

use sidekick_types::{EngineError, Side, TeamName};
use sidekick_wire::InitAck;

/// Connection phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed; nothing sent yet.
    Unregistered,
    /// Init command sent; waiting for the ack.
    AwaitingInitAck,
    /// Identity established; the receive/act loop is running.
    Active,
    /// Left the match or lost the transport. No transitions out.
    Terminated,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Unregistered => "Unregistered",
            Phase::AwaitingInitAck => "AwaitingInitAck",
            Phase::Active => "Active",
            Phase::Terminated => "Terminated",
        }
    }
}

/// One agent's session with the server.
///
/// Decoders never touch this; the loop driver applies their results.
#[derive(Debug, Clone)]
pub struct Session {
    team: TeamName,
    phase: Phase,
    side: Option<Side>,
    number: Option<u8>,
    play_mode: Option<String>,
    peer: Option<SocketAddr>,
}

impl Session {
    /// A fresh, unregistered session for the given team.
    #[must_use]
    pub fn new(team: TeamName) -> Self {
        Self {
            team,
            phase: Phase::Unregistered,
            side: None,
            number: None,
            play_mode: None,
            peer: None,
        }
    }

    /// The team this session joins.
    #[must_use]
    pub fn team(&self) -> &TeamName {
        &self.team
    }

    /// Current connection phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Assigned side; set once the handshake completes.
    #[must_use]
    pub fn side(&self) -> Option<Side> {
        self.side
    }

    /// Assigned uniform number; set once the handshake completes.
    #[must_use]
    pub fn number(&self) -> Option<u8> {
        self.number
    }

    /// The latest play mode the server reported.
    #[must_use]
    pub fn play_mode(&self) -> Option<&str> {
        self.play_mode.as_deref()
    }

    /// The server's session-specific address, fixed by the handshake.
    #[must_use]
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Record that the init command went out.
    pub(crate) fn begin_handshake(&mut self) -> Result<(), EngineError> {
        if self.phase != Phase::Unregistered {
            return Err(EngineError::InvalidTransition {
                transition: "begin_handshake",
                phase: self.phase.as_str(),
            });
        }
        self.phase = Phase::AwaitingInitAck;
        Ok(())
    }

    /// Apply a decoded init ack: record identity and the peer address the
    /// ack came from, which becomes the destination for every later send.
    pub(crate) fn activate(&mut self, ack: &InitAck, peer: SocketAddr) -> Result<(), EngineError> {
        if self.phase != Phase::AwaitingInitAck {
            return Err(EngineError::InvalidTransition {
                transition: "activate",
                phase: self.phase.as_str(),
            });
        }
        self.phase = Phase::Active;
        self.side = Some(ack.side);
        self.number = Some(ack.number);
        self.play_mode = Some(ack.play_mode.clone());
        self.peer = Some(peer);
        Ok(())
    }

    /// Record a server-reported play mode change. Passthrough only; the
    /// token is server-defined and not interpreted here.
    pub(crate) fn note_play_mode(&mut self, mode: &str) {
        if self.phase == Phase::Active {
            self.play_mode = Some(mode.to_string());
        }
    }

    /// Enter the terminal phase.
    pub(crate) fn terminate(&mut self) {
        self.phase = Phase::Terminated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidekick_types::Side;

    fn session() -> Session {
        Session::new(TeamName::new("Falcons").expect("valid name"))
    }

    fn ack() -> InitAck {
        InitAck {
            side: Side::Left,
            number: 7,
            play_mode: "before_kick_off".to_string(),
        }
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:7000".parse().expect("addr")
    }

    #[test]
    fn handshake_walks_the_phases_in_order() {
        let mut session = session();
        assert_eq!(session.phase(), Phase::Unregistered);

        session.begin_handshake().expect("first handshake");
        assert_eq!(session.phase(), Phase::AwaitingInitAck);

        session.activate(&ack(), peer()).expect("activation");
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.side(), Some(Side::Left));
        assert_eq!(session.number(), Some(7));
        assert_eq!(session.play_mode(), Some("before_kick_off"));
        assert_eq!(session.peer(), Some(peer()));
    }

    #[test]
    fn activation_requires_a_pending_handshake() {
        let mut session = session();
        assert!(matches!(
            session.activate(&ack(), peer()),
            Err(EngineError::InvalidTransition { transition: "activate", .. })
        ));
    }

    #[test]
    fn identity_is_set_exactly_once() {
        let mut session = session();
        session.begin_handshake().expect("handshake");
        session.activate(&ack(), peer()).expect("activation");
        assert!(session.activate(&ack(), peer()).is_err());
        assert!(session.begin_handshake().is_err());
    }

    #[test]
    fn terminated_is_terminal() {
        let mut session = session();
        session.begin_handshake().expect("handshake");
        session.activate(&ack(), peer()).expect("activation");
        session.terminate();
        assert_eq!(session.phase(), Phase::Terminated);
        assert!(session.begin_handshake().is_err());
        assert!(session.activate(&ack(), peer()).is_err());
    }

    #[test]
    fn play_mode_updates_only_while_active() {
        let mut session = session();
        session.note_play_mode("play_on");
        assert_eq!(session.play_mode(), None);

        session.begin_handshake().expect("handshake");
        session.activate(&ack(), peer()).expect("activation");
        session.note_play_mode("kick_off_l");
        assert_eq!(session.play_mode(), Some("kick_off_l"));
    }
}
