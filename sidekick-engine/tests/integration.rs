//! Integration tests for the agent loop driver, using a scripted transport
//! and brain instead of a live server.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sidekick_engine::{AgentLoop, ClientConfig, Phase};
use sidekick_types::{
    Brain, Datagram, EngineError, Event, HeardEvent, HeardSource, Intent, Report, ReportSink,
    Side, TeamName, Transport, TransportError,
};

/// What a scripted transport does once its inbound queue is empty.
#[derive(Debug, Clone, Copy)]
enum OnEmpty {
    /// Return `TransportError::Closed`, as a deliberately shut down socket
    /// would.
    Close,
    /// Await forever, as an idle socket would.
    Pend,
    /// Return an unexpected I/O error.
    Fail,
}

/// A transport that replays a fixed inbound script and records every send.
struct ScriptedTransport {
    inbound: VecDeque<Vec<u8>>,
    reply_from: SocketAddr,
    on_empty: OnEmpty,
    sent: Arc<Mutex<Vec<(String, SocketAddr)>>>,
    /// Sends at or beyond this index fail; `usize::MAX` disables failures.
    fail_sends_from: usize,
}

impl ScriptedTransport {
    fn new(inbound: Vec<&[u8]>, on_empty: OnEmpty) -> (Self, Arc<Mutex<Vec<(String, SocketAddr)>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                inbound: inbound.into_iter().map(<[u8]>::to_vec).collect(),
                reply_from: reply_addr(),
                on_empty,
                sent: sent.clone(),
                fail_sends_from: usize::MAX,
            },
            sent,
        )
    }
}

impl Transport for ScriptedTransport {
    async fn recv(&mut self) -> Result<Datagram, TransportError> {
        match self.inbound.pop_front() {
            Some(payload) => Ok(Datagram {
                payload,
                from: self.reply_from,
            }),
            None => match self.on_empty {
                OnEmpty::Close => Err(TransportError::Closed),
                OnEmpty::Pend => std::future::pending().await,
                OnEmpty::Fail => Err(TransportError::Io(std::io::Error::other(
                    "receive buffer torn down",
                ))),
            },
        }
    }

    async fn send_to(&mut self, payload: &[u8], peer: SocketAddr) -> Result<(), TransportError> {
        let mut sent = self.sent.lock().expect("test lock poisoned");
        let index = sent.len();
        sent.push((String::from_utf8_lossy(payload).into_owned(), peer));
        if index >= self.fail_sends_from {
            return Err(TransportError::Io(std::io::Error::other("send refused")));
        }
        Ok(())
    }
}

/// A brain that records every event and replays pre-configured intent
/// batches in sequence; once exhausted it returns no intents.
struct ScriptedBrain {
    responses: VecDeque<Vec<Intent>>,
    events: Arc<Mutex<Vec<Event>>>,
}

impl ScriptedBrain {
    fn new(responses: Vec<Vec<Intent>>) -> (Self, Arc<Mutex<Vec<Event>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                responses: responses.into(),
                events: events.clone(),
            },
            events,
        )
    }
}

impl Brain for ScriptedBrain {
    async fn decide(&mut self, event: Event) -> Vec<Intent> {
        self.events.lock().expect("test lock poisoned").push(event);
        self.responses.pop_front().unwrap_or_default()
    }
}

/// A sink that captures every report for later assertion.
#[derive(Clone)]
struct RecordingSink {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl RecordingSink {
    fn new() -> (Self, Arc<Mutex<Vec<Report>>>) {
        let reports = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                reports: reports.clone(),
            },
            reports,
        )
    }
}

impl ReportSink for RecordingSink {
    fn report(&self, report: &Report) {
        self.reports
            .lock()
            .expect("test lock poisoned")
            .push(report.clone());
    }
}

fn reply_addr() -> SocketAddr {
    "127.0.0.1:7007".parse().expect("addr")
}

fn configured_addr() -> SocketAddr {
    "127.0.0.1:6000".parse().expect("addr")
}

fn test_config() -> ClientConfig {
    let team = TeamName::new("Falcons").expect("valid name");
    let mut config = ClientConfig::new("127.0.0.1", 6000, team);
    config.handshake_timeout = Duration::from_millis(200);
    config
}

const ACK: &[u8] = b"(init l 7 before_kick_off)";

#[tokio::test]
async fn handshake_activates_session_and_redirects_sends() {
    let (transport, sent) = ScriptedTransport::new(vec![ACK], OnEmpty::Close);
    let (brain, events) = ScriptedBrain::new(vec![vec![Intent::Move { x: -10.0, y: 0.0 }]]);

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.run().await.expect("clean run");

    let session = agent.session();
    assert_eq!(session.side(), Some(Side::Left));
    assert_eq!(session.number(), Some(7));
    assert_eq!(session.play_mode(), Some("before_kick_off"));
    assert_eq!(session.peer(), Some(reply_addr()));

    let sent = sent.lock().expect("lock");
    // The init command goes to the configured endpoint; everything after
    // the ack goes to the ack's source address.
    assert_eq!(sent[0], ("(init Falcons (version 9))".to_string(), configured_addr()));
    assert_eq!(sent[1], ("(move -10 0)".to_string(), reply_addr()));

    let events = events.lock().expect("lock");
    assert_eq!(
        events[0],
        Event::InitConfirmed {
            side: Side::Left,
            number: 7,
            play_mode: "before_kick_off".to_string(),
        }
    );
}

#[tokio::test]
async fn referee_hear_reaches_brain_and_updates_play_mode() {
    let (transport, _sent) =
        ScriptedTransport::new(vec![ACK, b"(hear 120 referee kick_off_l)"], OnEmpty::Close);
    let (brain, events) = ScriptedBrain::new(vec![]);

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.run().await.expect("clean run");

    let events = events.lock().expect("lock");
    assert_eq!(
        events[1],
        Event::Heard(HeardEvent {
            time: 120,
            source: HeardSource::Referee,
            text: "kick_off_l".to_string(),
        })
    );
    // Referee announcements pass through into the session's play mode.
    assert_eq!(agent.session().play_mode(), Some("kick_off_l"));
}

#[tokio::test]
async fn player_hear_reaches_brain() {
    let (transport, _sent) =
        ScriptedTransport::new(vec![ACK, b"(hear 55 3 \"pass to me\")"], OnEmpty::Close);
    let (brain, events) = ScriptedBrain::new(vec![]);

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.run().await.expect("clean run");

    let events = events.lock().expect("lock");
    assert_eq!(
        events[1],
        Event::Heard(HeardEvent {
            time: 55,
            source: HeardSource::Player(3),
            text: "pass to me".to_string(),
        })
    );
}

#[tokio::test]
async fn own_voice_never_reaches_brain() {
    let (transport, _sent) =
        ScriptedTransport::new(vec![ACK, b"(hear 10 self nice shot)"], OnEmpty::Close);
    let (brain, events) = ScriptedBrain::new(vec![]);
    let (sink, reports) = RecordingSink::new();

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.add_sink(sink);
    agent.run().await.expect("clean run");

    // Dropped, not errored: only the init confirmation reached the brain.
    assert_eq!(events.lock().expect("lock").len(), 1);
    assert!(reports.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn visual_and_body_percepts_pass_through_raw() {
    let (transport, _sent) = ScriptedTransport::new(
        vec![ACK, b"(see 30 ((b) 12.4 7))", b"(sense_body 30 (stamina 4000 1))"],
        OnEmpty::Close,
    );
    let (brain, events) = ScriptedBrain::new(vec![]);

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.run().await.expect("clean run");

    let events = events.lock().expect("lock");
    assert_eq!(
        events[1],
        Event::Visual {
            payload: "(see 30 ((b) 12.4 7))".to_string(),
        }
    );
    assert_eq!(
        events[2],
        Event::Body {
            payload: "(sense_body 30 (stamina 4000 1))".to_string(),
        }
    );
}

#[tokio::test]
async fn bye_terminates_after_its_send() {
    let (transport, sent) = ScriptedTransport::new(
        vec![
            ACK,
            b"(hear 1 referee time_up)",
            // Never reached: the loop must exit after the bye.
            b"(hear 2 referee foul)",
        ],
        OnEmpty::Pend,
    );
    let (brain, events) = ScriptedBrain::new(vec![
        vec![],
        vec![
            Intent::Say {
                message: "bye".to_string(),
            },
            Intent::Bye,
        ],
    ]);

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.run().await.expect("clean run");

    assert_eq!(agent.session().phase(), Phase::Terminated);
    let sent = sent.lock().expect("lock");
    assert_eq!(sent.last().expect("sent commands").0, "(bye)");
    // The second hear message was never dispatched.
    assert_eq!(events.lock().expect("lock").len(), 2);
}

#[tokio::test]
async fn unrecognized_kind_is_silently_ignored() {
    let (transport, _sent) =
        ScriptedTransport::new(vec![ACK, b"(fullstate 0 ((pmode play_on)))"], OnEmpty::Close);
    let (brain, events) = ScriptedBrain::new(vec![]);
    let (sink, reports) = RecordingSink::new();

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.add_sink(sink);
    agent.run().await.expect("clean run");

    assert_eq!(events.lock().expect("lock").len(), 1);
    assert!(reports.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn decode_failure_is_reported_and_loop_continues() {
    let (transport, _sent) = ScriptedTransport::new(
        vec![ACK, b"(hear 10 coach mark_them)", b"(hear 11 referee foul)"],
        OnEmpty::Close,
    );
    let (brain, events) = ScriptedBrain::new(vec![]);
    let (sink, reports) = RecordingSink::new();

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.add_sink(sink);
    agent.run().await.expect("clean run");

    let reports = reports.lock().expect("lock");
    assert_eq!(reports.len(), 1);
    assert!(matches!(&reports[0], Report::DecodeFailed { .. }));

    // The next message was still dispatched.
    let events = events.lock().expect("lock");
    assert_eq!(
        events[1],
        Event::Heard(HeardEvent {
            time: 11,
            source: HeardSource::Referee,
            text: "foul".to_string(),
        })
    );
}

#[tokio::test]
async fn non_init_first_message_fails_the_handshake() {
    let (transport, _sent) =
        ScriptedTransport::new(vec![b"(hear 1 referee foul)"], OnEmpty::Close);
    let (brain, events) = ScriptedBrain::new(vec![]);

    let mut agent = AgentLoop::new(brain, transport, test_config());
    let err = agent.run().await.expect_err("handshake must fail");
    assert!(matches!(err, EngineError::HandshakeFailed { .. }));
    assert_ne!(agent.session().phase(), Phase::Active);
    assert!(events.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn malformed_init_fails_the_handshake() {
    let (transport, _sent) =
        ScriptedTransport::new(vec![b"(init q 7 before_kick_off)"], OnEmpty::Close);
    let (brain, _events) = ScriptedBrain::new(vec![]);

    let mut agent = AgentLoop::new(brain, transport, test_config());
    let err = agent.run().await.expect_err("handshake must fail");
    match err {
        EngineError::HandshakeFailed { reason } => {
            assert!(reason.contains("invalid side"), "unexpected reason: {reason}");
        }
        other => panic!("expected HandshakeFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn absent_ack_times_out() {
    let (transport, _sent) = ScriptedTransport::new(vec![], OnEmpty::Pend);
    let (brain, _events) = ScriptedBrain::new(vec![]);

    let mut config = test_config();
    config.handshake_timeout = Duration::from_millis(50);
    let mut agent = AgentLoop::new(brain, transport, config);
    let err = agent.run().await.expect_err("handshake must time out");
    assert!(matches!(err, EngineError::HandshakeTimeout(_)));
}

#[tokio::test]
async fn send_failure_is_reported_but_not_fatal() {
    let (mut transport, sent) =
        ScriptedTransport::new(vec![ACK, b"(hear 5 referee play_on)"], OnEmpty::Close);
    // Let the init command through, fail everything after it.
    transport.fail_sends_from = 1;
    let (brain, events) = ScriptedBrain::new(vec![vec![], vec![Intent::Dash { power: 80.0 }]]);
    let (sink, reports) = RecordingSink::new();

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.add_sink(sink);
    agent.run().await.expect("send failures are survivable");

    assert_eq!(sent.lock().expect("lock").len(), 2);
    let reports = reports.lock().expect("lock");
    assert_eq!(reports.len(), 1);
    assert!(matches!(&reports[0], Report::SendFailed { .. }));
    // Both events were still dispatched.
    assert_eq!(events.lock().expect("lock").len(), 2);
}

#[tokio::test]
async fn unexpected_receive_failure_is_fatal_and_reported() {
    let (transport, _sent) = ScriptedTransport::new(vec![ACK], OnEmpty::Fail);
    let (brain, _events) = ScriptedBrain::new(vec![]);
    let (sink, reports) = RecordingSink::new();

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.add_sink(sink);
    let err = agent.run().await.expect_err("receive failure is fatal");
    assert!(matches!(err, EngineError::Transport(_)));
    assert!(matches!(
        reports.lock().expect("lock").as_slice(),
        [Report::ReceiveFailed { .. }]
    ));
    assert_eq!(agent.session().phase(), Phase::Terminated);
}

#[tokio::test]
async fn cancellation_exits_cleanly() {
    let (transport, _sent) = ScriptedTransport::new(vec![ACK], OnEmpty::Pend);
    let (brain, _events) = ScriptedBrain::new(vec![]);

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.cancellation_token().cancel();
    agent.run().await.expect("cancellation is a clean exit");
    assert_eq!(agent.session().phase(), Phase::Terminated);
}

#[tokio::test]
async fn cancellation_during_handshake_is_honored_promptly() {
    let (transport, sent) = ScriptedTransport::new(vec![], OnEmpty::Pend);
    let (brain, events) = ScriptedBrain::new(vec![]);

    // A generous timeout: if the ack wait ignored the token, this test
    // would hang a minute instead of exiting at once.
    let mut config = test_config();
    config.handshake_timeout = Duration::from_secs(60);
    let mut agent = AgentLoop::new(brain, transport, config);
    agent.cancellation_token().cancel();
    agent.run().await.expect("cancellation is a clean exit");

    assert_eq!(agent.session().phase(), Phase::Terminated);
    // The init command went out, but no event ever reached the brain.
    assert_eq!(sent.lock().expect("lock").len(), 1);
    assert!(events.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn transport_close_exits_cleanly() {
    let (transport, _sent) = ScriptedTransport::new(vec![ACK], OnEmpty::Close);
    let (brain, _events) = ScriptedBrain::new(vec![]);

    let mut agent = AgentLoop::new(brain, transport, test_config());
    agent.run().await.expect("closure is a clean exit");
    assert_eq!(agent.session().phase(), Phase::Terminated);
}
