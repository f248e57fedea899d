//! The agent loop driver.
//!
//! Orchestrates one session: handshake, then receive → classify → decode →
//! dispatch → encode → send, one cycle at a time with no overlap. The
//! server paces messages at the simulation's cycle rate; an agent that
//! falls behind simply processes the next available datagram.

use std::net::SocketAddr;
use std::ops::ControlFlow;

use tokio_util::sync::CancellationToken;

use sidekick_types::{
    Brain, ConfigError, EngineError, Event, HeardSource, Intent, MessageKind, RawMessage, Report,
    ReportSink, TracingSink, Transport, TransportError,
};
use sidekick_wire::{InitAck, classify, decode_hear, decode_init, encode_init, encode_intent};

use crate::config::ClientConfig;
use crate::session::Session;

/// The per-session control loop: drives transport, session, and brain.
///
/// Generic over `B: Brain` (the decision collaborator) and `T: Transport`
/// (the datagram channel), so both can be scripted in tests. Report sinks
/// are type-erased and optional; a [`TracingSink`] is installed by default.
pub struct AgentLoop<B: Brain, T: Transport> {
    brain: B,
    transport: T,
    session: Session,
    config: ClientConfig,
    sinks: Vec<Box<dyn ReportSink>>,
    cancel: CancellationToken,
}

impl<B: Brain, T: Transport> AgentLoop<B, T> {
    /// Create a loop for one session.
    #[must_use]
    pub fn new(brain: B, transport: T, config: ClientConfig) -> Self {
        let session = Session::new(config.team.clone());
        Self {
            brain,
            transport,
            session,
            config,
            sinks: vec![Box::new(TracingSink)],
            cancel: CancellationToken::new(),
        }
    }

    /// Add a report sink. Sinks are called in registration order for every
    /// non-fatal report.
    pub fn add_sink<S: ReportSink + 'static>(&mut self, sink: S) -> &mut Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// A token that, when cancelled, makes the loop exit cleanly at the
    /// next receive. This is the deliberate shutdown mechanism.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The session this loop drives.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a reference to the current configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Join the match and run the receive/act loop until the brain leaves,
    /// the transport closes, or the loop is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::HandshakeFailed`] or
    /// [`EngineError::HandshakeTimeout`] when no usable init ack arrives —
    /// fatal, because proceeding with unknown side and number would corrupt
    /// every downstream coordinate. Returns [`EngineError::Transport`] when
    /// the receive side fails unexpectedly mid-match. Deliberate shutdown
    /// (cancellation or a closed transport) is a clean `Ok(())`.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        let endpoint = self.config.server_endpoint();
        let server = tokio::net::lookup_host(&endpoint)
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ConfigError::UnresolvableServer(endpoint))?;

        let Some((peer, ack)) = self.handshake(server).await? else {
            return Ok(());
        };
        let confirmed = Event::InitConfirmed {
            side: ack.side,
            number: ack.number,
            play_mode: ack.play_mode,
        };
        if self.act(confirmed, peer).await.is_break() {
            return Ok(());
        }

        loop {
            let cancel = self.cancel.clone();
            let received = tokio::select! {
                () = cancel.cancelled() => None,
                received = self.transport.recv() => Some(received),
            };
            let datagram = match received {
                None => {
                    tracing::debug!("shutdown requested; leaving the loop");
                    self.session.terminate();
                    return Ok(());
                }
                Some(Err(TransportError::Closed)) => {
                    tracing::debug!("transport closed; leaving the loop");
                    self.session.terminate();
                    return Ok(());
                }
                Some(Err(error)) => {
                    self.report(Report::ReceiveFailed {
                        detail: error.to_string(),
                    });
                    self.session.terminate();
                    return Err(error.into());
                }
                Some(Ok(datagram)) => datagram,
            };

            let raw = RawMessage::new(datagram.payload);
            if self.handle_message(&raw, peer).await.is_break() {
                return Ok(());
            }
        }
    }

    /// Send the init command and consume the ack.
    ///
    /// The ack's source address becomes the fixed destination for all
    /// subsequent sends — the server acks from a session-specific port.
    /// Returns `Ok(None)` when the loop is cancelled while waiting for
    /// the ack; cancellation is honored here just as in the main loop.
    async fn handshake(
        &mut self,
        server: SocketAddr,
    ) -> Result<Option<(SocketAddr, InitAck)>, EngineError> {
        self.session.begin_handshake()?;
        let command = encode_init(&self.config.team, self.config.protocol_version);
        self.transport.send_to(command.as_bytes(), server).await?;
        tracing::debug!(%server, team = %self.config.team, "init sent; awaiting ack");

        let cancel = self.cancel.clone();
        let outcome = tokio::select! {
            () = cancel.cancelled() => None,
            outcome = tokio::time::timeout(self.config.handshake_timeout, self.transport.recv()) => {
                Some(outcome)
            }
        };
        let received = match outcome {
            None => {
                tracing::debug!("shutdown requested during the handshake");
                self.session.terminate();
                return Ok(None);
            }
            Some(outcome) => outcome
                .map_err(|_| EngineError::HandshakeTimeout(self.config.handshake_timeout))??,
        };

        let raw = RawMessage::new(received.payload);
        let classified = classify(&raw.payload);
        if classified.kind != MessageKind::Init {
            return Err(EngineError::HandshakeFailed {
                reason: format!(
                    "expected init ack, got {:?}: {:?}",
                    classified.kind, classified.text
                ),
            });
        }
        let ack = decode_init(classified.text).map_err(|error| EngineError::HandshakeFailed {
            reason: error.to_string(),
        })?;
        self.session.activate(&ack, received.from)?;
        tracing::info!(
            side = ack.side.as_str(),
            number = ack.number,
            mode = %ack.play_mode,
            "joined the match"
        );
        Ok(Some((received.from, ack)))
    }

    /// Classify and decode one message, dispatching any resulting event.
    async fn handle_message(&mut self, raw: &RawMessage, peer: SocketAddr) -> ControlFlow<()> {
        let classified = classify(&raw.payload);
        match classified.kind {
            MessageKind::Visual => {
                let payload = classified.text.to_string();
                self.act(Event::Visual { payload }, peer).await
            }
            MessageKind::Body => {
                let payload = classified.text.to_string();
                self.act(Event::Body { payload }, peer).await
            }
            MessageKind::Heard => match decode_hear(classified.text) {
                Ok(Some(event)) => {
                    if event.source == HeardSource::Referee {
                        self.session.note_play_mode(&event.text);
                    }
                    self.act(Event::Heard(event), peer).await
                }
                // The agent's own voice: dropped, never forwarded.
                Ok(None) => ControlFlow::Continue(()),
                Err(error) => {
                    self.report(Report::DecodeFailed {
                        kind: MessageKind::Heard,
                        error,
                    });
                    ControlFlow::Continue(())
                }
            },
            MessageKind::Init => {
                // The handshake already consumed its ack; a stray init is
                // not a percept.
                tracing::debug!("ignoring init message outside the handshake");
                ControlFlow::Continue(())
            }
            // Unrecognized kinds are not an error: the protocol may grow
            // message kinds the agent does not need.
            _ => {
                tracing::debug!(len = raw.payload.len(), "ignoring unrecognized message");
                ControlFlow::Continue(())
            }
        }
    }

    /// Hand one event to the brain and send the resulting commands.
    ///
    /// A failed send is reported and the match continues — the protocol
    /// tolerates loss. Bye terminates the session and breaks the loop
    /// after its send.
    async fn act(&mut self, event: Event, peer: SocketAddr) -> ControlFlow<()> {
        let intents = self.brain.decide(event).await;
        for intent in intents {
            let command = encode_intent(&intent);
            if let Err(error) = self.transport.send_to(command.as_bytes(), peer).await {
                self.report(Report::SendFailed {
                    detail: error.to_string(),
                });
            }
            if matches!(intent, Intent::Bye) {
                tracing::info!("leaving the match");
                self.session.terminate();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Deliver one report to every sink, in registration order.
    fn report(&self, report: Report) {
        for sink in &self.sinks {
            sink.report(&report);
        }
    }
}
