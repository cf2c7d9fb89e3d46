//! Driver actor: one Tokio task that owns the hub, the peer session and
//! the in-flight advisor requests.
//!
//! The front end talks to it through a [`ParlorHandle`] and listens on an
//! [`Update`] channel. Nothing else touches the hub, so local input, peer
//! messages and advisor answers are applied one at a time, in the order
//! the task picks them up.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use parlor_protocol::{PeerMessage, Profile};
use parlor_session::{PeerSession, SessionError, SessionEvent, SessionEvents};
use parlor_transport::Connection;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    AdvisorError, BidAdvisor, BidSuggestion, ChatEntry, GameHub, GameKind, GameMode,
    MoveAdvisor, MoveSuggestion, Notice, ParlorConfig, ParlorError, Ticket, consult,
};

/// Something the front end should redraw or show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// The hub changed. Fetch a [`ParlorHandle::snapshot`] to redraw.
    Changed { epoch: u64 },
    Notice(Notice),
    Chat(ChatEntry),
}

type Reply<T> = oneshot::Sender<Result<T, ParlorError>>;

/// Commands sent to the driver through its channel.
enum Command<C: Connection> {
    PlaceStone { x: usize, y: usize, reply: Reply<()> },
    DiceSetup { ai_count: usize, reply: Reply<()> },
    DiceBid { quantity: u32, face: u8, reply: Reply<()> },
    DiceCall { reply: Reply<()> },
    DiceNextRound { reply: Reply<()> },
    Restart { reply: Reply<()> },
    Chat { content: String, is_sticker: bool, reply: Reply<()> },
    SwitchMode { mode: GameMode, reply: Reply<()> },
    SwitchGame { game: GameKind, reply: Reply<()> },
    SetProfile { profile: Profile, reply: Reply<()> },
    /// Hand over a session that finished its handshake.
    Attach {
        session: PeerSession<C>,
        events: SessionEvents,
        reply: Reply<()>,
    },
    Snapshot { reply: oneshot::Sender<GameHub> },
    Shutdown,
}

// ---------------------------------------------------------------------------
// ParlorHandle
// ---------------------------------------------------------------------------

/// Handle to a running driver. Cheap to clone.
pub struct ParlorHandle<C: Connection> {
    sender: mpsc::Sender<Command<C>>,
}

impl<C: Connection> Clone for ParlorHandle<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C: Connection> ParlorHandle<C> {
    pub async fn place_stone(&self, x: usize, y: usize) -> Result<(), ParlorError> {
        self.request(|reply| Command::PlaceStone { x, y, reply }).await
    }

    pub async fn dice_setup(&self, ai_count: usize) -> Result<(), ParlorError> {
        self.request(|reply| Command::DiceSetup { ai_count, reply })
            .await
    }

    pub async fn dice_bid(&self, quantity: u32, face: u8) -> Result<(), ParlorError> {
        self.request(|reply| Command::DiceBid {
            quantity,
            face,
            reply,
        })
        .await
    }

    pub async fn dice_call(&self) -> Result<(), ParlorError> {
        self.request(|reply| Command::DiceCall { reply }).await
    }

    pub async fn dice_next_round(&self) -> Result<(), ParlorError> {
        self.request(|reply| Command::DiceNextRound { reply }).await
    }

    pub async fn restart(&self) -> Result<(), ParlorError> {
        self.request(|reply| Command::Restart { reply }).await
    }

    pub async fn send_chat(
        &self,
        content: impl Into<String>,
        is_sticker: bool,
    ) -> Result<(), ParlorError> {
        let content = content.into();
        self.request(|reply| Command::Chat {
            content,
            is_sticker,
            reply,
        })
        .await
    }

    /// Switches to an offline mode. Leaving online play closes the session.
    pub async fn switch_mode(&self, mode: GameMode) -> Result<(), ParlorError> {
        self.request(|reply| Command::SwitchMode { mode, reply }).await
    }

    pub async fn switch_game(&self, game: GameKind) -> Result<(), ParlorError> {
        self.request(|reply| Command::SwitchGame { game, reply }).await
    }

    pub async fn set_profile(&self, profile: Profile) -> Result<(), ParlorError> {
        self.request(|reply| Command::SetProfile { profile, reply })
            .await
    }

    /// Starts online play over a connected session. Any earlier session
    /// is closed first.
    pub async fn attach(
        &self,
        session: PeerSession<C>,
        events: SessionEvents,
    ) -> Result<(), ParlorError> {
        self.request(|reply| Command::Attach {
            session,
            events,
            reply,
        })
        .await
    }

    /// A detached copy of the hub as it is right now.
    pub async fn snapshot(&self) -> Result<GameHub, ParlorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Command::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| ParlorError::DriverStopped)?;
        reply_rx.await.map_err(|_| ParlorError::DriverStopped)
    }

    /// Tells the driver to close any session and stop.
    pub async fn shutdown(&self) -> Result<(), ParlorError> {
        self.sender
            .send(Command::Shutdown)
            .await
            .map_err(|_| ParlorError::DriverStopped)
    }

    async fn request(
        &self,
        make: impl FnOnce(Reply<()>) -> Command<C>,
    ) -> Result<(), ParlorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| ParlorError::DriverStopped)?;
        reply_rx.await.map_err(|_| ParlorError::DriverStopped)?
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// An advisor answer, tagged with the ticket it was requested under.
enum Advice {
    Move(Ticket, Result<MoveSuggestion, AdvisorError>),
    Bid(Ticket, Result<BidSuggestion, AdvisorError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Move(Ticket),
    Bid(Ticket),
}

/// What woke the driver up.
enum Step<C: Connection> {
    Command(Option<Command<C>>),
    Session(Option<SessionEvent>),
    Advice(Advice),
}

struct Driver<C: Connection, M, B> {
    hub: GameHub,
    session: Option<PeerSession<C>>,
    events: Option<SessionEvents>,

    move_advisor: Arc<M>,
    bid_advisor: Arc<B>,
    advisor_timeout: Duration,
    in_flight: Option<InFlight>,
    advice_tx: mpsc::UnboundedSender<Advice>,
    advice_rx: mpsc::UnboundedReceiver<Advice>,

    receiver: mpsc::Receiver<Command<C>>,
    updates: mpsc::UnboundedSender<Update>,
    chat_seen: usize,
}

impl<C, M, B> Driver<C, M, B>
where
    C: Connection,
    M: MoveAdvisor,
    B: BidAdvisor,
{
    async fn run(mut self) {
        info!(mode = %self.hub.mode(), game = %self.hub.game(), "parlor driver started");

        loop {
            self.request_advice();

            let step = tokio::select! {
                cmd = self.receiver.recv() => Step::Command(cmd),
                event = next_event(&mut self.events) => Step::Session(event),
                Some(advice) = self.advice_rx.recv() => Step::Advice(advice),
            };

            match step {
                Step::Command(Some(Command::Shutdown)) | Step::Command(None) => break,
                Step::Command(Some(cmd)) => self.handle_command(cmd).await,
                Step::Session(event) => self.handle_session_event(event).await,
                Step::Advice(advice) => self.handle_advice(advice),
            }
            self.publish();
        }

        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close().await {
                debug!(error = %e, "closing session on shutdown");
            }
        }
        info!("parlor driver stopped");
    }

    async fn handle_command(&mut self, cmd: Command<C>) {
        match cmd {
            Command::PlaceStone { x, y, reply } => {
                let result = self.act(|hub| hub.place_stone(x, y)).await;
                let _ = reply.send(result);
            }
            Command::DiceSetup { ai_count, reply } => {
                let result = self.act(|hub| hub.dice_setup(ai_count)).await;
                let _ = reply.send(result);
            }
            Command::DiceBid {
                quantity,
                face,
                reply,
            } => {
                let result = self.act(|hub| hub.dice_bid(quantity, face)).await;
                let _ = reply.send(result);
            }
            Command::DiceCall { reply } => {
                let result = self.act(GameHub::dice_call).await;
                let _ = reply.send(result);
            }
            Command::DiceNextRound { reply } => {
                let result = self.act(GameHub::dice_next_round).await;
                let _ = reply.send(result);
            }
            Command::Restart { reply } => {
                let result = self.act(GameHub::restart).await;
                let _ = reply.send(result);
            }
            Command::Chat {
                content,
                is_sticker,
                reply,
            } => {
                let result = self.act(|hub| hub.send_chat(content, is_sticker)).await;
                let _ = reply.send(result);
            }
            Command::SwitchMode { mode, reply } => {
                let result = self.switch_mode(mode).await;
                let _ = reply.send(result);
            }
            Command::SwitchGame { game, reply } => {
                let result = self.act(|hub| hub.switch_game(game)).await;
                let _ = reply.send(result);
            }
            Command::SetProfile { profile, reply } => {
                let result = self.set_profile(profile).await;
                let _ = reply.send(result);
            }
            Command::Attach {
                session,
                events,
                reply,
            } => {
                let result = self.attach(session, events).await;
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.hub.clone());
            }
            Command::Shutdown => {}
        }
    }

    /// Applies a local action and forwards its outbox to the peer.
    async fn act(
        &mut self,
        action: impl FnOnce(&mut GameHub) -> Result<Vec<PeerMessage>, ParlorError>,
    ) -> Result<(), ParlorError> {
        let outbox = action(&mut self.hub)?;
        self.flush(outbox).await;
        Ok(())
    }

    /// Sends an outbox in order. A failed send is only logged: a dead link
    /// surfaces as a disconnect on the event stream.
    async fn flush(&self, outbox: Vec<PeerMessage>) {
        let Some(session) = &self.session else {
            return;
        };
        for msg in outbox {
            if let Err(e) = session.send(&msg).await {
                warn!(kind = msg.kind(), error = %e, "failed to send to peer");
            }
        }
    }

    async fn switch_mode(&mut self, mode: GameMode) -> Result<(), ParlorError> {
        self.hub.switch_mode(mode)?;
        self.drop_session().await;
        Ok(())
    }

    async fn set_profile(&mut self, profile: Profile) -> Result<(), ParlorError> {
        // The session owns the handshake, so it re-sends it.
        self.hub.set_profile(profile.clone())?;
        if let Some(session) = &mut self.session {
            session.update_profile(profile).await?;
        }
        Ok(())
    }

    async fn attach(
        &mut self,
        session: PeerSession<C>,
        events: SessionEvents,
    ) -> Result<(), ParlorError> {
        let (Some(role), Some(remote_id), Some(remote_profile)) = (
            session.role(),
            session.remote_id().cloned(),
            session.remote_profile().cloned(),
        ) else {
            return Err(SessionError::NotConnected.into());
        };

        self.drop_session().await;
        self.hub
            .on_connected(role, session.local_id().clone(), remote_id, remote_profile)?;
        self.session = Some(session);
        self.events = Some(events);
        Ok(())
    }

    async fn drop_session(&mut self) {
        self.events = None;
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close().await {
                debug!(error = %e, "closing previous session");
            }
        }
    }

    async fn handle_session_event(&mut self, event: Option<SessionEvent>) {
        match event {
            Some(SessionEvent::Message(msg)) => match self.hub.handle_peer_message(msg) {
                Ok(reply) => self.flush(reply).await,
                // Desyncs are already recorded as notices.
                Err(e) => debug!(error = %e, "peer message not applied"),
            },
            Some(SessionEvent::Invalid { reason }) => {
                warn!(%reason, "ignoring malformed frame from peer");
            }
            Some(SessionEvent::RemoteDisconnected) | None => {
                self.events = None;
                if let Some(mut session) = self.session.take() {
                    session.handle_remote_disconnect();
                }
                if let Err(e) = self.hub.on_remote_disconnected() {
                    warn!(error = %e, "failed to fall back to offline play");
                }
            }
        }
    }

    /// Asks an advisor for the automated turn the hub is waiting on,
    /// unless that exact request is already out.
    fn request_advice(&mut self) {
        let timeout = self.advisor_timeout;
        let tx = self.advice_tx.clone();

        if let Some(request) = self.hub.pending_move_request() {
            let ticket = request.ticket;
            if self.in_flight == Some(InFlight::Move(ticket)) {
                return;
            }
            self.in_flight = Some(InFlight::Move(ticket));
            debug!(?ticket, "requesting move suggestion");

            let advisor = Arc::clone(&self.move_advisor);
            tokio::spawn(async move {
                let outcome = consult(timeout, advisor.suggest_move(&request)).await;
                let _ = tx.send(Advice::Move(ticket, outcome));
            });
        } else if let Some(request) = self.hub.pending_bid_request() {
            let ticket = request.ticket;
            if self.in_flight == Some(InFlight::Bid(ticket)) {
                return;
            }
            self.in_flight = Some(InFlight::Bid(ticket));
            debug!(?ticket, seat = %request.seat, "requesting bid suggestion");

            let advisor = Arc::clone(&self.bid_advisor);
            tokio::spawn(async move {
                let outcome = consult(timeout, advisor.suggest_bid(&request)).await;
                let _ = tx.send(Advice::Bid(ticket, outcome));
            });
        }
    }

    fn handle_advice(&mut self, advice: Advice) {
        match advice {
            Advice::Move(ticket, outcome) => {
                if self.in_flight == Some(InFlight::Move(ticket)) {
                    self.in_flight = None;
                }
                if let Some(mv) = self.hub.apply_move_suggestion(ticket, outcome) {
                    debug!(x = mv.x, y = mv.y, "advisor stone placed");
                }
            }
            Advice::Bid(ticket, outcome) => {
                if self.in_flight == Some(InFlight::Bid(ticket)) {
                    self.in_flight = None;
                }
                if let Some(decision) = self.hub.apply_bid_suggestion(ticket, outcome) {
                    debug!(?decision, "automated seat acted");
                }
            }
        }
    }

    fn publish(&mut self) {
        for notice in self.hub.drain_notices() {
            let _ = self.updates.send(Update::Notice(notice));
        }
        let chat = self.hub.chat();
        for entry in chat.iter().skip(self.chat_seen) {
            let _ = self.updates.send(Update::Chat(entry.clone()));
        }
        self.chat_seen = chat.len();
        let _ = self.updates.send(Update::Changed {
            epoch: self.hub.epoch(),
        });
    }
}

async fn next_event(events: &mut Option<SessionEvents>) -> Option<SessionEvent> {
    match events {
        Some(events) => events.next().await,
        None => pending().await,
    }
}

/// Spawns a driver task and returns its handle plus the update stream.
///
/// # Errors
/// Whatever [`GameHub::new`] rejects in `config`.
pub fn spawn_driver<C, M, B>(
    config: ParlorConfig,
    move_advisor: M,
    bid_advisor: B,
) -> Result<(ParlorHandle<C>, mpsc::UnboundedReceiver<Update>), ParlorError>
where
    C: Connection,
    M: MoveAdvisor,
    B: BidAdvisor,
{
    let hub = GameHub::new(&config)?;
    let (tx, rx) = mpsc::channel(config.channel_size);
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let (advice_tx, advice_rx) = mpsc::unbounded_channel();

    let driver = Driver {
        hub,
        session: None,
        events: None,
        move_advisor: Arc::new(move_advisor),
        bid_advisor: Arc::new(bid_advisor),
        advisor_timeout: config.advisor_timeout,
        in_flight: None,
        advice_tx,
        advice_rx,
        receiver: rx,
        updates: updates_tx,
        chat_seen: 0,
    };

    tokio::spawn(driver.run());

    Ok((ParlorHandle { sender: tx }, updates_rx))
}
