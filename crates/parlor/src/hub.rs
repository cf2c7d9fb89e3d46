//! The game hub: both games, the chat log, and the sync protocol.
//!
//! `GameHub` is plain synchronous state. It does no I/O. Every local
//! action goes through a method that validates it against the rules,
//! applies it, and returns the messages the peer must see (the
//! "outbox"). Every peer message goes through
//! [`GameHub::handle_peer_message`], which replays it through the *same*
//! rule entry points.
//!
//! ```text
//!  local input ──→ place_stone / dice_bid / ... ──→ rules ──→ outbox ──→ peer
//!  peer message ─→ handle_peer_message ──────────→ rules ──→ reply outbox
//! ```
//!
//! Two hubs fed the same sequence of actions end up in the same state.
//! Nothing random happens in here except rolling our own dice, which the
//! other side never needs to reproduce.
//!
//! A local action the rules refuse returns an error, changes nothing and
//! sends nothing. A *peer* action the rules refuse means the two copies
//! have drifted apart: it is reported as [`ParlorError::Desync`] and
//! recorded as a [`Notice`], and only a restart recovers.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use parlor_dice::{
    Bid, BidDecision, CallProgress, DicePlayer, DiceTable, MAX_AI_OPPONENTS, Persona, Phase,
    RoundResult, SeatId, coerce_bid, fallback_decision,
};
use parlor_gomoku::{GomokuGame, Move, fallback_move, is_playable};
use parlor_protocol::{Color, DiceAction, PeerId, PeerMessage, Profile};
use parlor_session::Role;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::{
    AdvisorError, BidRequest, BidSuggestion, GameKind, GameMode, MoveRequest, MoveSuggestion,
    ParlorConfig, ParlorError, Ticket,
};

/// Seat id of the local player at an offline dice table.
pub const OFFLINE_SEAT: &str = "me";

/// The colour the human plays against the move advisor.
pub const HUMAN_COLOR: Color = Color::Black;

/// The persona that plays Gomoku against the human.
const GOMOKU_PERSONA: Persona = Persona::XiaoLin;

const FALLBACK_MOVE_LINE: &str = "Hmm, let me think... I'll go here!";

// ---------------------------------------------------------------------------
// Chat and notices
// ---------------------------------------------------------------------------

/// Who wrote a chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatSender {
    Local,
    Remote,
    /// An automated opponent, by display name.
    Bot(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub sender: ChatSender,
    pub content: String,
    pub is_sticker: bool,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Something the player should be told about, once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Connected { name: String },
    PeerLeft { name: String },
    Desync(String),
    AdvisorFallback(String),
    RoundSettled { count: usize, loser: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected { name } => write!(f, "connected to {name}"),
            Self::PeerLeft { name } => write!(f, "{name} left; continuing offline"),
            Self::Desync(reason) => write!(f, "out of sync with peer ({reason}); restart to recover"),
            Self::AdvisorFallback(reason) => write!(f, "advisor unavailable ({reason}); playing locally"),
            Self::RoundSettled { count, loser } => {
                write!(f, "showdown: {count} counted, {loser} loses a die")
            }
        }
    }
}

/// The peer we are playing, while online.
#[derive(Debug, Clone)]
struct OnlineLink {
    role: Role,
    local_id: PeerId,
    remote_id: PeerId,
    remote_profile: Profile,
}

// ---------------------------------------------------------------------------
// GameHub
// ---------------------------------------------------------------------------

/// Both games plus everything needed to keep them in step with a peer.
#[derive(Debug, Clone)]
pub struct GameHub {
    mode: GameMode,
    game: GameKind,
    profile: Profile,
    ai_opponents: usize,
    history_window: usize,

    online: Option<OnlineLink>,
    local_seat: SeatId,

    gomoku: GomokuGame,
    dice: DiceTable,
    /// Set when we dealt a round ourselves and told the peer, so that a
    /// `NEW_ROUND` the peer sent at the same moment is absorbed.
    round_crossing: bool,

    chat: Vec<ChatEntry>,
    notices: Vec<Notice>,
    epoch: u64,
    rng: StdRng,
}

impl GameHub {
    /// Creates an offline hub. An `Online` mode in `config` starts as
    /// hot-seat until [`on_connected`](Self::on_connected).
    ///
    /// # Errors
    /// [`ParlorError::InvalidAction`] if `config.ai_opponents` is not 1-3.
    pub fn new(config: &ParlorConfig) -> Result<Self, ParlorError> {
        check_ai_count(config.ai_opponents)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let dice = offline_table(&config.profile, config.ai_opponents, &mut rng)?;
        let mode = match config.mode {
            GameMode::Online => GameMode::Pvp,
            other => other,
        };

        Ok(Self {
            mode,
            game: config.game,
            profile: config.profile.clone(),
            ai_opponents: config.ai_opponents,
            history_window: config.history_window,
            online: None,
            local_seat: SeatId::from(OFFLINE_SEAT),
            gomoku: GomokuGame::new(),
            dice,
            round_crossing: false,
            chat: Vec::new(),
            notices: Vec::new(),
            epoch: 0,
            rng,
        })
    }

    // -- Queries ------------------------------------------------------------

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn game(&self) -> GameKind {
        self.game
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn gomoku(&self) -> &GomokuGame {
        &self.gomoku
    }

    pub fn dice(&self) -> &DiceTable {
        &self.dice
    }

    pub fn chat(&self) -> &[ChatEntry] {
        &self.chat
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hands over every notice recorded since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Bumped on every reset and mode switch.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Our seat at the dice table.
    pub fn local_seat(&self) -> &SeatId {
        &self.local_seat
    }

    pub fn is_online(&self) -> bool {
        self.online.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.online.as_ref().map(|link| link.role)
    }

    /// The stone colour we play. `None` in hot-seat, where both are ours.
    pub fn local_color(&self) -> Option<Color> {
        match (&self.online, self.mode) {
            (Some(link), _) => Some(link.role.color()),
            (None, GameMode::Pve) => Some(HUMAN_COLOR),
            (None, _) => None,
        }
    }

    /// The peer's latest profile.
    pub fn remote_profile(&self) -> Option<&Profile> {
        self.online.as_ref().map(|link| &link.remote_profile)
    }

    // -- Local actions ------------------------------------------------------

    /// Places a stone for whoever is on turn locally.
    ///
    /// Online and against the advisor we only ever play our own colour;
    /// in hot-seat the colour on turn is used.
    pub fn place_stone(&mut self, x: usize, y: usize) -> Result<Vec<PeerMessage>, ParlorError> {
        let color = self.local_color().unwrap_or(self.gomoku.to_move());
        self.gomoku.play(x, y, color)?;

        Ok(self.outbox(|| PeerMessage::Move { x, y, color }))
    }

    /// Re-seats an offline dice table with `ai_count` automated opponents
    /// and deals the first round.
    pub fn dice_setup(&mut self, ai_count: usize) -> Result<Vec<PeerMessage>, ParlorError> {
        if self.online.is_some() {
            return Err(ParlorError::InvalidAction(
                "the online dice table is fixed to the two peers".into(),
            ));
        }
        check_ai_count(ai_count)?;

        self.dice = offline_table(&self.profile, ai_count, &mut self.rng)?;
        self.ai_opponents = ai_count;
        self.bump_epoch();
        Ok(Vec::new())
    }

    /// Raises the table bid from our seat.
    pub fn dice_bid(&mut self, quantity: u32, face: u8) -> Result<Vec<PeerMessage>, ParlorError> {
        self.dice.place_bid(&self.local_seat, Bid::new(quantity, face))?;
        Ok(self.outbox(|| PeerMessage::LiarAction {
            action: DiceAction::Bid { quantity, face },
        }))
    }

    /// Calls the table bid from our seat. Online, our hand goes out right
    /// behind the call.
    pub fn dice_call(&mut self) -> Result<Vec<PeerMessage>, ParlorError> {
        let progress = self.dice.call(&self.local_seat)?;
        if let CallProgress::Resolved(result) = &progress {
            self.on_settled(result);
        }

        if self.online.is_none() {
            return Ok(Vec::new());
        }
        Ok(vec![
            PeerMessage::LiarAction {
                action: DiceAction::Call,
            },
            self.own_reveal(),
        ])
    }

    /// Deals the next round.
    pub fn dice_next_round(&mut self) -> Result<Vec<PeerMessage>, ParlorError> {
        self.dice.start_round(&mut self.rng)?;
        if self.online.is_some() {
            self.round_crossing = true;
        }
        Ok(self.outbox(|| PeerMessage::LiarAction {
            action: DiceAction::NewRound,
        }))
    }

    /// Starts both games over. Online, the peer is told once.
    pub fn restart(&mut self) -> Result<Vec<PeerMessage>, ParlorError> {
        self.reset_games()?;
        info!(epoch = self.epoch, "games restarted");
        Ok(self.outbox(|| PeerMessage::Restart))
    }

    pub fn send_chat(
        &mut self,
        content: impl Into<String>,
        is_sticker: bool,
    ) -> Result<Vec<PeerMessage>, ParlorError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ParlorError::InvalidAction("empty chat message".into()));
        }
        self.push_chat(ChatSender::Local, content.clone(), is_sticker);
        Ok(self.outbox(|| PeerMessage::Chat {
            content,
            is_sticker,
        }))
    }

    /// Switches to an offline mode, resetting both games. Going online
    /// happens through [`on_connected`](Self::on_connected) instead.
    ///
    /// Leaving online mode drops the peer; the caller closes the session.
    pub fn switch_mode(&mut self, mode: GameMode) -> Result<Vec<PeerMessage>, ParlorError> {
        if mode == GameMode::Online {
            return Err(ParlorError::InvalidAction(
                "connect to a peer to play online".into(),
            ));
        }
        if let Some(link) = self.online.take() {
            info!(remote_id = %link.remote_id, "leaving online play");
        }
        self.mode = mode;
        self.local_seat = SeatId::from(OFFLINE_SEAT);
        self.reset_games()?;
        Ok(Vec::new())
    }

    pub fn switch_game(&mut self, game: GameKind) -> Result<Vec<PeerMessage>, ParlorError> {
        self.game = game;
        Ok(Vec::new())
    }

    /// Replaces our profile. Online, the handshake goes out again.
    pub fn set_profile(&mut self, profile: Profile) -> Result<Vec<PeerMessage>, ParlorError> {
        self.profile = profile;
        let peer_id = self.online.as_ref().map(|link| link.local_id.clone());
        Ok(self.outbox(|| PeerMessage::Handshake {
            profile: self.profile.clone(),
            peer_id,
        }))
    }

    // -- Peer messages ------------------------------------------------------

    /// Replays one message from the peer. Returns any reply owed (our
    /// `REVEAL` after their `CALL`).
    ///
    /// # Errors
    /// [`ParlorError::Desync`] if the message cannot be applied to our
    /// copy of the game. Our state is left untouched.
    pub fn handle_peer_message(&mut self, msg: PeerMessage) -> Result<Vec<PeerMessage>, ParlorError> {
        debug!(kind = msg.kind(), "peer message");
        match msg {
            PeerMessage::Handshake { profile, .. } => {
                if let Some(link) = &mut self.online {
                    debug!(name = %profile.name, "peer profile updated");
                    link.remote_profile = profile;
                }
                Ok(Vec::new())
            }
            PeerMessage::Chat {
                content,
                is_sticker,
            } => {
                self.push_chat(ChatSender::Remote, content, is_sticker);
                Ok(Vec::new())
            }
            PeerMessage::Restart => {
                self.reset_games()?;
                info!(epoch = self.epoch, "peer restarted the games");
                Ok(Vec::new())
            }
            PeerMessage::Move { x, y, color } => self.replay_move(x, y, color),
            PeerMessage::LiarAction { action } => self.replay_dice(action),
        }
    }

    fn replay_move(&mut self, x: usize, y: usize, color: Color) -> Result<Vec<PeerMessage>, ParlorError> {
        let remote_color = match &self.online {
            Some(link) => link.role.color().opponent(),
            None => return Err(self.desync("stone received while offline".into())),
        };
        if color != remote_color {
            return Err(self.desync(format!(
                "peer placed a {color} stone but plays {remote_color}"
            )));
        }

        let outcome = self.gomoku.play(x, y, color).map(|_| ());
        if let Err(e) = outcome {
            return Err(self.desync(format!("move ({x}, {y}): {e}")));
        }
        Ok(Vec::new())
    }

    fn replay_dice(&mut self, action: DiceAction) -> Result<Vec<PeerMessage>, ParlorError> {
        let remote = match &self.online {
            Some(link) => SeatId::from(link.remote_id.as_str()),
            None => return Err(self.desync("dice action received while offline".into())),
        };
        let kind = action.kind();
        // The link keeps order: once the peer acts in this round, a
        // NEW_ROUND of theirs can no longer be one that crossed ours.
        if !matches!(action, DiceAction::NewRound) {
            self.round_crossing = false;
        }

        match action {
            DiceAction::Bid { quantity, face } => {
                let outcome = self.dice.place_bid(&remote, Bid::new(quantity, face));
                outcome.map_err(|e| self.desync(format!("{kind}: {e}")))?;
                Ok(Vec::new())
            }
            DiceAction::Call => {
                let outcome = self.dice.call(&remote);
                let progress = outcome.map_err(|e| self.desync(format!("{kind}: {e}")))?;
                if let CallProgress::Resolved(result) = &progress {
                    self.on_settled(result);
                }
                Ok(vec![self.own_reveal()])
            }
            DiceAction::Reveal { dice } => {
                let outcome = self.dice.reveal(&remote, dice);
                let progress = outcome.map_err(|e| self.desync(format!("{kind}: {e}")))?;
                if let CallProgress::Resolved(result) = &progress {
                    self.on_settled(result);
                }
                Ok(Vec::new())
            }
            DiceAction::NewRound => {
                let phase = self.dice.phase().clone();
                match phase {
                    Phase::RoundOver => {
                        let outcome = self.dice.start_round(&mut self.rng);
                        outcome.map_err(|e| self.desync(format!("{kind}: {e}")))?;
                    }
                    _ if self.round_crossing => {
                        debug!("absorbed NEW_ROUND that crossed ours");
                        self.round_crossing = false;
                    }
                    phase => return Err(self.desync(format!("{kind} while {phase}"))),
                }
                Ok(Vec::new())
            }
        }
    }

    // -- Session lifecycle --------------------------------------------------

    /// A peer finished its handshake. Both games start fresh, and the dice
    /// table seats the host first and the guest second.
    pub fn on_connected(
        &mut self,
        role: Role,
        local_id: PeerId,
        remote_id: PeerId,
        remote_profile: Profile,
    ) -> Result<(), ParlorError> {
        let link = OnlineLink {
            role,
            local_id,
            remote_id,
            remote_profile,
        };
        self.dice = online_table(&link, &self.profile)?;
        self.local_seat = SeatId::from(link.local_id.as_str());
        self.notices.push(Notice::Connected {
            name: link.remote_profile.name.clone(),
        });
        info!(remote_id = %link.remote_id, ?role, "playing online");

        self.online = Some(link);
        self.mode = GameMode::Online;
        self.gomoku.reset();
        self.round_crossing = false;
        self.bump_epoch();
        Ok(())
    }

    /// The peer is gone. Falls back to hot-seat: the board stays as it
    /// was, the dice table goes back to offline play. Returns `true` (and
    /// records one notice) only the first time.
    pub fn on_remote_disconnected(&mut self) -> Result<bool, ParlorError> {
        let Some(link) = self.online.take() else {
            return Ok(false);
        };
        warn!(remote_id = %link.remote_id, "peer disconnected; continuing offline");

        self.mode = GameMode::Pvp;
        self.local_seat = SeatId::from(OFFLINE_SEAT);
        self.dice = offline_table(&self.profile, self.ai_opponents, &mut self.rng)?;
        self.round_crossing = false;
        self.bump_epoch();
        self.notices.push(Notice::PeerLeft {
            name: link.remote_profile.name,
        });
        Ok(true)
    }

    // -- Automated opponents ------------------------------------------------

    /// The move the advisor owes, if it is the advisor's turn at the
    /// Gomoku board.
    pub fn pending_move_request(&self) -> Option<MoveRequest> {
        let advisor_color = HUMAN_COLOR.opponent();
        if self.mode != GameMode::Pve
            || self.game != GameKind::Gomoku
            || self.gomoku.is_over()
            || self.gomoku.to_move() != advisor_color
        {
            return None;
        }
        Some(MoveRequest {
            ticket: self.move_ticket(),
            stones: self.gomoku.grid().occupied(),
            to_move: advisor_color,
        })
    }

    /// Plays the advisor's answer to the request made with `ticket`.
    ///
    /// Stale answers (reset, mode switch, or the turn already taken) are
    /// dropped and return `None`. Failed or unplayable answers fall back
    /// to the nearest free cell to the centre.
    pub fn apply_move_suggestion(
        &mut self,
        ticket: Ticket,
        outcome: Result<MoveSuggestion, AdvisorError>,
    ) -> Option<Move> {
        let request = self.pending_move_request()?;
        if request.ticket != ticket {
            debug!(?ticket, current = ?request.ticket, "dropping stale move suggestion");
            return None;
        }

        let (x, y, line) = match outcome {
            Ok(s) if is_playable(self.gomoku.grid(), s.x, s.y) => (s.x, s.y, s.flavor_text),
            Ok(s) => {
                self.advisor_fallback(format!("suggested ({}, {}) is not playable", s.x, s.y));
                let (x, y) = fallback_move(self.gomoku.grid())?;
                (x, y, FALLBACK_MOVE_LINE.to_string())
            }
            Err(e) => {
                self.advisor_fallback(e.to_string());
                let (x, y) = fallback_move(self.gomoku.grid())?;
                (x, y, FALLBACK_MOVE_LINE.to_string())
            }
        };

        if let Err(e) = self.gomoku.play(x, y, request.to_move).map(|_| ()) {
            warn!(error = %e, "advisor move refused");
            return None;
        }
        if !line.is_empty() {
            self.push_chat(
                ChatSender::Bot(GOMOKU_PERSONA.display_name().to_string()),
                line,
                false,
            );
        }
        Some(Move::new(x, y, request.to_move))
    }

    /// The decision an automated dice seat owes, if one is on turn.
    pub fn pending_bid_request(&self) -> Option<BidRequest> {
        if self.game != GameKind::LiarsDice {
            return None;
        }
        let player = self.dice.active_player()?;
        let persona = player.persona?;
        let hand = player.hand().dice()?.to_vec();

        let history = self.dice.history();
        let recent_history = history[history.len().saturating_sub(self.history_window)..].to_vec();

        Some(BidRequest {
            ticket: Ticket {
                epoch: self.epoch,
                turn: history.len(),
            },
            seat: player.id.clone(),
            persona,
            hand,
            total_dice: self.dice.total_dice(),
            current: self.dice.current_bid().map(|t| t.bid),
            recent_history,
        })
    }

    /// Plays the advisor's answer for the seat on turn.
    ///
    /// Stale answers are dropped and return `None`. Illegal raises are
    /// coerced to the minimal raise; failures and impossible calls fall
    /// back to the local heuristic.
    pub fn apply_bid_suggestion(
        &mut self,
        ticket: Ticket,
        outcome: Result<BidSuggestion, AdvisorError>,
    ) -> Option<BidDecision> {
        let request = self.pending_bid_request()?;
        if request.ticket != ticket {
            debug!(?ticket, current = ?request.ticket, "dropping stale bid suggestion");
            return None;
        }
        let current = request.current;

        let (decision, line) = match outcome {
            Ok(BidSuggestion {
                decision: BidDecision::Call,
                flavor_text,
            }) if current.is_some() => (BidDecision::Call, flavor_text),
            Ok(BidSuggestion {
                decision: BidDecision::Bid(bid),
                flavor_text,
            }) => (BidDecision::Bid(coerce_bid(bid, current.as_ref())), flavor_text),
            Ok(_) => {
                self.advisor_fallback("called with no bid on the table".into());
                let fallback = fallback_decision(&request.hand, request.total_dice, current.as_ref());
                (fallback, String::new())
            }
            Err(e) => {
                self.advisor_fallback(e.to_string());
                let fallback = fallback_decision(&request.hand, request.total_dice, current.as_ref());
                (fallback, String::new())
            }
        };

        let applied = match decision {
            BidDecision::Bid(bid) => self.dice.place_bid(&request.seat, bid).map(|()| None),
            BidDecision::Call => self.dice.call(&request.seat).map(|progress| match progress {
                CallProgress::Resolved(result) => Some(result),
                CallProgress::AwaitingReveal => None,
            }),
        };
        match applied {
            Ok(Some(result)) => self.on_settled(&result),
            Ok(None) => {}
            Err(e) => {
                warn!(seat = %request.seat, error = %e, "automated decision refused");
                return None;
            }
        }

        // Only Xiao Lin talks at the table.
        if request.persona == Persona::XiaoLin && !line.is_empty() {
            self.push_chat(
                ChatSender::Bot(request.persona.display_name().to_string()),
                line,
                false,
            );
        }
        Some(decision)
    }

    // -- Internals ----------------------------------------------------------

    /// `make()` as a one-message outbox while online, nothing offline.
    fn outbox(&self, make: impl FnOnce() -> PeerMessage) -> Vec<PeerMessage> {
        if self.online.is_some() {
            vec![make()]
        } else {
            Vec::new()
        }
    }

    fn own_reveal(&self) -> PeerMessage {
        let dice = self
            .dice
            .player(&self.local_seat)
            .and_then(|p| p.hand().dice())
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        PeerMessage::LiarAction {
            action: DiceAction::Reveal { dice },
        }
    }

    fn move_ticket(&self) -> Ticket {
        Ticket {
            epoch: self.epoch,
            turn: self.gomoku.grid().stone_count(),
        }
    }

    fn reset_games(&mut self) -> Result<(), ParlorError> {
        self.gomoku.reset();
        self.dice = match &self.online {
            Some(link) => online_table(link, &self.profile)?,
            None => offline_table(&self.profile, self.ai_opponents, &mut self.rng)?,
        };
        self.round_crossing = false;
        self.bump_epoch();
        Ok(())
    }

    fn on_settled(&mut self, result: &RoundResult) {
        self.round_crossing = false;
        let loser = self
            .dice
            .player(&result.loser)
            .map_or_else(|| result.loser.to_string(), |p| p.name.clone());
        self.notices.push(Notice::RoundSettled {
            count: result.count,
            loser,
        });
    }

    fn desync(&mut self, reason: String) -> ParlorError {
        warn!(%reason, "peer state diverged");
        self.notices.push(Notice::Desync(reason.clone()));
        ParlorError::Desync { reason }
    }

    fn advisor_fallback(&mut self, reason: String) {
        warn!(%reason, "advisor fallback");
        self.notices.push(Notice::AdvisorFallback(reason));
    }

    fn push_chat(&mut self, sender: ChatSender, content: String, is_sticker: bool) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        self.chat.push(ChatEntry {
            sender,
            content,
            is_sticker,
            timestamp,
        });
    }

    fn bump_epoch(&mut self) {
        self.epoch += 1;
    }
}

fn check_ai_count(count: usize) -> Result<(), ParlorError> {
    if (1..=MAX_AI_OPPONENTS).contains(&count) {
        Ok(())
    } else {
        Err(ParlorError::InvalidAction(format!(
            "an offline table seats 1-{MAX_AI_OPPONENTS} automated opponents, not {count}"
        )))
    }
}

/// Us plus `ai_count` automated opponents, first round dealt.
fn offline_table(
    profile: &Profile,
    ai_count: usize,
    rng: &mut StdRng,
) -> Result<DiceTable, ParlorError> {
    let mut players = vec![DicePlayer::local(OFFLINE_SEAT, profile.name.clone())];
    for (i, persona) in Persona::ROSTER.iter().take(ai_count).enumerate() {
        players.push(DicePlayer::ai(format!("ai-{i}"), *persona));
    }
    let mut table = DiceTable::new(players)?;
    table.start_round(rng)?;
    Ok(table)
}

/// Host first, guest second, on both peers. Waits for a `NEW_ROUND`.
fn online_table(link: &OnlineLink, profile: &Profile) -> Result<DiceTable, ParlorError> {
    let local = DicePlayer::local(link.local_id.as_str(), profile.name.clone());
    let remote = DicePlayer::remote(link.remote_id.as_str(), link.remote_profile.name.clone());
    let players = match link.role {
        Role::Host => vec![local, remote],
        Role::Guest => vec![remote, local],
    };
    Ok(DiceTable::new(players)?)
}

// =========================================================================
// Tests
// =========================================================================
