//! Seams for the move- and bid-suggestion services.
//!
//! Automated opponents ask an advisor what to play. An advisor is any
//! outside service (a language model, a bot on another machine) behind a
//! small request/response trait. Parlor never depends on one working:
//! every failure, timeout or nonsensical answer is replaced by a local,
//! deterministic fallback, and each turn gets exactly one attempt.

use std::future::Future;
use std::time::Duration;

use parlor_dice::{Bid, BidDecision, Persona, SeatId};
use parlor_gomoku::Move;
use parlor_protocol::Color;
use serde::{Deserialize, Serialize};

/// Identifies the turn a request was made for.
///
/// `epoch` changes on every reset and mode switch; `turn` changes with
/// every action in the game. An answer whose ticket no longer matches is
/// stale and gets dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub epoch: u64,
    pub turn: usize,
}

// ---------------------------------------------------------------------------
// Requests and answers
// ---------------------------------------------------------------------------

/// "Where should `to_move` play on this board?"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub ticket: Ticket,
    /// Every stone on the board.
    pub stones: Vec<Move>,
    pub to_move: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSuggestion {
    pub x: usize,
    pub y: usize,
    /// A line of table talk to show with the move.
    pub flavor_text: String,
}

/// "What should this seat do with this hand?"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidRequest {
    pub ticket: Ticket,
    pub seat: SeatId,
    pub persona: Persona,
    pub hand: Vec<u8>,
    /// Dice in play across the whole table.
    pub total_dice: usize,
    pub current: Option<Bid>,
    /// The last few lines of the table history, oldest first.
    pub recent_history: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidSuggestion {
    pub decision: BidDecision,
    pub flavor_text: String,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Suggests Gomoku moves.
pub trait MoveAdvisor: Send + Sync + 'static {
    fn suggest_move(
        &self,
        request: &MoveRequest,
    ) -> impl Future<Output = Result<MoveSuggestion, AdvisorError>> + Send;
}

/// Suggests Liar's Dice decisions.
pub trait BidAdvisor: Send + Sync + 'static {
    fn suggest_bid(
        &self,
        request: &BidRequest,
    ) -> impl Future<Output = Result<BidSuggestion, AdvisorError>> + Send;
}

/// Errors a suggestion service can produce.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdvisorError {
    /// No service is configured.
    #[error("no advisor available")]
    Unavailable,

    /// The service did not answer in time.
    #[error("advisor timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with an error.
    #[error("advisor failed: {0}")]
    Failed(String),
}

/// An advisor that is never there. Every automated turn uses the local
/// fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdvisor;

impl MoveAdvisor for NoAdvisor {
    async fn suggest_move(&self, _request: &MoveRequest) -> Result<MoveSuggestion, AdvisorError> {
        Err(AdvisorError::Unavailable)
    }
}

impl BidAdvisor for NoAdvisor {
    async fn suggest_bid(&self, _request: &BidRequest) -> Result<BidSuggestion, AdvisorError> {
        Err(AdvisorError::Unavailable)
    }
}

/// Makes one attempt at `call`, giving up after `timeout`.
pub async fn consult<T, F>(timeout: Duration, call: F) -> Result<T, AdvisorError>
where
    F: Future<Output = Result<T, AdvisorError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(outcome) => outcome,
        Err(_) => Err(AdvisorError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_consult_passes_answer_through() {
        let answer = consult(Duration::from_secs(1), async { Ok::<_, AdvisorError>(7) }).await;
        assert_eq!(answer, Ok(7));
    }

    #[tokio::test]
    async fn test_consult_times_out_slow_call() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AdvisorError>(())
        };
        let answer = consult(Duration::from_millis(10), slow).await;
        assert_eq!(answer, Err(AdvisorError::Timeout(Duration::from_millis(10))));
    }

    #[tokio::test]
    async fn test_no_advisor_is_unavailable() {
        let request = MoveRequest {
            ticket: Ticket { epoch: 0, turn: 0 },
            stones: Vec::new(),
            to_move: Color::White,
        };
        assert_eq!(
            NoAdvisor.suggest_move(&request).await,
            Err(AdvisorError::Unavailable)
        );
    }

    #[test]
    fn test_bid_suggestion_json_shape() {
        let suggestion = BidSuggestion {
            decision: BidDecision::Bid(Bid::new(3, 4)),
            flavor_text: "three fours!".into(),
        };
        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["decision"]["Bid"]["quantity"], 3);
    }
}
