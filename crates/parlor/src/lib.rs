//! # Parlor
//!
//! Gomoku and Liar's Dice for two players on two devices, with no server
//! in between.
//!
//! Each client runs its own copy of both games. Local actions are checked
//! against the rules, applied, and forwarded to the peer as
//! [`PeerMessage`](parlor_protocol::PeerMessage)s; peer messages are
//! replayed through the same rules. Two clients fed the same sequence end
//! up in the same state.
//!
//! - [`GameHub`]: both games plus the sync protocol. Synchronous, no I/O.
//! - [`spawn_driver`] / [`ParlorHandle`]: an actor task that owns the hub,
//!   the peer session and any advisor calls.
//! - [`MoveAdvisor`] / [`BidAdvisor`]: seams for outside suggestion
//!   services, with local fallbacks when they fail.
//! - [`ProfileStore`]: our name, avatar and theme picks on disk.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//! use parlor_transport::MemoryConnection;
//!
//! # async fn run() -> Result<(), ParlorError> {
//! let config = ParlorConfig::default().with_mode(GameMode::Pve);
//! let (parlor, mut updates) =
//!     spawn_driver::<MemoryConnection, _, _>(config, NoAdvisor, NoAdvisor)?;
//!
//! parlor.place_stone(7, 7).await?;
//! while let Some(update) = updates.recv().await {
//!     // redraw from parlor.snapshot().await?
//! #   let _ = update;
//! #   break;
//! }
//! # Ok(())
//! # }
//! ```

mod advisor;
mod config;
mod driver;
mod error;
mod hub;
mod store;

pub use advisor::{
    AdvisorError, BidAdvisor, BidRequest, BidSuggestion, MoveAdvisor, MoveRequest,
    MoveSuggestion, NoAdvisor, Ticket, consult,
};
pub use config::{GameKind, GameMode, ParlorConfig};
pub use driver::{ParlorHandle, Update, spawn_driver};
pub use error::ParlorError;
pub use hub::{ChatEntry, ChatSender, GameHub, HUMAN_COLOR, Notice, OFFLINE_SEAT};
pub use store::{ProfileStore, StoredProfile};

/// The types most front ends need.
pub mod prelude {
    pub use crate::{
        BidAdvisor, GameHub, GameKind, GameMode, MoveAdvisor, NoAdvisor, Notice, ParlorConfig,
        ParlorError, ParlorHandle, Update, spawn_driver,
    };
    pub use parlor_dice::{Bid, BidDecision, Phase};
    pub use parlor_protocol::{Color, PeerId, Profile};
    pub use parlor_session::{PeerSession, Role, SessionConfig};
}
