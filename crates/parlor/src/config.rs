//! Client configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use parlor_protocol::Profile;
use parlor_session::SessionConfig;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameMode / GameKind
// ---------------------------------------------------------------------------

/// Who is on the other side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Two players sharing this device.
    Pvp,
    /// Against automated opponents.
    Pve,
    /// Against one remote peer.
    Online,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pvp => "pvp",
            Self::Pve => "pve",
            Self::Online => "online",
        })
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pvp" => Ok(Self::Pvp),
            "pve" => Ok(Self::Pve),
            "online" => Ok(Self::Online),
            other => Err(format!("unknown mode {other:?}")),
        }
    }
}

/// Which game is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    Gomoku,
    LiarsDice,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gomoku => "gomoku",
            Self::LiarsDice => "dice",
        })
    }
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gomoku" => Ok(Self::Gomoku),
            "dice" | "liars-dice" => Ok(Self::LiarsDice),
            other => Err(format!("unknown game {other:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// ParlorConfig
// ---------------------------------------------------------------------------

/// Settings for one client.
///
/// Start from `ParlorConfig::default()` and override what you need:
///
/// ```rust
/// use parlor::{GameKind, GameMode, ParlorConfig};
///
/// let config = ParlorConfig::default()
///     .with_mode(GameMode::Pve)
///     .with_game(GameKind::LiarsDice)
///     .with_ai_opponents(3)
///     .with_seed(42);
/// assert_eq!(config.ai_opponents, 3);
/// ```
#[derive(Debug, Clone)]
pub struct ParlorConfig {
    /// Starting mode. `Online` only takes effect once a peer connects;
    /// until then the client plays hot-seat.
    pub mode: GameMode,

    /// Game shown first.
    pub game: GameKind,

    /// Our name and avatar, sent in every handshake.
    pub profile: Profile,

    /// Automated opponents at an offline dice table (1-3).
    pub ai_opponents: usize,

    /// How long one suggestion request may take before the local fallback
    /// answers instead.
    pub advisor_timeout: Duration,

    /// How many recent history lines a bid request carries.
    pub history_window: usize,

    /// Seeds dice rolls for reproducible games. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Session settings used when going online.
    pub session: SessionConfig,

    /// Capacity of the driver's command channel.
    pub channel_size: usize,
}

impl Default for ParlorConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Pvp,
            game: GameKind::Gomoku,
            profile: Profile::named("Player"),
            ai_opponents: 1,
            advisor_timeout: Duration::from_secs(8),
            history_window: 3,
            seed: None,
            session: SessionConfig::default(),
            channel_size: 64,
        }
    }
}

impl ParlorConfig {
    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_game(mut self, game: GameKind) -> Self {
        self.game = game;
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_ai_opponents(mut self, count: usize) -> Self {
        self.ai_opponents = count;
        self
    }

    pub fn with_advisor_timeout(mut self, timeout: Duration) -> Self {
        self.advisor_timeout = timeout;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_offline_gomoku() {
        let config = ParlorConfig::default();
        assert_eq!(config.mode, GameMode::Pvp);
        assert_eq!(config.game, GameKind::Gomoku);
        assert_eq!(config.history_window, 3);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_mode_and_game_parse_case_insensitive() {
        assert_eq!("PvE".parse::<GameMode>().unwrap(), GameMode::Pve);
        assert_eq!("dice".parse::<GameKind>().unwrap(), GameKind::LiarsDice);
        assert!("chess".parse::<GameKind>().is_err());
    }
}
