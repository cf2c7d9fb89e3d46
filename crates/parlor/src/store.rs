//! Local settings that survive restarts: our profile and theme picks.

use std::path::{Path, PathBuf};

use parlor_protocol::Profile;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ParlorError;

/// What gets written to disk.
///
/// Theme ids are opaque to the core; front ends pick their own. Unknown
/// or missing fields fall back to defaults, so older files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredProfile {
    pub name: String,
    pub avatar_url: String,
    pub board_theme: Option<String>,
    pub piece_theme: Option<String>,
}

impl StoredProfile {
    /// The part peers see. An empty name becomes `fallback_name`.
    pub fn profile(&self, fallback_name: &str) -> Profile {
        let name = if self.name.trim().is_empty() {
            fallback_name.to_string()
        } else {
            self.name.clone()
        };
        Profile {
            name,
            avatar_url: self.avatar_url.clone(),
        }
    }

    /// Copies `profile` in, leaving the theme picks alone.
    pub fn set_profile(&mut self, profile: &Profile) {
        self.name = profile.name.clone();
        self.avatar_url = profile.avatar_url.clone();
    }
}

/// A JSON file holding one [`StoredProfile`].
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored profile. A missing file is not an error: it
    /// yields the defaults.
    ///
    /// # Errors
    /// [`ParlorError::Store`] if the file exists but cannot be read, and
    /// [`ParlorError::StoreFormat`] if it is not valid JSON.
    pub async fn load(&self) -> Result<StoredProfile, ParlorError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored profile; using defaults");
                return Ok(StoredProfile::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Writes `stored`, creating parent directories as needed.
    pub async fn save(&self, stored: &StoredProfile) -> Result<(), ParlorError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(stored)?;
        tokio::fs::write(&self.path, json).await?;
        info!(path = %self.path.display(), "profile saved");
        Ok(())
    }
}
