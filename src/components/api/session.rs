use super::models::User;
use crate::error::CalResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Storage key of the persisted session
pub const SESSION_KEY: &str = "auth-storage";

/// The persisted part of the auth state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

/// On-disk envelope around the session
#[derive(Debug, Serialize, Deserialize)]
struct Stored {
    state: Session,
    #[serde(default)]
    version: u32,
}

/// File-backed store for the signed-in session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store keeping its file in `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", SESSION_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session; a missing or unreadable file counts as signed out
    pub fn load(&self) -> Option<Session> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read session from {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Stored>(&content) {
            Ok(stored) => Some(stored.state),
            Err(e) => {
                warn!("Ignoring malformed session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Token of the stored session, if any
    pub fn token(&self) -> Option<String> {
        self.load().and_then(|session| session.token)
    }

    /// Persist a session, replacing any previous one
    pub fn save(&self, session: &Session) -> CalResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let stored = Stored {
            state: session.clone(),
            version: 0,
        };
        fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;
        debug!("Saved session to {}", self.path.display());
        Ok(())
    }

    /// Replace the stored user, keeping the token
    pub fn set_user(&self, user: User) -> CalResult<()> {
        let mut session = self.load().unwrap_or(Session {
            user: None,
            token: None,
        });
        session.user = Some(user);
        self.save(&session)
    }

    /// Forget the session
    pub fn clear(&self) -> CalResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Cleared session at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
