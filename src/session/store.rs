use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use super::Session;
use crate::{error::Result, protocol::UserProfile};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

/// Durable session storage: a directory holding a `token` and a `user` (JSON) key.
///
/// Both keys are written together and removed together.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// A store rooted at `dir`. Nothing is read until `load`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the keys.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The stored session, if both keys are present and readable.
    ///
    /// Corrupt data is discarded: both keys are removed and `None` is returned.
    pub fn load(&self) -> Option<Session> {
        let token = read_key(&self.dir.join(TOKEN_KEY))?;
        let user = read_key(&self.dir.join(USER_KEY))?;

        let token = token.trim().to_string();
        match serde_json::from_str::<UserProfile>(&user) {
            Ok(user) if !token.is_empty() => Some(Session { token, user }),
            Ok(_) => {
                warn!(dir = %self.dir.display(), "Stored token is empty, clearing session");
                self.clear_quietly();
                None
            }
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Stored user is corrupt, clearing session");
                self.clear_quietly();
                None
            }
        }
    }

    /// Persist both keys.
    pub fn save(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(TOKEN_KEY), &session.token)?;
        fs::write(
            self.dir.join(USER_KEY),
            serde_json::to_vec_pretty(&session.user)?,
        )?;
        info!(email = %session.user.email, role = %session.user.role, "Saved session");
        Ok(())
    }

    /// Remove both keys. Missing keys are not an error.
    pub fn clear(&self) -> Result<()> {
        for key in [TOKEN_KEY, USER_KEY] {
            match fs::remove_file(self.dir.join(key)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        debug!(dir = %self.dir.display(), "Cleared session");
        Ok(())
    }

    fn clear_quietly(&self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "Could not clear corrupt session");
        }
    }
}

/// Missing keys read as `None`. Unreadable ones too, after a warning.
fn read_key(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(value) => Some(value),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read session key");
            None
        }
    }
}
