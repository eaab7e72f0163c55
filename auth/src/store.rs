//! Where the session token lives between commands.

use crate::error::{Result, SessionError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Persistence for the current session token.
///
/// Terminating a session must be idempotent: the gateway calls
/// [`SessionStore::terminate`] on every 401, including when the session is
/// already gone.
pub trait SessionStore: Send + Sync {
    /// The stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the backing storage is unreadable.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the token cannot be written.
    fn save(&self, token: &str) -> Result<()>;

    /// Forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the token cannot be removed.
    fn terminate(&self) -> Result<()>;
}

/// Session token stored in a single file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the session at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::Storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SessionError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        std::fs::write(&self.path, token).map_err(|e| {
            SessionError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })?;

        restrict_permissions(&self.path)
    }

    fn terminate(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Session terminated");
                Ok(())
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| SessionError::Storage(format!("failed to chmod {}: {e}", path.display())))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
