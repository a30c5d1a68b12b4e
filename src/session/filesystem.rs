use super::storage::SessionStore;
use crate::error::{GatewayError, Result};
use crate::models::{Session, UserSummary};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const SESSION_FILE_NAME: &str = "session.json";

/// On-disk layout. `user` stays a raw value so a profile written by an
/// older release does not cost us the token.
#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Cached {
    session: Session,
    updated_at: Option<DateTime<Utc>>,
}

/// Session persisted as a JSON file, mirrored in memory.
///
/// The file is replaced through a temp file and a rename while the write
/// lock is held, then the in-memory copy is swapped. Readers only ever
/// touch the in-memory copy.
pub struct FilesystemSessionStore {
    path: PathBuf,
    state: RwLock<Cached>,
}

impl FilesystemSessionStore {
    /// Open the store at `path`. A missing file means logged out.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cached = Self::read_file(&path)?;
        Ok(Self {
            path,
            state: RwLock::new(cached),
        })
    }

    /// `~/.cache/designmart/session.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("designmart").join(SESSION_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the session file was last written, if there is one
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().updated_at
    }

    fn read_file(path: &Path) -> Result<Cached> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Cached::default()),
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedSession = match serde_json::from_str(&content) {
            Ok(persisted) => persisted,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
                return Ok(Cached::default());
            }
        };

        let current_user = persisted.user.and_then(|value| {
            serde_json::from_value::<UserSummary>(value)
                .map_err(|e| warn!(error = %e, "cached user profile is unreadable"))
                .ok()
        });

        Ok(Cached {
            session: Session {
                access_token: persisted.access_token,
                current_user,
            },
            updated_at: persisted.updated_at,
        })
    }

    fn write_file(&self, session: &Session, updated_at: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let persisted = PersistedSession {
            access_token: session.access_token.clone(),
            user: session
                .current_user
                .as_ref()
                .map(serde_json::to_value)
                .transpose()?,
            updated_at: Some(updated_at),
        };
        let content = serde_json::to_string_pretty(&persisted)?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = private_file(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn commit(&self, cached: &mut Cached, next: Session) -> Result<()> {
        let now = Utc::now();
        self.write_file(&next, now)
            .map_err(|e| GatewayError::StorageError(format!("{}: {}", self.path.display(), e)))?;
        cached.session = next;
        cached.updated_at = Some(now);
        Ok(())
    }
}

/// Open `path` for writing, readable by the owner only from the moment it
/// exists. A leftover file from an interrupted write is truncated and
/// narrowed too.
#[cfg(unix)]
fn private_file(path: &Path) -> Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn private_file(path: &Path) -> Result<File> {
    Ok(OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?)
}

impl SessionStore for FilesystemSessionStore {
    fn snapshot(&self) -> Session {
        self.state.read().session.clone()
    }

    fn save(&self, session: Session) -> Result<()> {
        let mut cached = self.state.write();
        self.commit(&mut cached, session)
    }

    fn set_access_token(&self, token: String) -> Result<()> {
        let mut cached = self.state.write();
        let next = Session {
            access_token: Some(token),
            current_user: cached.session.current_user.clone(),
        };
        self.commit(&mut cached, next)
    }

    fn update_user(&self, user: UserSummary) -> Result<()> {
        let mut cached = self.state.write();
        if !cached.session.is_authenticated() {
            return Err(GatewayError::NotAuthenticated);
        }
        let next = Session {
            access_token: cached.session.access_token.clone(),
            current_user: Some(user),
        };
        self.commit(&mut cached, next)
    }

    fn clear(&self) -> Result<()> {
        let mut cached = self.state.write();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(GatewayError::StorageError(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        }
        *cached = Cached::default();
        Ok(())
    }
}
