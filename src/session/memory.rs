use super::storage::SessionStore;
use crate::error::{GatewayError, Result};
use crate::models::{Session, UserSummary};
use parking_lot::RwLock;

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct MemorySessionStore {
    state: RwLock<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            state: RwLock::new(session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn snapshot(&self) -> Session {
        self.state.read().clone()
    }

    fn save(&self, session: Session) -> Result<()> {
        *self.state.write() = session;
        Ok(())
    }

    fn set_access_token(&self, token: String) -> Result<()> {
        self.state.write().access_token = Some(token);
        Ok(())
    }

    fn update_user(&self, user: UserSummary) -> Result<()> {
        let mut state = self.state.write();
        if !state.is_authenticated() {
            return Err(GatewayError::NotAuthenticated);
        }
        state.current_user = Some(user);
        Ok(())
    }
}
