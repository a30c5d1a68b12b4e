use crate::error::Result;
use crate::models::{Session, UserSummary};

/// Trait for session storage backends.
///
/// Every write is a single critical section: a concurrent `snapshot` sees
/// either the old (token, user) pair or the new one, never a mix.
pub trait SessionStore: Send + Sync {
    /// Consistent copy of the current session
    fn snapshot(&self) -> Session;

    fn access_token(&self) -> Option<String> {
        self.snapshot().access_token
    }

    /// Replace token and user together
    fn save(&self, session: Session) -> Result<()>;

    /// Replace the token after a silent refresh, keeping the cached user
    fn set_access_token(&self, token: String) -> Result<()>;

    /// Replace the cached profile of the logged-in user
    fn update_user(&self, user: UserSummary) -> Result<()>;

    /// Forget token and user. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<()> {
        self.save(Session::default())
    }
}
