use super::UserSummary;

/// The logged-in state as seen by one reader at one instant.
///
/// Stores hand out copies, so a `Session` never changes underneath its
/// holder. `access_token` and `current_user` are written together on login
/// and logout; a silent refresh replaces only the token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub current_user: Option<UserSummary>,
}

impl Session {
    pub fn new(user: UserSummary, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            current_user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}
