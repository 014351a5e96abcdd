//! Externally-supplied user identity.
//!
//! The game does not own accounts; whoever launches it may hand it a username
//! through the environment. Absence of a session, or of a username inside one,
//! falls back to the literal "Guest".

pub const GUEST_NAME: &str = "Guest";
pub const USERNAME_ENV_VAR: &str = "STARHOP_USERNAME";

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub username: Option<String>,
}

impl Session {
    /// Read the session from the process environment. An empty or whitespace
    /// value counts as no username.
    pub fn from_env() -> Self {
        let username = std::env::var(USERNAME_ENV_VAR)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Self { username }
    }
}

/// Resolve the name shown in the HUD. Returns the supplied username verbatim,
/// or "Guest" when there is no session or no username.
pub fn display_name(session: Option<&Session>) -> &str {
    session
        .and_then(|s| s.username.as_deref())
        .unwrap_or(GUEST_NAME)
}
