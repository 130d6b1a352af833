//! Authentication session and login service.
//!
//! The session is an explicit service handed to the application (and through
//! it to the router's role guard) instead of a process-wide singleton.

use std::collections::BTreeSet;

use caravel_router::RoleProvider;
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<Value>,
    roles: BTreeSet<String>,
}

/// The authenticated identity and roles of the current caller.
///
/// Interior mutability lets one `Arc<AuthSession>` be shared between the
/// router (as a [`RoleProvider`]) and the runnables that log callers in.
///
/// # Example
///
/// ```
/// use caravel_core::AuthSession;
/// use caravel_router::RoleProvider;
/// use serde_json::json;
///
/// let session = AuthSession::new();
/// session.login(json!({"id": 7, "name": "ann"}));
/// session.set_roles(["editor", "author"]);
///
/// assert!(session.is_logged_in());
/// assert!(session.has_role("editor"));
/// assert!(!session.has_role("admin"));
/// ```
#[derive(Debug, Default)]
pub struct AuthSession {
    state: RwLock<SessionState>,
}

impl AuthSession {
    /// Creates an anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the identity of the logged-in caller.
    pub fn login(&self, identity: Value) {
        self.state.write().identity = Some(identity);
    }

    /// Clears identity and roles.
    pub fn logout(&self) {
        let mut state = self.state.write();
        state.identity = None;
        state.roles.clear();
    }

    /// Returns true once `login` has been called.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.state.read().identity.is_some()
    }

    /// The stored identity.
    #[must_use]
    pub fn identity(&self) -> Option<Value> {
        self.state.read().identity.clone()
    }

    /// Replaces the caller's roles.
    pub fn set_roles<I, S>(&self, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.write().roles = roles.into_iter().map(Into::into).collect();
    }

    /// The caller's roles, sorted.
    #[must_use]
    pub fn roles(&self) -> Vec<String> {
        self.state.read().roles.iter().cloned().collect()
    }
}

impl RoleProvider for AuthSession {
    fn has_role(&self, role: &str) -> bool {
        self.state.read().roles.contains(role)
    }
}

/// What an authentication backend concluded.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// Credentials accepted.
    Success {
        /// Identity to store in the session.
        identity: Value,
        /// Roles granted to the identity.
        roles: Vec<String>,
    },
    /// Credentials rejected.
    Invalid,
}

/// An authentication backend (database lookup, LDAP, ...).
pub trait AuthAdapter {
    /// Checks the credentials the adapter was built with.
    fn authenticate(&self) -> AuthOutcome;
}

/// Login failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The backend rejected the credentials.
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Logs a caller in through an adapter.
///
/// # Errors
///
/// Returns [`AuthError::InvalidCredentials`] when the adapter rejects the
/// credentials; the session is left untouched.
pub fn login_with(adapter: &dyn AuthAdapter, session: &AuthSession) -> Result<(), AuthError> {
    match adapter.authenticate() {
        AuthOutcome::Success { identity, roles } => {
            session.login(identity);
            session.set_roles(roles);
            tracing::debug!(roles = ?session.roles(), "caller logged in");
            Ok(())
        }
        AuthOutcome::Invalid => Err(AuthError::InvalidCredentials),
    }
}
