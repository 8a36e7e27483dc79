//! Session flag and the authentication gate in front of request submission.
//!
//! Authentication is simulated: a session is a single `"true"` entry in
//! local storage. The gate only decides whether submission may proceed or
//! the user must first pass through the login screen.

use std::sync::Arc;

use tracing::info;

use crate::draft::DraftStore;
use crate::navigation::{Navigator, Route};
use crate::request::Step;
use crate::storage::{KeyValueStore, StorageError};

/// Storage key of the session flag
pub const AUTH_KEY: &str = "idea2code_auth";

/// Outcome of [`AuthGate::ensure_authenticated`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome<T> {
    /// The session was valid and the continuation ran
    Proceeded(T),
    /// The user was sent to the login screen
    Redirected,
}

#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn KeyValueStore>,
    drafts: DraftStore,
}

impl AuthGate {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            drafts: DraftStore::new(store.clone()),
            store,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get(AUTH_KEY).as_deref() == Some("true")
    }

    /// Mark the session as signed in
    pub fn login(&self) -> Result<(), StorageError> {
        info!("Session signed in");
        self.store.set(AUTH_KEY, "true")
    }

    pub fn logout(&self) -> Result<(), StorageError> {
        info!("Session signed out");
        self.store.remove(AUTH_KEY)
    }

    /// Run `on_authenticated` if signed in. Otherwise remember that the
    /// wizard must resume at its final step and send the user to login
    /// with the wizard as return target.
    pub fn ensure_authenticated<T>(
        &self,
        navigator: &mut dyn Navigator,
        on_authenticated: impl FnOnce() -> T,
    ) -> AuthOutcome<T> {
        if self.is_authenticated() {
            return AuthOutcome::Proceeded(on_authenticated());
        }

        info!("Submission requires sign-in, redirecting to login");
        self.drafts.save_step(Step::LAST.number());
        navigator.navigate(Route::login_then(Route::Request));
        AuthOutcome::Redirected
    }
}
