//! Session and role state.
//!
//! The controller owns the authentication state machine:
//!
//! ```text
//! Unauthenticated --login--> Authenticating --ok--> Authenticated
//!        ^                         |                      |
//!        +---------fail------------+                      |
//!        +--------------------logout----------------------+
//! ```
//!
//! `bootstrap` goes straight from the stored credential to `Authenticated`.
//! Claims and role are derived from the credential on every transition and
//! dropped on logout; nothing here outlives the credential it came from.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

use crate::api::{ApiClient, LoginRequest};
use crate::error::{ConsoleError, Result};
use crate::storage::CredentialStore;
use crate::token::{self, Claims, Role};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated { claims: Claims, role: Option<Role> },
}

/// What the frontend needs to render the shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub role: Option<Role>,
    pub salesperson_id: Option<i64>,
    pub username: Option<String>,
}

pub struct SessionController {
    state: Mutex<SessionState>,
    credentials: Arc<dyn CredentialStore>,
}

impl SessionController {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            state: Mutex::new(SessionState::Unauthenticated),
            credentials,
        }
    }

    fn guard(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, next: SessionState) {
        *self.guard() = next;
    }

    /// Restore the session from the stored credential, if any.
    pub fn bootstrap(&self) -> &Self {
        let Some(credential) = self.credentials.load() else {
            self.set(SessionState::Unauthenticated);
            return self;
        };
        match token::decode(&credential) {
            Ok(claims) => {
                let role = claims.role.clone();
                info!(
                    role = role.as_ref().map(Role::as_str).unwrap_or("<none>"),
                    salesperson_id = ?claims.salesperson_id,
                    "session restored from stored credential"
                );
                self.set(SessionState::Authenticated { claims, role });
            }
            Err(e) => {
                warn!(error = %e, "stored credential is unreadable; discarding it");
                if let Err(clear_err) = self.credentials.clear() {
                    warn!(error = %clear_err, "failed to clear stale credential");
                }
                self.set(SessionState::Unauthenticated);
            }
        }
        self
    }

    /// Exchange username and password for a credential and enter the
    /// authenticated state. On any failure the controller is left
    /// unauthenticated with no stored credential.
    pub async fn login(&self, api: &ApiClient, username: &str, password: &str) -> Result<Claims> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ConsoleError::validation("Username and password are required"));
        }
        self.set(SessionState::Authenticating);

        let request = LoginRequest::new(username, password);
        match api.login(&request).await {
            Ok(credential) => self.accept_credential(&credential),
            Err(e) => {
                warn!(username = %request.username, error = %e, "login failed");
                self.fail();
                Err(e)
            }
        }
    }

    /// Store `credential` and derive the session from it.
    pub fn accept_credential(&self, credential: &str) -> Result<Claims> {
        if let Err(e) = self.credentials.save(credential) {
            self.fail();
            return Err(e);
        }
        match token::decode(credential) {
            Ok(claims) => {
                let role = claims.role.clone();
                info!(
                    role = role.as_ref().map(Role::as_str).unwrap_or("<none>"),
                    salesperson_id = ?claims.salesperson_id,
                    "logged in"
                );
                self.set(SessionState::Authenticated {
                    claims: claims.clone(),
                    role,
                });
                Ok(claims)
            }
            Err(e) => {
                warn!(error = %e, "login returned an undecodable credential");
                self.fail();
                Err(e.into())
            }
        }
    }

    fn fail(&self) {
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "failed to clear credential");
        }
        self.set(SessionState::Unauthenticated);
    }

    pub fn logout(&self) -> Result<()> {
        let cleared = self.credentials.clear();
        self.set(SessionState::Unauthenticated);
        info!("logged out");
        cleared
    }

    pub fn state(&self) -> SessionState {
        self.guard().clone()
    }

    pub fn role(&self) -> Option<Role> {
        match &*self.guard() {
            SessionState::Authenticated { role, .. } => role.clone(),
            _ => None,
        }
    }

    pub fn claims(&self) -> Option<Claims> {
        match &*self.guard() {
            SessionState::Authenticated { claims, .. } => Some(claims.clone()),
            _ => None,
        }
    }

    pub fn salesperson_id(&self) -> Option<i64> {
        match &*self.guard() {
            SessionState::Authenticated { claims, .. } => claims.salesperson_id,
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(&*self.guard(), SessionState::Authenticated { .. })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match &*self.guard() {
            SessionState::Authenticated { claims, role } => SessionSnapshot {
                authenticated: true,
                role: role.clone(),
                salesperson_id: claims.salesperson_id,
                username: claims.username.clone(),
            },
            _ => SessionSnapshot {
                authenticated: false,
                role: None,
                salesperson_id: None,
                username: None,
            },
        }
    }
}
