//! Identity gateway and session handling.
//!
//! The original front end cached the signed-in user in client-side storage
//! and read it ambiently from every screen. Here the session is an explicit
//! value: created by [`IdentityGateway::login`], passed into every core
//! operation, destroyed at logout. Nothing in the core reads global state.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

use permitflow_protocol::{Identity, PermitError, Result};

/// Authentication contract consumed by the presentation layer.
pub trait IdentityGateway: Send + Sync {
    /// The identity currently signed in through this gateway, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Authenticate and open a session.
    fn login(&self, email: &str, password: &str) -> Result<Session>;

    /// Close the current session.
    fn logout(&self);
}

/// An authenticated session. Exists from login to logout; every core
/// operation takes one explicitly.
#[derive(Debug, Clone)]
pub struct Session {
    identity: Identity,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            started_at: Utc::now(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

struct RegisteredUser {
    password: String,
    identity: Identity,
}

/// In-memory identity gateway with a registered-user table. Reference and
/// test implementation; a production deployment adapts a real provider
/// behind the same trait.
#[derive(Default)]
pub struct MemoryIdentityGateway {
    users: Mutex<HashMap<String, RegisteredUser>>,
    current: Mutex<Option<Identity>>,
}

impl MemoryIdentityGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user the gateway will accept at login.
    pub fn register(&self, password: impl Into<String>, identity: Identity) -> Result<()> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| PermitError::gateway("user table lock poisoned"))?;
        users.insert(
            identity.email.clone(),
            RegisteredUser {
                password: password.into(),
                identity,
            },
        );
        Ok(())
    }
}

impl IdentityGateway for MemoryIdentityGateway {
    fn current_identity(&self) -> Option<Identity> {
        self.current.lock().ok()?.clone()
    }

    fn login(&self, email: &str, password: &str) -> Result<Session> {
        let users = self
            .users
            .lock()
            .map_err(|_| PermitError::gateway("user table lock poisoned"))?;
        let user = users
            .get(email)
            .filter(|u| u.password == password)
            .ok_or_else(|| PermitError::permission_denied("invalid email or password"))?;
        let identity = user.identity.clone();
        drop(users);

        if let Ok(mut current) = self.current.lock() {
            *current = Some(identity.clone());
        }
        info!(user = %identity.id, role = %identity.role, "session opened");
        Ok(Session::new(identity))
    }

    fn logout(&self) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(identity) = current.take() {
                info!(user = %identity.id, "session closed");
            }
        }
    }
}
