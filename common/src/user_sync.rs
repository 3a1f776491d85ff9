//! Once-per-session copy of the signed-in identity to the backend.
//!
//! The request itself is fire-and-forget; [`UserSync`] only decides when a
//! payload should go out so that rendering never waits on it.

use serde::{Deserialize, Serialize};

pub const USER_SYNC_PATH: &str = "/api/users/sync";

/// The identity provider's view of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

/// Body of `POST /api/users/sync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub clerk_user_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl From<&Identity> for SyncPayload {
    fn from(identity: &Identity) -> Self {
        Self {
            clerk_user_id: identity.id.clone(),
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            image_url: identity.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum SyncState {
    #[default]
    Idle,
    InFlight(String),
    Synced(String),
    /// Last attempt for this user failed; held until the session changes.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct UserSync {
    state: SyncState,
}

impl UserSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload to send now, if any. Called whenever the session changes.
    pub fn begin(&mut self, identity: Option<&Identity>) -> Option<SyncPayload> {
        let identity = identity?;
        match &self.state {
            SyncState::InFlight(id) | SyncState::Synced(id) | SyncState::Failed(id)
                if *id == identity.id =>
            {
                None
            }
            _ => {
                self.state = SyncState::InFlight(identity.id.clone());
                Some(SyncPayload::from(identity))
            }
        }
    }

    /// Record the outcome for `user_id`. A failure is not retried for the
    /// same user; the next sign-in or a different identity re-arms it.
    pub fn finish(&mut self, user_id: &str, ok: bool) {
        if self.state != SyncState::InFlight(user_id.to_string()) {
            return;
        }
        self.state = if ok {
            tracing::info!("User {user_id} synced");
            SyncState::Synced(user_id.to_string())
        } else {
            tracing::warn!("User sync for {user_id} failed");
            SyncState::Failed(user_id.to_string())
        };
    }

    pub fn is_synced(&self) -> bool {
        matches!(self.state, SyncState::Synced(_))
    }

    /// Nothing synced, sent or failed yet.
    pub fn is_idle(&self) -> bool {
        self.state == SyncState::Idle
    }

    /// Forget the session (sign-out).
    pub fn reset(&mut self) {
        self.state = SyncState::Idle;
    }
}
