mod builder;
mod capability;
pub mod oauth2;

pub use builder::*;
pub use capability::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name given to OAuth2 users whose provider did not share one.
pub const UNKNOWN_NAME: &str = "Unknown";

/// User as saved on the store.
///
/// One concrete record backs every capability the authentication framework
/// asks for, see [`AuthableUser`], [`ConfirmableUser`], [`LockableUser`],
/// [`RecoverableUser`] and [`OAuth2User`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Surrogate identifier set by the store on first insertion.
    pub id: Option<u64>,

    pub name: String,

    /// Primary identifier (PID).
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,

    pub confirm_token: String,
    pub confirmed: bool,

    pub attempt_count: u32,
    pub last_attempt: Option<DateTime<Utc>>,
    /// Lockout expiry. `None` means the account is not locked.
    pub locked: Option<DateTime<Utc>>,

    pub recover_token: String,
    pub recover_token_expiry: Option<DateTime<Utc>>,

    pub oauth2_uid: String,
    pub oauth2_provider: String,
    #[serde(skip_serializing)]
    pub oauth2_access_token: String,
    #[serde(skip_serializing)]
    pub oauth2_refresh_token: String,
    pub oauth2_expiry: Option<DateTime<Utc>>,
}

impl User {
    /// Identity key the record is stored under.
    #[inline]
    pub fn key(&self) -> &str {
        &self.email
    }

    /// OAuth2 `(provider, uid)` pair, if the record is linked to a provider.
    pub(crate) fn oauth2_pair(&self) -> Option<(String, String)> {
        if self.oauth2_uid.is_empty() {
            None
        } else {
            Some((self.oauth2_provider.clone(), self.oauth2_uid.clone()))
        }
    }
}
