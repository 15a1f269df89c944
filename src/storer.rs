//! Storage ports consumed by the authentication framework.
//!
//! Every backend implements the whole set; the framework asks for the
//! narrowest trait each of its modules needs.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::user::User;

/// Load and save users by identity key.
#[async_trait]
pub trait ServerStorer: Send + Sync {
    /// Find a user by PID or by encoded OAuth2 PID.
    ///
    /// The returned record is a copy: mutating it has no effect until it
    /// is saved.
    async fn load(&self, key: &str) -> Result<User>;

    /// Upsert a user under its current PID.
    async fn save(&self, user: &User) -> Result<()>;
}

/// Registration.
#[async_trait]
pub trait CreatingServerStorer: ServerStorer {
    /// Blank, unsaved record for the framework to fill in.
    fn new_user(&self) -> User {
        User::default()
    }

    /// Insert a new user. Fails with `AlreadyExists` if the PID is taken.
    ///
    /// The identifier assigned by the store is written back into `user`.
    async fn create(&self, user: &mut User) -> Result<()>;
}

/// Email confirmation lookups.
#[async_trait]
pub trait ConfirmingServerStorer: ServerStorer {
    async fn load_by_confirm_token(&self, token: &str) -> Result<User>;
}

/// Password recovery lookups.
#[async_trait]
pub trait RecoveringServerStorer: ServerStorer {
    async fn load_by_recover_token(&self, token: &str) -> Result<User>;
}

/// Remember-me token set.
#[async_trait]
pub trait RememberingServerStorer: ServerStorer {
    /// Append a token. Duplicates may coexist.
    async fn add_remember_token(&self, pid: &str, token: &str) -> Result<()>;

    /// Drop every token of `pid`. No-op when there is none.
    async fn del_remember_tokens(&self, pid: &str) -> Result<()>;

    /// Consume exactly one matching token, or fail with `TokenNotFound`.
    async fn use_remember_token(&self, pid: &str, token: &str) -> Result<()>;
}

/// OAuth2 account linking.
#[async_trait]
pub trait OAuth2ServerStorer: ServerStorer {
    /// Build (without saving) the record for a provider callback.
    async fn new_from_oauth2(
        &self,
        provider: &str,
        details: &HashMap<String, String>,
    ) -> Result<User>;

    async fn save_oauth2(&self, user: &User) -> Result<()>;
}

/// Backend implementing every capability.
pub trait FullStorer:
    CreatingServerStorer
    + ConfirmingServerStorer
    + RecoveringServerStorer
    + RememberingServerStorer
    + OAuth2ServerStorer
{
}

impl<T> FullStorer for T where
    T: CreatingServerStorer
        + ConfirmingServerStorer
        + RecoveringServerStorer
        + RememberingServerStorer
        + OAuth2ServerStorer
{
}

/// Shared part of `new_from_oauth2`: check the provider and required
/// attributes, then merge them into `existing` (or a blank record).
pub(crate) fn oauth2_user(
    providers: &[String],
    provider: &str,
    details: &HashMap<String, String>,
    existing: Option<User>,
) -> Result<User> {
    use crate::error::StoreError;
    use crate::user::oauth2::{OAUTH2_EMAIL, OAUTH2_NAME, OAUTH2_UID};

    if !providers.iter().any(|p| p == provider) {
        return Err(StoreError::UnsupportedProvider {
            provider: provider.to_owned(),
        });
    }

    let email = details
        .get(OAUTH2_EMAIL)
        .filter(|e| !e.is_empty())
        .ok_or(StoreError::MissingAttribute { name: OAUTH2_EMAIL })?;
    let uid = details
        .get(OAUTH2_UID)
        .filter(|u| !u.is_empty())
        .ok_or(StoreError::MissingAttribute { name: OAUTH2_UID })?;

    let mut user = existing.unwrap_or_default();
    user.name = details
        .get(OAUTH2_NAME)
        .filter(|n| !n.is_empty())
        .cloned()
        .unwrap_or_else(|| crate::user::UNKNOWN_NAME.to_owned());
    user.email = email.clone();
    user.oauth2_provider = provider.to_owned();
    user.oauth2_uid = uid.clone();
    user.confirmed = true;

    Ok(user)
}

/// Shorten a secret before it reaches the logs.
pub(crate) fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}…")
}
