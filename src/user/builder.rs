//! Builder for `User`.

use chrono::{DateTime, Utc};

use crate::user::User;

/// Builds a [`User`] around a mandatory identity key.
#[derive(Debug, Clone)]
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    /// Creates a new [`UserBuilder`] for the given email (PID).
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            user: User {
                email: email.into(),
                ..Default::default()
            },
        }
    }

    /// Sets the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.user.name = name.into();
        self
    }

    /// Sets the hashed password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.user.password = password.into();
        self
    }

    /// Marks the account as confirmed.
    pub fn confirmed(mut self, confirmed: bool) -> Self {
        self.user.confirmed = confirmed;
        self
    }

    /// Sets a pending confirmation token.
    pub fn confirm_token(mut self, token: impl Into<String>) -> Self {
        self.user.confirm_token = token.into();
        self
    }

    /// Sets a recovery token and its expiry.
    pub fn recover_token(
        mut self,
        token: impl Into<String>,
        expiry: DateTime<Utc>,
    ) -> Self {
        self.user.recover_token = token.into();
        self.user.recover_token_expiry = Some(expiry);
        self
    }

    /// Locks the account until `until`.
    pub fn locked(mut self, until: DateTime<Utc>) -> Self {
        self.user.locked = Some(until);
        self
    }

    /// Links the account to an OAuth2 provider identity.
    pub fn oauth2(
        mut self,
        provider: impl Into<String>,
        uid: impl Into<String>,
    ) -> Self {
        self.user.oauth2_provider = provider.into();
        self.user.oauth2_uid = uid.into();
        self
    }

    pub fn build(self) -> User {
        self.user
    }
}
