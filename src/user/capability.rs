//! Capabilities an authentication framework expects from a user record.
//!
//! Each module of the framework (authentication, confirmation, lockout,
//! recovery, OAuth2) only sees the trait it needs. [`User`] implements all
//! of them so the store never has to guess the concrete type.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::user::User;

/// Key of the only arbitrary attribute kept on [`User`].
pub const ARBITRARY_NAME: &str = "name";

/// Basic identity.
pub trait AuthableUser {
    fn pid(&self) -> &str;
    fn put_pid(&mut self, pid: &str);
    fn password(&self) -> &str;
    fn put_password(&mut self, password: &str);
}

/// Email confirmation state.
pub trait ConfirmableUser: AuthableUser {
    fn email(&self) -> &str;
    fn put_email(&mut self, email: &str);
    fn confirmed(&self) -> bool;
    fn put_confirmed(&mut self, confirmed: bool);
    fn confirm_token(&self) -> &str;
    fn put_confirm_token(&mut self, token: &str);
}

/// Failed-attempt bookkeeping.
pub trait LockableUser: AuthableUser {
    fn attempt_count(&self) -> u32;
    fn put_attempt_count(&mut self, attempts: u32);
    fn last_attempt(&self) -> Option<DateTime<Utc>>;
    fn put_last_attempt(&mut self, last: DateTime<Utc>);
    fn locked(&self) -> Option<DateTime<Utc>>;
    /// `None` unlocks the account.
    fn put_locked(&mut self, locked: Option<DateTime<Utc>>);
}

/// Password recovery state.
pub trait RecoverableUser: AuthableUser {
    fn recover_token(&self) -> &str;
    fn put_recover_token(&mut self, token: &str);
    fn recover_expiry(&self) -> Option<DateTime<Utc>>;
    fn put_recover_expiry(&mut self, expiry: Option<DateTime<Utc>>);
}

/// Identity linked to an OAuth2 provider.
pub trait OAuth2User: AuthableUser {
    fn is_oauth2_user(&self) -> bool;
    fn oauth2_uid(&self) -> &str;
    fn put_oauth2_uid(&mut self, uid: &str);
    fn oauth2_provider(&self) -> &str;
    fn put_oauth2_provider(&mut self, provider: &str);
    fn oauth2_access_token(&self) -> &str;
    fn put_oauth2_access_token(&mut self, token: &str);
    fn oauth2_refresh_token(&self) -> &str;
    fn put_oauth2_refresh_token(&mut self, token: &str);
    fn oauth2_expiry(&self) -> Option<DateTime<Utc>>;
    fn put_oauth2_expiry(&mut self, expiry: DateTime<Utc>);
}

/// Free-form attributes collected at registration.
pub trait ArbitraryUser {
    fn arbitrary(&self) -> HashMap<String, String>;
    fn put_arbitrary(&mut self, values: &HashMap<String, String>);
}

impl AuthableUser for User {
    fn pid(&self) -> &str {
        &self.email
    }

    fn put_pid(&mut self, pid: &str) {
        self.email = pid.to_owned();
    }

    fn password(&self) -> &str {
        &self.password
    }

    fn put_password(&mut self, password: &str) {
        self.password = password.to_owned();
    }
}

impl ConfirmableUser for User {
    fn email(&self) -> &str {
        &self.email
    }

    fn put_email(&mut self, email: &str) {
        self.email = email.to_owned();
    }

    fn confirmed(&self) -> bool {
        self.confirmed
    }

    fn put_confirmed(&mut self, confirmed: bool) {
        self.confirmed = confirmed;
    }

    fn confirm_token(&self) -> &str {
        &self.confirm_token
    }

    fn put_confirm_token(&mut self, token: &str) {
        self.confirm_token = token.to_owned();
    }
}

impl LockableUser for User {
    fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    fn put_attempt_count(&mut self, attempts: u32) {
        self.attempt_count = attempts;
    }

    fn last_attempt(&self) -> Option<DateTime<Utc>> {
        self.last_attempt
    }

    fn put_last_attempt(&mut self, last: DateTime<Utc>) {
        self.last_attempt = Some(last);
    }

    fn locked(&self) -> Option<DateTime<Utc>> {
        self.locked
    }

    fn put_locked(&mut self, locked: Option<DateTime<Utc>>) {
        self.locked = locked;
    }
}

impl RecoverableUser for User {
    fn recover_token(&self) -> &str {
        &self.recover_token
    }

    fn put_recover_token(&mut self, token: &str) {
        self.recover_token = token.to_owned();
    }

    fn recover_expiry(&self) -> Option<DateTime<Utc>> {
        self.recover_token_expiry
    }

    fn put_recover_expiry(&mut self, expiry: Option<DateTime<Utc>>) {
        self.recover_token_expiry = expiry;
    }
}

impl OAuth2User for User {
    fn is_oauth2_user(&self) -> bool {
        !self.oauth2_uid.is_empty()
    }

    fn oauth2_uid(&self) -> &str {
        &self.oauth2_uid
    }

    fn put_oauth2_uid(&mut self, uid: &str) {
        self.oauth2_uid = uid.to_owned();
    }

    fn oauth2_provider(&self) -> &str {
        &self.oauth2_provider
    }

    fn put_oauth2_provider(&mut self, provider: &str) {
        self.oauth2_provider = provider.to_owned();
    }

    fn oauth2_access_token(&self) -> &str {
        &self.oauth2_access_token
    }

    fn put_oauth2_access_token(&mut self, token: &str) {
        self.oauth2_access_token = token.to_owned();
    }

    fn oauth2_refresh_token(&self) -> &str {
        &self.oauth2_refresh_token
    }

    fn put_oauth2_refresh_token(&mut self, token: &str) {
        self.oauth2_refresh_token = token.to_owned();
    }

    fn oauth2_expiry(&self) -> Option<DateTime<Utc>> {
        self.oauth2_expiry
    }

    fn put_oauth2_expiry(&mut self, expiry: DateTime<Utc>) {
        self.oauth2_expiry = Some(expiry);
    }
}

impl ArbitraryUser for User {
    fn arbitrary(&self) -> HashMap<String, String> {
        HashMap::from([(ARBITRARY_NAME.to_owned(), self.name.clone())])
    }

    fn put_arbitrary(&mut self, values: &HashMap<String, String>) {
        if let Some(name) = values.get(ARBITRARY_NAME) {
            self.name = name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives a record through the transitions a framework would apply.
    #[test]
    fn test_framework_transitions() {
        let mut user = User::default();
        user.put_pid("alice@example.com");
        user.put_password("$argon2id$v=19$m=65536,t=4,p=2$c2FsdA$aGFzaA");
        user.put_confirm_token("confirm-me");
        assert!(!ConfirmableUser::confirmed(&user));

        user.put_confirmed(true);
        user.put_confirm_token("");
        assert!(ConfirmableUser::confirmed(&user));
        assert_eq!(ConfirmableUser::email(&user), "alice@example.com");

        let now = Utc::now();
        user.put_attempt_count(3);
        user.put_last_attempt(now);
        user.put_locked(Some(now + chrono::Duration::minutes(10)));
        assert!(LockableUser::locked(&user).is_some());
        user.put_locked(None);
        assert!(LockableUser::locked(&user).is_none());
        assert_eq!(LockableUser::attempt_count(&user), 3);

        user.put_recover_token("recover-me");
        user.put_recover_expiry(Some(now));
        assert_eq!(RecoverableUser::recover_token(&user), "recover-me");
        user.put_recover_token("");
        user.put_recover_expiry(None);
        assert!(user.recover_expiry().is_none());
    }

    #[test]
    fn test_oauth2_user() {
        let mut user = User::default();
        assert!(!user.is_oauth2_user());

        user.put_oauth2_provider("google");
        user.put_oauth2_uid("42");
        user.put_oauth2_access_token("access");
        user.put_oauth2_refresh_token("refresh");
        assert!(user.is_oauth2_user());
        assert_eq!(OAuth2User::oauth2_uid(&user), "42");
        assert_eq!(OAuth2User::oauth2_refresh_token(&user), "refresh");
    }

    #[test]
    fn test_arbitrary() {
        let mut user = User::default();
        user.put_arbitrary(&HashMap::from([
            ("name".to_owned(), "Rick".to_owned()),
            ("ignored".to_owned(), "value".to_owned()),
        ]));

        assert_eq!(user.name, "Rick");
        assert_eq!(user.arbitrary().get("name").map(String::as_str), Some("Rick"));

        user.put_arbitrary(&HashMap::new());
        assert_eq!(user.name, "Rick");
    }
}
