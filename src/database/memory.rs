//! In-memory store.
//!
//! Users, remember tokens and every secondary index live behind a single
//! [`RwLock`], so uniqueness checks and token consumption are linearizable.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::Configuration;
use crate::error::{Result, StoreError};
use crate::storer::{
    ConfirmingServerStorer, CreatingServerStorer, OAuth2ServerStorer,
    RecoveringServerStorer, RememberingServerStorer, ServerStorer,
    oauth2_user, redact,
};
use crate::telemetry::track;
use crate::user::User;
use crate::user::oauth2::OAuth2Pid;

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    users: HashMap<String, User>,
    tokens: HashMap<String, Vec<String>>,
    by_id: HashMap<u64, String>,
    by_oauth2: HashMap<(String, String), String>,
    by_confirm_token: HashMap<String, String>,
    by_recover_token: HashMap<String, String>,
}

impl State {
    fn allocate_id(&mut self) -> Result<u64> {
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(StoreError::OutOfRange { field: "id" })?;
        Ok(self.next_id)
    }

    /// Check that the secondary keys of `user` are free or already owned
    /// by the record stored under `owner`.
    fn check_unique(&self, user: &User, owner: Option<&str>) -> Result<()> {
        let taken = |holder: Option<&String>| {
            holder.is_some_and(|h| Some(h.as_str()) != owner)
        };

        if let Some(pair) = user.oauth2_pair() {
            if taken(self.by_oauth2.get(&pair)) {
                return Err(StoreError::AlreadyExists);
            }
        }
        if !user.confirm_token.is_empty()
            && taken(self.by_confirm_token.get(&user.confirm_token))
        {
            return Err(StoreError::AlreadyExists);
        }
        if !user.recover_token.is_empty()
            && taken(self.by_recover_token.get(&user.recover_token))
        {
            return Err(StoreError::AlreadyExists);
        }

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Option<User> {
        let user = self.users.remove(key)?;

        if let Some(id) = user.id {
            self.by_id.remove(&id);
        }
        if let Some(pair) = user.oauth2_pair() {
            self.by_oauth2.remove(&pair);
        }
        if !user.confirm_token.is_empty() {
            self.by_confirm_token.remove(&user.confirm_token);
        }
        if !user.recover_token.is_empty() {
            self.by_recover_token.remove(&user.recover_token);
        }

        Some(user)
    }

    /// Insert `user`; the caller has already released its key and checked
    /// uniqueness.
    fn insert(&mut self, user: User) {
        let key = user.email.clone();

        if let Some(id) = user.id {
            self.next_id = self.next_id.max(id);
            self.by_id.insert(id, key.clone());
        }
        if let Some(pair) = user.oauth2_pair() {
            self.by_oauth2.insert(pair, key.clone());
        }
        if !user.confirm_token.is_empty() {
            self.by_confirm_token
                .insert(user.confirm_token.clone(), key.clone());
        }
        if !user.recover_token.is_empty() {
            self.by_recover_token
                .insert(user.recover_token.clone(), key.clone());
        }

        self.users.insert(key, user);
    }

    /// Insert a new user, refusing any key already in use.
    fn create(&mut self, user: &mut User) -> Result<()> {
        if user.email.is_empty() {
            return Err(StoreError::InvalidKey);
        }
        if self.users.contains_key(&user.email)
            || user.id.is_some_and(|id| self.by_id.contains_key(&id))
        {
            return Err(StoreError::AlreadyExists);
        }
        self.check_unique(user, None)?;

        if user.id.is_none() {
            user.id = Some(self.allocate_id()?);
        }
        self.insert(user.clone());

        Ok(())
    }

    /// Upsert keyed by the surrogate id, moving the record (and its remember
    /// tokens) when its email changed.
    fn upsert(&mut self, user: &User) -> Result<()> {
        if user.email.is_empty() {
            return Err(StoreError::InvalidKey);
        }

        let previous_key = user.id.and_then(|id| self.by_id.get(&id).cloned());
        let mut user = user.clone();

        match previous_key {
            Some(old) if old != user.email => {
                if self.users.contains_key(&user.email) {
                    return Err(StoreError::AlreadyExists);
                }
                self.check_unique(&user, Some(old.as_str()))?;

                self.remove(&old);
                if let Some(tokens) = self.tokens.remove(&old) {
                    self.tokens
                        .entry(user.email.clone())
                        .or_default()
                        .extend(tokens);
                }
                tracing::debug!(from = %old, to = %user.email, "user rekeyed");
            },
            _ => {
                self.check_unique(&user, Some(user.email.as_str()))?;

                // Overwriting a slot keeps its identifier.
                if let Some(stored) = self.remove(&user.email) {
                    user.id = stored.id;
                }
                if user.id.is_none() {
                    user.id = Some(self.allocate_id()?);
                }
            },
        }

        self.insert(user);
        Ok(())
    }
}

/// Store holding users in memory for the lifetime of the instance.
#[derive(Debug)]
pub struct MemStorer {
    state: RwLock<State>,
    providers: Vec<String>,
}

impl Default for MemStorer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStorer {
    /// Create an empty [`MemStorer`] accepting the default providers.
    pub fn new() -> Self {
        Self::with_providers(Configuration::default().providers)
    }

    /// Create an empty [`MemStorer`] accepting the given OAuth2 providers.
    pub fn with_providers(providers: Vec<String>) -> Self {
        Self {
            state: RwLock::new(State::default()),
            providers,
        }
    }

    /// Create a [`MemStorer`] and insert the configured seed users.
    pub fn from_config(config: &Configuration) -> Result<Self> {
        let mut state = State::default();

        for seed in &config.seed {
            state.create(&mut seed.clone())?;
        }

        tracing::info!(users = state.users.len(), "memory store seeded");

        Ok(Self {
            state: RwLock::new(state),
            providers: config.providers.clone(),
        })
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ServerStorer for MemStorer {
    async fn load(&self, key: &str) -> Result<User> {
        let state = self.state.read().await;

        let found = match OAuth2Pid::parse(key) {
            Some(pid) => state
                .by_oauth2
                .get(&(pid.provider, pid.uid))
                .and_then(|email| state.users.get(email)),
            None => state.users.get(key),
        };

        let result = match found {
            Some(user) => {
                tracing::debug!(email = %user.email, %key, "loaded user");
                Ok(user.clone())
            },
            None => {
                tracing::debug!(%key, "user not found");
                Err(StoreError::NotFound)
            },
        };

        track("load", result)
    }

    async fn save(&self, user: &User) -> Result<()> {
        let result = self.state.write().await.upsert(user);
        if result.is_ok() {
            tracing::debug!(email = %user.email, name = %user.name, "saved user");
        }

        track("save", result)
    }
}

#[async_trait]
impl CreatingServerStorer for MemStorer {
    async fn create(&self, user: &mut User) -> Result<()> {
        let result = self.state.write().await.create(user);

        match &result {
            Ok(()) => tracing::debug!(email = %user.email, name = %user.name, "created new user"),
            Err(err) => tracing::debug!(email = %user.email, %err, "user creation refused"),
        }

        track("create", result)
    }
}

#[async_trait]
impl ConfirmingServerStorer for MemStorer {
    async fn load_by_confirm_token(&self, token: &str) -> Result<User> {
        let state = self.state.read().await;

        let result = state
            .by_confirm_token
            .get(token)
            .filter(|_| !token.is_empty())
            .and_then(|email| state.users.get(email))
            .cloned()
            .ok_or(StoreError::NotFound);

        if let Ok(user) = &result {
            tracing::debug!(email = %user.email, token = %redact(token), "loaded user by confirm token");
        }

        track("load_by_confirm_token", result)
    }
}

#[async_trait]
impl RecoveringServerStorer for MemStorer {
    async fn load_by_recover_token(&self, token: &str) -> Result<User> {
        let state = self.state.read().await;

        let result = state
            .by_recover_token
            .get(token)
            .filter(|_| !token.is_empty())
            .and_then(|email| state.users.get(email))
            .cloned()
            .ok_or(StoreError::NotFound);

        if let Ok(user) = &result {
            tracing::debug!(email = %user.email, token = %redact(token), "loaded user by recover token");
        }

        track("load_by_recover_token", result)
    }
}

#[async_trait]
impl RememberingServerStorer for MemStorer {
    async fn add_remember_token(&self, pid: &str, token: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let tokens = state.tokens.entry(pid.to_owned()).or_default();
        tokens.push(token.to_owned());

        tracing::debug!(email = %pid, token = %redact(token), count = tokens.len(), "added remember token");

        track("add_remember_token", Ok(()))
    }

    async fn del_remember_tokens(&self, pid: &str) -> Result<()> {
        let removed = self.state.write().await.tokens.remove(pid);

        tracing::debug!(
            email = %pid,
            count = removed.map_or(0, |t| t.len()),
            "deleted remember tokens"
        );

        track("del_remember_tokens", Ok(()))
    }

    async fn use_remember_token(&self, pid: &str, token: &str) -> Result<()> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let result = match state.tokens.get_mut(pid) {
            None => {
                tracing::debug!(email = %pid, "no remember tokens");
                Err(StoreError::TokenNotFound)
            },
            Some(tokens) => match tokens.iter().position(|t| t == token) {
                Some(index) => {
                    tokens.swap_remove(index);
                    if tokens.is_empty() {
                        state.tokens.remove(pid);
                    }
                    tracing::debug!(email = %pid, token = %redact(token), "used remember token");
                    Ok(())
                },
                None => Err(StoreError::TokenNotFound),
            },
        };

        track("use_remember_token", result)
    }
}

#[async_trait]
impl OAuth2ServerStorer for MemStorer {
    async fn new_from_oauth2(
        &self,
        provider: &str,
        details: &HashMap<String, String>,
    ) -> Result<User> {
        let existing = match details.get(crate::user::oauth2::OAUTH2_EMAIL) {
            Some(email) => self.state.read().await.users.get(email).cloned(),
            None => None,
        };

        let result = oauth2_user(&self.providers, provider, details, existing);
        if let Ok(user) = &result {
            tracing::debug!(email = %user.email, %provider, linked = user.id.is_some(), "built oauth2 user");
        }

        track("new_from_oauth2", result)
    }

    async fn save_oauth2(&self, user: &User) -> Result<()> {
        let result = self.state.write().await.upsert(user);
        if result.is_ok() {
            tracing::debug!(email = %user.email, provider = %user.oauth2_provider, "saved oauth2 user");
        }

        track("save_oauth2", result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::user::UserBuilder;

    fn alice() -> User {
        UserBuilder::new("alice@example.com")
            .name("Alice")
            .password("$argon2id$v=19$m=65536,t=4,p=2$c2FsdA$aGFzaA")
            .confirmed(true)
            .build()
    }

    async fn seeded() -> MemStorer {
        let store = MemStorer::new();
        store.create(&mut alice()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let store = MemStorer::new();
        let mut user = alice();

        store.create(&mut user).await.unwrap();
        assert!(user.id.is_some());

        let loaded = store.load("alice@example.com").await.unwrap();
        assert_eq!(loaded, user);
        assert!(loaded.confirmed);

        assert!(matches!(
            store.load("bob@example.com").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_duplicate_keeps_first() {
        let store = seeded().await;

        let mut impostor = UserBuilder::new("alice@example.com")
            .name("Mallory")
            .build();
        assert!(matches!(
            store.create(&mut impostor).await,
            Err(StoreError::AlreadyExists)
        ));

        let loaded = store.load("alice@example.com").await.unwrap();
        assert_eq!(loaded.name, "Alice");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_key() {
        let store = MemStorer::new();
        let mut blank = store.new_user();

        assert!(matches!(
            store.create(&mut blank).await,
            Err(StoreError::InvalidKey)
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_new_user_has_no_side_effect() {
        let store = MemStorer::new();
        let user = store.new_user();

        assert_eq!(user, User::default());
        assert!(store.is_empty().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_single_winner() {
        let store = Arc::new(MemStorer::new());

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let mut user = UserBuilder::new("race@example.com")
                        .name(format!("racer {i}"))
                        .build();
                    store.create(&mut user).await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => created += 1,
                Err(err) => assert!(matches!(err, StoreError::AlreadyExists)),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_loaded_copy_is_detached() {
        let store = seeded().await;

        let mut user = store.load("alice@example.com").await.unwrap();
        user.attempt_count = 3;
        user.locked = Some(Utc::now() + Duration::minutes(5));
        assert!(store.load("alice@example.com").await.unwrap().locked.is_none());

        store.save(&user).await.unwrap();
        assert!(store.load("alice@example.com").await.unwrap().locked.is_some());
    }

    #[tokio::test]
    async fn test_save_upserts_unknown_user() {
        let store = MemStorer::new();
        let user = UserBuilder::new("new@example.com").build();

        store.save(&user).await.unwrap();
        let loaded = store.load("new@example.com").await.unwrap();
        assert!(loaded.id.is_some());

        // Overwriting the slot keeps the stored identifier.
        let again = UserBuilder::new("new@example.com").name("New").build();
        store.save(&again).await.unwrap();
        let reloaded = store.load("new@example.com").await.unwrap();
        assert_eq!(reloaded.id, loaded.id);
        assert_eq!(reloaded.name, "New");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_rekeys_on_email_change() {
        let store = seeded().await;
        store
            .add_remember_token("alice@example.com", "cookie")
            .await
            .unwrap();

        let mut user = store.load("alice@example.com").await.unwrap();
        user.email = "alice@new.example.com".into();
        store.save(&user).await.unwrap();

        assert!(matches!(
            store.load("alice@example.com").await,
            Err(StoreError::NotFound)
        ));
        let moved = store.load("alice@new.example.com").await.unwrap();
        assert_eq!(moved.id, user.id);
        assert_eq!(store.len().await, 1);

        assert!(matches!(
            store.use_remember_token("alice@example.com", "cookie").await,
            Err(StoreError::TokenNotFound)
        ));
        store
            .use_remember_token("alice@new.example.com", "cookie")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_save_rename_onto_taken_key() {
        let store = seeded().await;
        store
            .create(&mut UserBuilder::new("bob@example.com").build())
            .await
            .unwrap();

        let mut bob = store.load("bob@example.com").await.unwrap();
        bob.email = "alice@example.com".into();

        assert!(matches!(
            store.save(&bob).await,
            Err(StoreError::AlreadyExists)
        ));
        assert_eq!(store.load("alice@example.com").await.unwrap().name, "Alice");
        assert!(store.load("bob@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_rename_merges_remember_tokens() {
        let store = MemStorer::new();
        store
            .create(&mut UserBuilder::new("a@x.com").build())
            .await
            .unwrap();
        store.add_remember_token("a@x.com", "mine").await.unwrap();
        store.add_remember_token("b@x.com", "stale").await.unwrap();

        let mut user = store.load("a@x.com").await.unwrap();
        user.email = "b@x.com".into();
        store.save(&user).await.unwrap();

        store.use_remember_token("b@x.com", "mine").await.unwrap();
        store.use_remember_token("b@x.com", "stale").await.unwrap();
        assert!(matches!(
            store.use_remember_token("a@x.com", "mine").await,
            Err(StoreError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_exhausted_ids_are_refused() {
        let store = MemStorer::new();
        let mut last = UserBuilder::new("a@x.com").build();
        last.id = Some(u64::MAX);
        store.create(&mut last).await.unwrap();

        let mut next = UserBuilder::new("b@x.com").build();
        assert!(matches!(
            store.create(&mut next).await,
            Err(StoreError::OutOfRange { field: "id" })
        ));
        assert!(matches!(
            store.save(&UserBuilder::new("c@x.com").build()).await,
            Err(StoreError::OutOfRange { field: "id" })
        ));

        // Existing slots can still be overwritten.
        last.name = "A".into();
        store.save(&last).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_load_by_confirm_token() {
        let store = MemStorer::new();
        store
            .create(
                &mut UserBuilder::new("carol@example.com")
                    .confirm_token("confirm-carol")
                    .build(),
            )
            .await
            .unwrap();

        let user = store.load_by_confirm_token("confirm-carol").await.unwrap();
        assert_eq!(user.email, "carol@example.com");

        assert!(matches!(
            store.load_by_confirm_token("unknown").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.load_by_confirm_token("").await,
            Err(StoreError::NotFound)
        ));

        // Consuming the token clears the index.
        let mut user = user;
        user.confirm_token.clear();
        user.confirmed = true;
        store.save(&user).await.unwrap();
        assert!(matches!(
            store.load_by_confirm_token("confirm-carol").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_confirm_token_must_be_unique() {
        let store = MemStorer::new();
        store
            .create(
                &mut UserBuilder::new("a@example.com")
                    .confirm_token("same")
                    .build(),
            )
            .await
            .unwrap();

        let mut other =
            UserBuilder::new("b@example.com").confirm_token("same").build();
        assert!(matches!(
            store.create(&mut other).await,
            Err(StoreError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_recover_token_must_be_unique() {
        let store = MemStorer::new();
        let expiry = Utc::now() + Duration::hours(1);
        store
            .create(
                &mut UserBuilder::new("a@example.com")
                    .recover_token("same", expiry)
                    .build(),
            )
            .await
            .unwrap();

        let mut other = UserBuilder::new("b@example.com")
            .recover_token("same", expiry)
            .build();
        assert!(matches!(
            store.create(&mut other).await,
            Err(StoreError::AlreadyExists)
        ));

        let mut other = UserBuilder::new("b@example.com").build();
        store.create(&mut other).await.unwrap();
        other.recover_token = "same".into();
        assert!(matches!(
            store.save(&other).await,
            Err(StoreError::AlreadyExists)
        ));
        assert_eq!(
            store.load_by_recover_token("same").await.unwrap().email,
            "a@example.com"
        );
    }

    #[tokio::test]
    async fn test_load_by_recover_token() {
        let store = seeded().await;
        let mut user = store.load("alice@example.com").await.unwrap();
        user.recover_token = "recover-alice".into();
        user.recover_token_expiry = Some(Utc::now() + Duration::hours(1));
        store.save(&user).await.unwrap();

        let loaded = store.load_by_recover_token("recover-alice").await.unwrap();
        assert_eq!(loaded, user);

        assert!(matches!(
            store.load_by_recover_token("recover-bob").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.load_by_recover_token("").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_remember_token_is_consumed_once() {
        let store = seeded().await;
        let pid = "alice@example.com";

        store.add_remember_token(pid, "t1").await.unwrap();
        store.add_remember_token(pid, "t1").await.unwrap();
        store.add_remember_token(pid, "t2").await.unwrap();

        store.use_remember_token(pid, "t1").await.unwrap();
        store.use_remember_token(pid, "t1").await.unwrap();
        assert!(matches!(
            store.use_remember_token(pid, "t1").await,
            Err(StoreError::TokenNotFound)
        ));
        store.use_remember_token(pid, "t2").await.unwrap();
        assert!(matches!(
            store.use_remember_token(pid, "t2").await,
            Err(StoreError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_del_remember_tokens() {
        let store = seeded().await;
        let pid = "alice@example.com";

        // Nothing to delete is not an error.
        store.del_remember_tokens(pid).await.unwrap();

        store.add_remember_token(pid, "t1").await.unwrap();
        store.add_remember_token(pid, "t2").await.unwrap();
        store.del_remember_tokens(pid).await.unwrap();

        assert!(matches!(
            store.use_remember_token(pid, "t1").await,
            Err(StoreError::TokenNotFound)
        ));
        assert!(matches!(
            store.use_remember_token("nobody@example.com", "t1").await,
            Err(StoreError::TokenNotFound)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_use_remember_token() {
        let store = Arc::new(seeded().await);
        store
            .add_remember_token("alice@example.com", "cookie")
            .await
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .use_remember_token("alice@example.com", "cookie")
                        .await
                })
            })
            .collect();

        let mut used = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                used += 1;
            }
        }
        assert_eq!(used, 1);
    }

    #[tokio::test]
    async fn test_oauth2_flow() {
        let store = MemStorer::new();
        let details = HashMap::from([
            ("email".to_owned(), "c@x.com".to_owned()),
            ("uid".to_owned(), "42".to_owned()),
        ]);

        let user = store.new_from_oauth2("google", &details).await.unwrap();
        assert!(user.confirmed);
        assert_eq!(user.oauth2_uid, "42");
        assert!(store.is_empty().await);

        store.save_oauth2(&user).await.unwrap();

        let loaded = store.load("oauth2;;google;;42").await.unwrap();
        assert_eq!(loaded.email, "c@x.com");
        assert_eq!(loaded.oauth2_provider, "google");
        assert!(matches!(
            store.load("oauth2;;google;;43").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_oauth2_links_existing_user() {
        let store = seeded().await;
        let details = HashMap::from([
            ("email".to_owned(), "alice@example.com".to_owned()),
            ("uid".to_owned(), "1337".to_owned()),
            ("name".to_owned(), "Alice G.".to_owned()),
        ]);

        let user = store.new_from_oauth2("google", &details).await.unwrap();
        let original = store.load("alice@example.com").await.unwrap();
        assert_eq!(user.id, original.id);
        assert_eq!(user.password, original.password);

        store.save_oauth2(&user).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.load("oauth2;;google;;1337").await.unwrap().name,
            "Alice G."
        );
    }

    #[tokio::test]
    async fn test_oauth2_pair_is_unique() {
        let store = MemStorer::new();
        store
            .create(&mut UserBuilder::new("a@x.com").oauth2("google", "1").build())
            .await
            .unwrap();

        let clash = UserBuilder::new("b@x.com").oauth2("google", "1").build();
        assert!(matches!(
            store.save_oauth2(&clash).await,
            Err(StoreError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn test_oauth2_unsupported_provider() {
        let store = MemStorer::with_providers(vec!["github".to_owned()]);
        let details = HashMap::from([
            ("email".to_owned(), "c@x.com".to_owned()),
            ("uid".to_owned(), "42".to_owned()),
        ]);

        assert!(matches!(
            store.new_from_oauth2("google", &details).await,
            Err(StoreError::UnsupportedProvider { .. })
        ));
        assert!(store.new_from_oauth2("github", &details).await.is_ok());
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = Configuration::from_yaml(
            r#"
            seed:
              - id: 1
                name: Rick
                email: rick@councilofricks.com
                password: "$2a$10$XtW/BrS5HeYIuOCXYe8DFuInetDMdaarMUJEOg/VA/JAIDgw3l4aG"
                confirmed: true
              - name: Morty
                email: morty@councilofricks.com
            "#,
        )
        .unwrap();

        let store = MemStorer::from_config(&config).unwrap();
        assert_eq!(store.len().await, 2);

        let rick = store.load("rick@councilofricks.com").await.unwrap();
        assert_eq!(rick.id, Some(1));
        assert!(rick.confirmed);

        let morty = store.load("morty@councilofricks.com").await.unwrap();
        assert_eq!(morty.id, Some(2));
        assert!(!morty.confirmed);
    }

    #[test]
    fn test_from_config_duplicate_seed() {
        let config = Configuration::from_yaml(
            r#"
            seed:
              - email: rick@councilofricks.com
              - email: rick@councilofricks.com
            "#,
        )
        .unwrap();

        assert!(matches!(
            MemStorer::from_config(&config),
            Err(StoreError::AlreadyExists)
        ));
    }

    #[test]
    fn test_from_config_duplicate_seed_id() {
        let config = Configuration::from_yaml(
            r#"
            seed:
              - id: 1
                email: rick@councilofricks.com
              - id: 1
                email: morty@councilofricks.com
            "#,
        )
        .unwrap();

        assert!(matches!(
            MemStorer::from_config(&config),
            Err(StoreError::AlreadyExists)
        ));
    }
}
