//! Deadline enforcement for any backend.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::storer::{
    ConfirmingServerStorer, CreatingServerStorer, OAuth2ServerStorer,
    RecoveringServerStorer, RememberingServerStorer, ServerStorer,
};
use crate::user::User;

/// Wraps a store and fails any operation that outlives `timeout`.
///
/// An operation cut short is dropped at its next suspension point. For
/// [`MemStorer`](super::MemStorer) that means before the lock is taken, so
/// no partial write is observable.
#[derive(Debug, Clone)]
pub struct TimeoutStorer<S> {
    inner: S,
    timeout: Duration,
}

impl<S> TimeoutStorer<S> {
    /// Create a new [`TimeoutStorer`].
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn run<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, timeout = ?self.timeout, "store operation timed out");
                Err(StoreError::Timeout { operation })
            },
        }
    }
}

#[async_trait]
impl<S: ServerStorer> ServerStorer for TimeoutStorer<S> {
    async fn load(&self, key: &str) -> Result<User> {
        self.run("load", self.inner.load(key)).await
    }

    async fn save(&self, user: &User) -> Result<()> {
        self.run("save", self.inner.save(user)).await
    }
}

#[async_trait]
impl<S: CreatingServerStorer> CreatingServerStorer for TimeoutStorer<S> {
    fn new_user(&self) -> User {
        self.inner.new_user()
    }

    async fn create(&self, user: &mut User) -> Result<()> {
        self.run("create", self.inner.create(user)).await
    }
}

#[async_trait]
impl<S: ConfirmingServerStorer> ConfirmingServerStorer for TimeoutStorer<S> {
    async fn load_by_confirm_token(&self, token: &str) -> Result<User> {
        self.run(
            "load_by_confirm_token",
            self.inner.load_by_confirm_token(token),
        )
        .await
    }
}

#[async_trait]
impl<S: RecoveringServerStorer> RecoveringServerStorer for TimeoutStorer<S> {
    async fn load_by_recover_token(&self, token: &str) -> Result<User> {
        self.run(
            "load_by_recover_token",
            self.inner.load_by_recover_token(token),
        )
        .await
    }
}

#[async_trait]
impl<S: RememberingServerStorer> RememberingServerStorer for TimeoutStorer<S> {
    async fn add_remember_token(&self, pid: &str, token: &str) -> Result<()> {
        self.run(
            "add_remember_token",
            self.inner.add_remember_token(pid, token),
        )
        .await
    }

    async fn del_remember_tokens(&self, pid: &str) -> Result<()> {
        self.run("del_remember_tokens", self.inner.del_remember_tokens(pid))
            .await
    }

    async fn use_remember_token(&self, pid: &str, token: &str) -> Result<()> {
        self.run(
            "use_remember_token",
            self.inner.use_remember_token(pid, token),
        )
        .await
    }
}

#[async_trait]
impl<S: OAuth2ServerStorer> OAuth2ServerStorer for TimeoutStorer<S> {
    async fn new_from_oauth2(
        &self,
        provider: &str,
        details: &HashMap<String, String>,
    ) -> Result<User> {
        self.run(
            "new_from_oauth2",
            self.inner.new_from_oauth2(provider, details),
        )
        .await
    }

    async fn save_oauth2(&self, user: &User) -> Result<()> {
        self.run("save_oauth2", self.inner.save_oauth2(user)).await
    }
}
