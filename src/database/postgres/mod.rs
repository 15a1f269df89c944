//! PostgreSQL store.
//!
//! Uniqueness (email, OAuth2 pair, confirm and recover tokens) is enforced
//! by the indexes of `migrations/`, so concurrent creations are arbitrated
//! by the database.

mod models;

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};

use self::models::{USER_COLUMNS, UserRecord};
use crate::config::Configuration;
use crate::error::{Result, StoreError};
use crate::storer::{
    ConfirmingServerStorer, CreatingServerStorer, OAuth2ServerStorer,
    RecoveringServerStorer, RememberingServerStorer, ServerStorer,
    oauth2_user, redact,
};
use crate::telemetry::track;
use crate::user::User;
use crate::user::oauth2::{OAUTH2_EMAIL, OAuth2Pid};

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "credstore";
pub const DEFAULT_POOL_SIZE: u32 = 10;

const INSERT_USER: &str = r#"
    INSERT INTO users (
        id, email, name, password, confirm_token, confirmed,
        attempt_count, last_attempt, locked,
        recover_token, recover_token_expiry,
        oauth2_uid, oauth2_provider, oauth2_access_token,
        oauth2_refresh_token, oauth2_expiry
    )
    VALUES (
        COALESCE($1, nextval(pg_get_serial_sequence('users', 'id'))),
        $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16
    )
"#;

const UPSERT_SUFFIX: &str = r#"
    ON CONFLICT (email) DO UPDATE SET
        name = EXCLUDED.name,
        password = EXCLUDED.password,
        confirm_token = EXCLUDED.confirm_token,
        confirmed = EXCLUDED.confirmed,
        attempt_count = EXCLUDED.attempt_count,
        last_attempt = EXCLUDED.last_attempt,
        locked = EXCLUDED.locked,
        recover_token = EXCLUDED.recover_token,
        recover_token_expiry = EXCLUDED.recover_token_expiry,
        oauth2_uid = EXCLUDED.oauth2_uid,
        oauth2_provider = EXCLUDED.oauth2_provider,
        oauth2_access_token = EXCLUDED.oauth2_access_token,
        oauth2_refresh_token = EXCLUDED.oauth2_refresh_token,
        oauth2_expiry = EXCLUDED.oauth2_expiry
"#;

const REKEY_USER: &str = r#"
    UPDATE users SET
        email = $2, name = $3, password = $4, confirm_token = $5,
        confirmed = $6, attempt_count = $7, last_attempt = $8, locked = $9,
        recover_token = $10, recover_token_expiry = $11,
        oauth2_uid = $12, oauth2_provider = $13, oauth2_access_token = $14,
        oauth2_refresh_token = $15, oauth2_expiry = $16
    WHERE id = $1
"#;

const SYNC_SEQUENCE: &str = r#"
    SELECT setval(
        pg_get_serial_sequence('users', 'id'),
        GREATEST((SELECT MAX(id) FROM users), 1)
    )
"#;

/// Store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStorer {
    pool: PgPool,
    providers: Vec<String>,
}

impl PgStorer {
    /// Create a new [`PgStorer`] on an existing pool.
    pub fn new(pool: PgPool, providers: Vec<String>) -> Self {
        Self { pool, providers }
    }

    /// Init database connections.
    pub async fn connect(
        hostname: &str,
        username: &str,
        password: &str,
        db: &str,
        pool: u32,
        providers: Vec<String>,
    ) -> Result<Self> {
        let addr = format!("postgres://{username}:{password}@{hostname}/{db}");
        let pool = PgPoolOptions::new().max_connections(pool);
        let postgres = pool.connect(&addr).await?;

        tracing::info!(%hostname, %db, "postgres connected");

        Ok(Self::new(postgres, providers))
    }

    /// Connect using the `postgres` entry of the configuration.
    ///
    /// Returns `Ok(None)` when the entry is absent.
    pub async fn from_config(config: &Configuration) -> Result<Option<Self>> {
        let Some(pg) = &config.postgres else {
            tracing::warn!("missing `postgres` entry on `credstore.yaml` file");
            return Ok(None);
        };

        let store = Self::connect(
            &pg.address,
            pg.username.as_deref().unwrap_or(DEFAULT_CREDENTIALS),
            pg.password.as_deref().unwrap_or(DEFAULT_CREDENTIALS),
            pg.database.as_deref().unwrap_or(DEFAULT_DATABASE_NAME),
            pg.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
            config.providers.clone(),
        )
        .await?;

        Ok(Some(store))
    }

    /// Execute migrations scripts.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(User::from))
    }

    async fn find_by_token(&self, column: &str, token: &str) -> Result<User> {
        if token.is_empty() {
            return Err(StoreError::NotFound);
        }

        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?
            .map(User::from)
            .ok_or(StoreError::NotFound)
    }

    /// Upsert by id, rekeying the row and its remember tokens on email
    /// change. Runs in one transaction.
    async fn upsert(&self, user: &User) -> Result<()> {
        if user.email.is_empty() {
            return Err(StoreError::InvalidKey);
        }

        let mut tx = self.pool.begin().await?;

        let previous = match user.id.and_then(|id| i64::try_from(id).ok()) {
            Some(id) => {
                sqlx::query_as::<_, (String,)>(
                    "SELECT email FROM users WHERE id = $1 FOR UPDATE",
                )
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
            },
            None => None,
        };

        match previous {
            Some((old,)) if old != user.email => {
                bind_user(sqlx::query(REKEY_USER), user)?
                    .execute(&mut *tx)
                    .await
                    .map_err(conflict)?;
                sqlx::query("UPDATE remember_tokens SET email = $1 WHERE email = $2")
                    .bind(&user.email)
                    .bind(&old)
                    .execute(&mut *tx)
                    .await?;

                tracing::debug!(from = %old, to = %user.email, "user rekeyed");
            },
            _ => {
                // Overwriting an existing row keeps its identifier.
                let query = format!("{INSERT_USER} {UPSERT_SUFFIX}");
                bind_user(sqlx::query(&query), user)?
                    .execute(&mut *tx)
                    .await
                    .map_err(conflict)?;

                if user.id.is_some() {
                    sqlx::query(SYNC_SEQUENCE).execute(&mut *tx).await?;
                }
            },
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Bind `id` then every column of [`User`], in the order of the queries
/// above. Values wider than their column are refused, never clamped.
fn bind_user<'q>(
    query: Query<'q, Postgres, PgArguments>,
    user: &'q User,
) -> Result<Query<'q, Postgres, PgArguments>> {
    let id = user
        .id
        .map(i64::try_from)
        .transpose()
        .map_err(|_| StoreError::OutOfRange { field: "id" })?;
    let attempt_count = i32::try_from(user.attempt_count)
        .map_err(|_| StoreError::OutOfRange { field: "attempt_count" })?;

    Ok(query
        .bind(id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password)
        .bind(&user.confirm_token)
        .bind(user.confirmed)
        .bind(attempt_count)
        .bind(user.last_attempt)
        .bind(user.locked)
        .bind(&user.recover_token)
        .bind(user.recover_token_expiry)
        .bind(&user.oauth2_uid)
        .bind(&user.oauth2_provider)
        .bind(&user.oauth2_access_token)
        .bind(&user.oauth2_refresh_token)
        .bind(user.oauth2_expiry))
}

/// Map unique-index violations to [`StoreError::AlreadyExists`].
fn conflict(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::AlreadyExists
        },
        _ => StoreError::Sql(err),
    }
}

#[async_trait]
impl ServerStorer for PgStorer {
    async fn load(&self, key: &str) -> Result<User> {
        let result = match OAuth2Pid::parse(key) {
            Some(pid) => {
                let query = format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE oauth2_provider = $1 AND oauth2_uid = $2"
                );
                sqlx::query_as::<_, UserRecord>(&query)
                    .bind(&pid.provider)
                    .bind(&pid.uid)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(StoreError::from)
                    .and_then(|r| r.map(User::from).ok_or(StoreError::NotFound))
            },
            None => self
                .find_by_email(key)
                .await
                .and_then(|u| u.ok_or(StoreError::NotFound)),
        };

        match &result {
            Ok(user) => tracing::debug!(email = %user.email, %key, "loaded user"),
            Err(StoreError::NotFound) => tracing::debug!(%key, "user not found"),
            Err(err) => tracing::error!(%key, %err, "failed to load user"),
        }

        track("load", result)
    }

    async fn save(&self, user: &User) -> Result<()> {
        let result = self.upsert(user).await;
        if result.is_ok() {
            tracing::debug!(email = %user.email, name = %user.name, "saved user");
        }

        track("save", result)
    }
}

#[async_trait]
impl CreatingServerStorer for PgStorer {
    async fn create(&self, user: &mut User) -> Result<()> {
        let result: Result<()> = async {
            if user.email.is_empty() {
                return Err(StoreError::InvalidKey);
            }

            let query = format!("{INSERT_USER} RETURNING id");
            let mut tx = self.pool.begin().await?;
            let row = bind_user(sqlx::query(&query), user)?
                .fetch_one(&mut *tx)
                .await
                .map_err(conflict)?;

            if user.id.is_some() {
                sqlx::query(SYNC_SEQUENCE).execute(&mut *tx).await?;
            }
            tx.commit().await?;

            let id: i64 = row.try_get("id")?;
            user.id = u64::try_from(id).ok();
            Ok(())
        }
        .await;

        match &result {
            Ok(()) => tracing::debug!(email = %user.email, name = %user.name, "created new user"),
            Err(err) => tracing::debug!(email = %user.email, %err, "user creation refused"),
        }

        track("create", result)
    }
}

#[async_trait]
impl ConfirmingServerStorer for PgStorer {
    async fn load_by_confirm_token(&self, token: &str) -> Result<User> {
        let result = self.find_by_token("confirm_token", token).await;
        if let Ok(user) = &result {
            tracing::debug!(email = %user.email, token = %redact(token), "loaded user by confirm token");
        }

        track("load_by_confirm_token", result)
    }
}

#[async_trait]
impl RecoveringServerStorer for PgStorer {
    async fn load_by_recover_token(&self, token: &str) -> Result<User> {
        let result = self.find_by_token("recover_token", token).await;
        if let Ok(user) = &result {
            tracing::debug!(email = %user.email, token = %redact(token), "loaded user by recover token");
        }

        track("load_by_recover_token", result)
    }
}

#[async_trait]
impl RememberingServerStorer for PgStorer {
    async fn add_remember_token(&self, pid: &str, token: &str) -> Result<()> {
        let result = sqlx::query(
            r#"INSERT INTO remember_tokens (email, token) VALUES ($1, $2)"#,
        )
        .bind(pid)
        .bind(token)
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(StoreError::from);

        tracing::debug!(email = %pid, token = %redact(token), "added remember token");

        track("add_remember_token", result)
    }

    async fn del_remember_tokens(&self, pid: &str) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM remember_tokens WHERE email = $1"#)
            .bind(pid)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from);

        if let Ok(done) = &result {
            tracing::debug!(email = %pid, count = done.rows_affected(), "deleted remember tokens");
        }

        track("del_remember_tokens", result.map(|_| ()))
    }

    async fn use_remember_token(&self, pid: &str, token: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM remember_tokens
            WHERE id = (
                SELECT id FROM remember_tokens
                WHERE email = $1 AND token = $2
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            "#,
        )
        .bind(pid)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)
        .and_then(|done| {
            if done.rows_affected() == 0 {
                Err(StoreError::TokenNotFound)
            } else {
                Ok(())
            }
        });

        if result.is_ok() {
            tracing::debug!(email = %pid, token = %redact(token), "used remember token");
        }

        track("use_remember_token", result)
    }
}

#[async_trait]
impl OAuth2ServerStorer for PgStorer {
    async fn new_from_oauth2(
        &self,
        provider: &str,
        details: &HashMap<String, String>,
    ) -> Result<User> {
        let result: Result<User> = async {
            let existing = match details.get(OAUTH2_EMAIL) {
                Some(email) => self.find_by_email(email).await?,
                None => None,
            };
            oauth2_user(&self.providers, provider, details, existing)
        }
        .await;

        if let Ok(user) = &result {
            tracing::debug!(email = %user.email, %provider, linked = user.id.is_some(), "built oauth2 user");
        }

        track("new_from_oauth2", result)
    }

    async fn save_oauth2(&self, user: &User) -> Result<()> {
        let result = self.upsert(user).await;
        if result.is_ok() {
            tracing::debug!(email = %user.email, provider = %user.oauth2_provider, "saved oauth2 user");
        }

        track("save_oauth2", result)
    }
}
