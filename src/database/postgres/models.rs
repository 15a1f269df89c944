//! Database models for PostgreSQL.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::user::User;

/// User record as stored in the database.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password: String,
    pub confirm_token: String,
    pub confirmed: bool,
    pub attempt_count: i32,
    pub last_attempt: Option<DateTime<Utc>>,
    pub locked: Option<DateTime<Utc>>,
    pub recover_token: String,
    pub recover_token_expiry: Option<DateTime<Utc>>,
    pub oauth2_uid: String,
    pub oauth2_provider: String,
    pub oauth2_access_token: String,
    pub oauth2_refresh_token: String,
    pub oauth2_expiry: Option<DateTime<Utc>>,
}

/// Columns selected for a [`UserRecord`].
pub const USER_COLUMNS: &str = r#"
    id, email, name, password, confirm_token, confirmed,
    attempt_count, last_attempt, locked,
    recover_token, recover_token_expiry,
    oauth2_uid, oauth2_provider, oauth2_access_token,
    oauth2_refresh_token, oauth2_expiry
"#;

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: u64::try_from(r.id).ok(),
            name: r.name,
            email: r.email,
            password: r.password,
            confirm_token: r.confirm_token,
            confirmed: r.confirmed,
            attempt_count: u32::try_from(r.attempt_count).unwrap_or_default(),
            last_attempt: r.last_attempt,
            locked: r.locked,
            recover_token: r.recover_token,
            recover_token_expiry: r.recover_token_expiry,
            oauth2_uid: r.oauth2_uid,
            oauth2_provider: r.oauth2_provider,
            oauth2_access_token: r.oauth2_access_token,
            oauth2_refresh_token: r.oauth2_refresh_token,
            oauth2_expiry: r.oauth2_expiry,
        }
    }
}
