//! Error handler for credstore.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Enum representing storage errors.
///
/// The first four variants are the sentinels an authentication framework
/// matches on. They are returned verbatim and never retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,
    #[error("user already exists")]
    AlreadyExists,
    #[error("remember token not found")]
    TokenNotFound,
    #[error("unknown oauth2 provider {provider}")]
    UnsupportedProvider { provider: String },

    #[error("identity key must not be empty")]
    InvalidKey,
    #[error("missing oauth2 attribute `{name}`")]
    MissingAttribute { name: &'static str },
    #[error("{operation} exceeded its deadline")]
    Timeout { operation: &'static str },
    #[error("`{field}` does not fit the store")]
    OutOfRange { field: &'static str },

    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[cfg(feature = "postgres")]
    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),
    #[cfg(feature = "postgres")]
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Short label used on metrics and logs.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            StoreError::NotFound => "not_found",
            StoreError::AlreadyExists => "already_exists",
            StoreError::TokenNotFound => "token_not_found",
            StoreError::UnsupportedProvider { .. } => "unsupported_provider",
            StoreError::InvalidKey => "invalid_key",
            StoreError::MissingAttribute { .. } => "missing_attribute",
            StoreError::Timeout { .. } => "timeout",
            StoreError::OutOfRange { .. } => "out_of_range",
            StoreError::Config(_) => "config",
            #[cfg(feature = "postgres")]
            StoreError::Sql(_) | StoreError::Migrate(_) => "backend",
        }
    }
}
