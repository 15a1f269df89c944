//! Storage backends.

mod memory;
#[cfg(feature = "postgres")]
mod postgres;
mod timeout;

pub use memory::MemStorer;
#[cfg(feature = "postgres")]
pub use postgres::{
    DEFAULT_CREDENTIALS, DEFAULT_DATABASE_NAME, DEFAULT_POOL_SIZE, PgStorer,
};
pub use timeout::TimeoutStorer;
