mod caller;
mod error;
mod money;
mod types;
pub mod serde_fmt;
pub mod validation;

pub use caller::*;
pub use error::*;
pub use money::*;
pub use types::*;

#[derive(Clone)]
pub struct State {
    pub read_db: sqlx::SqlitePool,
    pub write_db: sqlx::SqlitePool,
}

impl State {
    pub fn new(read_db: sqlx::SqlitePool, write_db: sqlx::SqlitePool) -> Self {
        Self { read_db, write_db }
    }

    /// Same pool for reads and writes, used by CLI commands and tests.
    pub fn single(pool: sqlx::SqlitePool) -> Self {
        Self {
            read_db: pool.clone(),
            write_db: pool,
        }
    }
}

/// Current calendar date in UTC, the reference for upcoming listings and
/// registration deadlines.
pub fn today_utc() -> time::Date {
    time::OffsetDateTime::now_utc().date()
}
