use std::{path::PathBuf, str::FromStr, time::Duration};

use eventdesk_shared::State;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use sqlx_migrator::{Migrate, Plan};

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<State> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));
    let write_db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts.clone())
        .await?;
    let mut conn = write_db.acquire().await?;
    eventdesk_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;
    drop(conn);

    let read_db = SqlitePool::connect_with(opts).await?;

    Ok(State::new(read_db, write_db))
}

#[allow(dead_code)]
pub async fn insert_event(state: &State, id: &str, title: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"INSERT INTO "event" ("id", "title", "description", "date", "time", "venue", "category", "max_participants", "created_by", "created_at")
        VALUES (?, ?, '', '2099-01-01', '18:00', 'Hall', 'tech', 10, 'admin', 0)"#,
    )
    .bind(id)
    .bind(title)
    .execute(&state.write_db)
    .await?;

    Ok(())
}

#[allow(dead_code)]
pub async fn insert_user(state: &State, id: &str, name: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"INSERT INTO "user" ("id", "name", "email", "password_hash", "role", "created_at")
        VALUES (?, ?, ?, 'x', 'user', 0)"#,
    )
    .bind(id)
    .bind(name)
    .bind(format!("{id}@eventdesk.localhost"))
    .execute(&state.write_db)
    .await?;

    Ok(())
}
