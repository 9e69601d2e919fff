use std::{path::PathBuf, str::FromStr, time::Duration};

use eventdesk_event::CreateEventInput;
use eventdesk_shared::{Money, State};
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
pub fn event_input(title: &str, date: &str, max_participants: i64) -> CreateEventInput {
    CreateEventInput {
        title: title.to_owned(),
        description: format!("{title} description"),
        date: date.to_owned(),
        time: "18:00".to_owned(),
        venue: "Main hall".to_owned(),
        category: "tech".to_owned(),
        price: Money::ZERO,
        is_paid: false,
        max_participants,
        registration_deadline: None,
    }
}
