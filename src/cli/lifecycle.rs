use eventdesk_shared::{State, today_utc, validation::parse_date};
use time::Duration;

#[tracing::instrument(skip(config))]
pub async fn reconcile(config: eventdesk::Config) -> anyhow::Result<()> {
    let pool = eventdesk::db::create_pool(&config.database.url, 1).await?;
    let lifecycle = eventdesk::build_lifecycle(&config, State::single(pool))?;

    let report = lifecycle.reconcile().await?;

    tracing::info!(repaired = report.repaired, "reconciliation finished");
    for registration_id in &report.cancelled_with_payment {
        tracing::warn!(%registration_id, "cancelled registration holds a successful payment");
    }

    Ok(())
}

/// Sends reminders for the events on `date`, tomorrow when omitted.
#[tracing::instrument(skip(config))]
pub async fn remind(config: eventdesk::Config, date: Option<String>) -> anyhow::Result<()> {
    let date = match date {
        Some(date) => parse_date(&date)?,
        None => today_utc() + Duration::days(1),
    };

    let pool = eventdesk::db::create_pool(&config.database.url, 1).await?;
    let lifecycle = eventdesk::build_lifecycle(&config, State::single(pool))?;

    let sent = lifecycle.send_reminders(date).await?;
    tracing::info!(%date, sent, "reminders dispatched");

    Ok(())
}
