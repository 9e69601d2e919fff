use eventdesk_db::table::Registration;
use eventdesk_shared::{Error, RegistrationStatus, is_unique_violation};
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use time::OffsetDateTime;

/// Writes a new registration. A second row for the same user and event is
/// rejected by the unique index and reported as `AlreadyRegistered`.
pub async fn insert<'e, E>(
    executor: E,
    user_id: &str,
    event_id: &str,
    payment_required: bool,
) -> eventdesk_shared::Result<String>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let id = ulid::Ulid::new().to_string();
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let status = if payment_required {
        RegistrationStatus::Pending
    } else {
        RegistrationStatus::Confirmed
    };

    let statement = Query::insert()
        .into_table(Registration::Table)
        .columns([
            Registration::Id,
            Registration::UserId,
            Registration::EventId,
            Registration::Status,
            Registration::PaymentRequired,
            Registration::RegistrationDate,
        ])
        .values_panic([
            id.to_owned().into(),
            user_id.into(),
            event_id.into(),
            status.as_ref().into(),
            payment_required.into(),
            now.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    match sqlx::query_with(&sql, values).execute(executor).await {
        Ok(_) => Ok(id),
        Err(err) if is_unique_violation(&err) => Err(Error::AlreadyRegistered),
        Err(err) => Err(err.into()),
    }
}

pub async fn set_status<'e, E>(
    executor: E,
    id: &str,
    status: RegistrationStatus,
) -> eventdesk_shared::Result<u64>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let statement = Query::update()
        .table(Registration::Table)
        .value(Registration::Status, status.as_ref())
        .and_where(Expr::col(Registration::Id).eq(id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let res = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(res.rows_affected())
}

/// Cancels unless already cancelled; zero rows means nothing changed.
pub async fn cancel_active<'e, E>(executor: E, id: &str) -> eventdesk_shared::Result<u64>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let statement = Query::update()
        .table(Registration::Table)
        .value(Registration::Status, RegistrationStatus::Cancelled.as_ref())
        .and_where(Expr::col(Registration::Id).eq(id))
        .and_where(Expr::col(Registration::Status).ne(RegistrationStatus::Cancelled.as_ref()))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let res = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(res.rows_affected())
}

/// Confirms a registration still waiting on payment. Cancelled ones stay
/// cancelled.
pub async fn confirm_pending<'e, E>(executor: E, id: &str) -> eventdesk_shared::Result<u64>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let statement = Query::update()
        .table(Registration::Table)
        .value(Registration::Status, RegistrationStatus::Confirmed.as_ref())
        .and_where(Expr::col(Registration::Id).eq(id))
        .and_where(Expr::col(Registration::Status).eq(RegistrationStatus::Pending.as_ref()))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let res = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(res.rows_affected())
}

/// Brings a cancelled registration back as confirmed. The caller owns the
/// seat accounting.
pub async fn reinstate_cancelled<'e, E>(executor: E, id: &str) -> eventdesk_shared::Result<u64>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let statement = Query::update()
        .table(Registration::Table)
        .value(Registration::Status, RegistrationStatus::Confirmed.as_ref())
        .and_where(Expr::col(Registration::Id).eq(id))
        .and_where(Expr::col(Registration::Status).eq(RegistrationStatus::Cancelled.as_ref()))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let res = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(res.rows_affected())
}
