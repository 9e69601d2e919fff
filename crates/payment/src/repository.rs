use eventdesk_db::table::Payment;
use eventdesk_shared::{Error, Money, PaymentStatus, is_unique_violation};
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use time::OffsetDateTime;

pub struct CreatePaymentInput {
    pub registration_id: String,
    pub user_id: String,
    pub event_id: String,
    pub amount: Money,
    pub order_id: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_method: String,
}

fn map_unique(err: sqlx::Error) -> Error {
    if is_unique_violation(&err) {
        return Error::AlreadyPaid;
    }

    err.into()
}

pub async fn insert<'e, E>(executor: E, input: CreatePaymentInput) -> eventdesk_shared::Result<String>
where
    E: sqlx::SqliteExecutor<'e>,
{
    if !input.amount.is_positive() {
        return Err(Error::Invalid("payment amount must be positive".to_owned()));
    }

    let id = ulid::Ulid::new().to_string();
    let now = OffsetDateTime::now_utc().unix_timestamp();

    let statement = Query::insert()
        .into_table(Payment::Table)
        .columns([
            Payment::Id,
            Payment::RegistrationId,
            Payment::UserId,
            Payment::EventId,
            Payment::Amount,
            Payment::OrderId,
            Payment::TransactionId,
            Payment::PaymentMethod,
            Payment::Status,
            Payment::PaymentDate,
        ])
        .values_panic([
            id.to_owned().into(),
            input.registration_id.into(),
            input.user_id.into(),
            input.event_id.into(),
            input.amount.minor_units().into(),
            input.order_id.into(),
            input.transaction_id.into(),
            input.payment_method.into(),
            PaymentStatus::Pending.as_ref().into(),
            now.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values)
        .execute(executor)
        .await
        .map_err(map_unique)?;

    Ok(id)
}

/// Sets the status, and the gateway reference in the same statement when
/// one is given. A second success for the same registration, or a reused
/// gateway reference, is reported as `AlreadyPaid`.
pub async fn set_status<'e, E>(
    executor: E,
    id: &str,
    status: PaymentStatus,
    transaction_id: Option<&str>,
) -> eventdesk_shared::Result<u64>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let mut statement = Query::update()
        .table(Payment::Table)
        .value(Payment::Status, status.as_ref())
        .and_where(Expr::col(Payment::Id).eq(id))
        .to_owned();

    if let Some(transaction_id) = transaction_id {
        statement.value(Payment::TransactionId, transaction_id);
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let res = sqlx::query_with(&sql, values)
        .execute(executor)
        .await
        .map_err(map_unique)?;

    Ok(res.rows_affected())
}

/// Fails a payment that is still pending; settled payments are left alone.
pub async fn fail_pending<'e, E>(executor: E, id: &str) -> eventdesk_shared::Result<u64>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let statement = Query::update()
        .table(Payment::Table)
        .value(Payment::Status, PaymentStatus::Failed.as_ref())
        .and_where(Expr::col(Payment::Id).eq(id))
        .and_where(Expr::col(Payment::Status).eq(PaymentStatus::Pending.as_ref()))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let res = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(res.rows_affected())
}
