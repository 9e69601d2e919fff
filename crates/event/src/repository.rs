use eventdesk_db::table::Event;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;

/// Takes one seat if the event still has room. Zero affected rows means the
/// event is full or gone; the caller decides which by re-reading.
pub async fn claim_seat<'e, E>(executor: E, event_id: &str) -> eventdesk_shared::Result<u64>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let statement = Query::update()
        .table(Event::Table)
        .value(
            Event::CurrentParticipants,
            Expr::col(Event::CurrentParticipants).add(1),
        )
        .and_where(Expr::col(Event::Id).eq(event_id))
        .and_where(Expr::col(Event::CurrentParticipants).lt(Expr::col(Event::MaxParticipants)))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let res = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(res.rows_affected())
}

/// Gives one seat back, never going below zero.
pub async fn release_seat<'e, E>(executor: E, event_id: &str) -> eventdesk_shared::Result<u64>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let statement = Query::update()
        .table(Event::Table)
        .value(
            Event::CurrentParticipants,
            Expr::col(Event::CurrentParticipants).sub(1),
        )
        .and_where(Expr::col(Event::Id).eq(event_id))
        .and_where(Expr::col(Event::CurrentParticipants).gt(0))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let res = sqlx::query_with(&sql, values).execute(executor).await?;

    Ok(res.rows_affected())
}
