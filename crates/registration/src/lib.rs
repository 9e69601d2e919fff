mod repository;

use std::ops::Deref;

use eventdesk_db::table::Registration as RegistrationTable;
use eventdesk_shared::{Error, Money, RegistrationStatus, State, serde_fmt};
use sea_query::{Expr, ExprTrait, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::prelude::FromRow;
use time::{Date, Time};

pub use repository::{cancel_active, confirm_pending, insert, reinstate_cancelled, set_status};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Registration {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub status: RegistrationStatus,
    pub payment_required: bool,
    pub registration_date: i64,
}

impl Registration {
    pub fn is_cancelled(&self) -> bool {
        self.status == RegistrationStatus::Cancelled
    }
}

/// A user's registration alongside the event it is for.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRegistration {
    pub id: String,
    pub event_id: String,
    pub status: RegistrationStatus,
    pub payment_required: bool,
    pub registration_date: i64,
    pub title: String,
    #[serde(with = "serde_fmt::date")]
    pub date: Date,
    #[serde(with = "serde_fmt::hour_minute")]
    pub time: Time,
    pub venue: String,
    pub price: Money,
    pub is_paid: bool,
}

/// An event's registration alongside who made it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Participant {
    pub id: String,
    pub user_id: String,
    pub status: RegistrationStatus,
    pub payment_required: bool,
    pub registration_date: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Clone)]
pub struct Store {
    state: State,
}

impl Deref for Store {
    type Target = State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

fn select() -> SelectStatement {
    Query::select()
        .columns([
            RegistrationTable::Id,
            RegistrationTable::UserId,
            RegistrationTable::EventId,
            RegistrationTable::Status,
            RegistrationTable::PaymentRequired,
            RegistrationTable::RegistrationDate,
        ])
        .from(RegistrationTable::Table)
        .to_owned()
}

impl Store {
    pub fn new(state: State) -> Self {
        Self { state }
    }

    /// Returns `None` when the user already holds a registration for the
    /// event, whatever its status.
    pub async fn create(
        &self,
        user_id: &str,
        event_id: &str,
        payment_required: bool,
    ) -> eventdesk_shared::Result<Option<String>> {
        match insert(&self.write_db, user_id, event_id, payment_required).await {
            Ok(id) => Ok(Some(id)),
            Err(Error::AlreadyRegistered) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn find(
        &self,
        id: impl Into<String>,
    ) -> eventdesk_shared::Result<Option<Registration>> {
        let statement = select()
            .and_where(Expr::col(RegistrationTable::Id).eq(id.into()))
            .limit(1)
            .to_owned();

        self.fetch_optional(statement).await
    }

    pub async fn find_by_user_and_event(
        &self,
        user_id: impl Into<String>,
        event_id: impl Into<String>,
    ) -> eventdesk_shared::Result<Option<Registration>> {
        let statement = select()
            .and_where(Expr::col(RegistrationTable::UserId).eq(user_id.into()))
            .and_where(Expr::col(RegistrationTable::EventId).eq(event_id.into()))
            .limit(1)
            .to_owned();

        self.fetch_optional(statement).await
    }

    async fn fetch_optional(
        &self,
        statement: SelectStatement,
    ) -> eventdesk_shared::Result<Option<Registration>> {
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, Registration, _>(&sql, values)
            .fetch_optional(&self.read_db)
            .await?)
    }

    pub async fn list_by_user(
        &self,
        user_id: &str,
    ) -> eventdesk_shared::Result<Vec<UserRegistration>> {
        Ok(sqlx::query_as::<_, UserRegistration>(
            r#"SELECT r.id, r.event_id, r.status, r.payment_required, r.registration_date,
                e.title, e.date, e.time, e.venue, e.price, e.is_paid
            FROM registration r
            JOIN event e ON e.id = r.event_id
            WHERE r.user_id = ?
            ORDER BY r.registration_date DESC, r.id DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.read_db)
        .await?)
    }

    pub async fn list_by_event(&self, event_id: &str) -> eventdesk_shared::Result<Vec<Participant>> {
        Ok(sqlx::query_as::<_, Participant>(
            r#"SELECT r.id, r.user_id, r.status, r.payment_required, r.registration_date,
                u.name, u.email, u.phone
            FROM registration r
            JOIN "user" u ON u.id = r.user_id
            WHERE r.event_id = ?
            ORDER BY r.registration_date DESC, r.id DESC"#,
        )
        .bind(event_id)
        .fetch_all(&self.read_db)
        .await?)
    }

    pub async fn is_registered(&self, user_id: &str, event_id: &str) -> eventdesk_shared::Result<bool> {
        Ok(self
            .find_by_user_and_event(user_id, event_id)
            .await?
            .is_some())
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: RegistrationStatus,
    ) -> eventdesk_shared::Result<u64> {
        set_status(&self.write_db, id, status).await
    }

    pub async fn cancel(&self, id: &str) -> eventdesk_shared::Result<u64> {
        self.update_status(id, RegistrationStatus::Cancelled).await
    }

    pub async fn confirm(&self, id: &str) -> eventdesk_shared::Result<u64> {
        self.update_status(id, RegistrationStatus::Confirmed).await
    }

    pub async fn count_confirmed(&self, event_id: &str) -> eventdesk_shared::Result<i64> {
        Ok(sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM registration WHERE event_id = ? AND status = ?"#,
        )
        .bind(event_id)
        .bind(RegistrationStatus::Confirmed)
        .fetch_one(&self.read_db)
        .await?)
    }

    /// Confirmed registrations across all events.
    pub async fn count_all_confirmed(&self) -> eventdesk_shared::Result<i64> {
        Ok(
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM registration WHERE status = ?"#)
                .bind(RegistrationStatus::Confirmed)
                .fetch_one(&self.read_db)
                .await?,
        )
    }
}
