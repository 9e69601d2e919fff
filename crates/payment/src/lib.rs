mod gateway;
mod repository;

use std::ops::Deref;

use eventdesk_db::table::Payment as PaymentTable;
use eventdesk_shared::{Money, PaymentStatus, State, serde_fmt};
use sea_query::{Expr, ExprTrait, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::prelude::FromRow;
use time::{Date, Time};

pub use gateway::*;
pub use repository::{CreatePaymentInput, fail_pending, insert, set_status};

/// Method recorded for payments taken through the hosted checkout.
pub const GATEWAY_METHOD: &str = "razorpay";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: String,
    pub registration_id: String,
    pub user_id: String,
    pub event_id: String,
    pub amount: Money,
    pub order_id: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub payment_date: i64,
}

impl Payment {
    pub fn is_success(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserPayment {
    pub id: String,
    pub registration_id: String,
    pub event_id: String,
    pub amount: Money,
    pub transaction_id: Option<String>,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub payment_date: i64,
    pub title: String,
    #[serde(with = "serde_fmt::date")]
    pub date: Date,
    #[serde(with = "serde_fmt::hour_minute")]
    pub time: Time,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventPayment {
    pub id: String,
    pub registration_id: String,
    pub user_id: String,
    pub amount: Money,
    pub transaction_id: Option<String>,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub payment_date: i64,
    pub name: String,
    pub email: String,
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
            PaymentTable::Id,
            PaymentTable::RegistrationId,
            PaymentTable::UserId,
            PaymentTable::EventId,
            PaymentTable::Amount,
            PaymentTable::OrderId,
            PaymentTable::TransactionId,
            PaymentTable::PaymentMethod,
            PaymentTable::Status,
            PaymentTable::PaymentDate,
        ])
        .from(PaymentTable::Table)
        .to_owned()
}

impl Store {
    pub fn new(state: State) -> Self {
        Self { state }
    }

    pub async fn create(&self, input: CreatePaymentInput) -> eventdesk_shared::Result<String> {
        insert(&self.write_db, input).await
    }

    async fn fetch_optional(
        &self,
        statement: SelectStatement,
    ) -> eventdesk_shared::Result<Option<Payment>> {
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, Payment, _>(&sql, values)
            .fetch_optional(&self.read_db)
            .await?)
    }

    pub async fn find(&self, id: impl Into<String>) -> eventdesk_shared::Result<Option<Payment>> {
        let statement = select()
            .and_where(Expr::col(PaymentTable::Id).eq(id.into()))
            .limit(1)
            .to_owned();

        self.fetch_optional(statement).await
    }

    pub async fn find_by_transaction_id(
        &self,
        transaction_id: impl Into<String>,
    ) -> eventdesk_shared::Result<Option<Payment>> {
        let statement = select()
            .and_where(Expr::col(PaymentTable::TransactionId).eq(transaction_id.into()))
            .limit(1)
            .to_owned();

        self.fetch_optional(statement).await
    }

    /// Most recent payment attempt for the registration.
    pub async fn find_by_registration(
        &self,
        registration_id: impl Into<String>,
    ) -> eventdesk_shared::Result<Option<Payment>> {
        let statement = select()
            .and_where(Expr::col(PaymentTable::RegistrationId).eq(registration_id.into()))
            .order_by(PaymentTable::PaymentDate, Order::Desc)
            .order_by(PaymentTable::Id, Order::Desc)
            .limit(1)
            .to_owned();

        self.fetch_optional(statement).await
    }

    pub async fn has_success(&self, registration_id: &str) -> eventdesk_shared::Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM payment WHERE registration_id = ? AND status = ?"#,
        )
        .bind(registration_id)
        .bind(PaymentStatus::Success)
        .fetch_one(&self.read_db)
        .await?;

        Ok(count > 0)
    }

    pub async fn list_by_user(&self, user_id: &str) -> eventdesk_shared::Result<Vec<UserPayment>> {
        Ok(sqlx::query_as::<_, UserPayment>(
            r#"SELECT p.id, p.registration_id, p.event_id, p.amount, p.transaction_id,
                p.payment_method, p.status, p.payment_date, e.title, e.date, e.time
            FROM payment p
            JOIN event e ON e.id = p.event_id
            WHERE p.user_id = ?
            ORDER BY p.payment_date DESC, p.id DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.read_db)
        .await?)
    }

    pub async fn list_by_event(&self, event_id: &str) -> eventdesk_shared::Result<Vec<EventPayment>> {
        Ok(sqlx::query_as::<_, EventPayment>(
            r#"SELECT p.id, p.registration_id, p.user_id, p.amount, p.transaction_id,
                p.payment_method, p.status, p.payment_date, u.name, u.email
            FROM payment p
            JOIN "user" u ON u.id = p.user_id
            WHERE p.event_id = ?
            ORDER BY p.payment_date DESC, p.id DESC"#,
        )
        .bind(event_id)
        .fetch_all(&self.read_db)
        .await?)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: PaymentStatus,
        transaction_id: Option<&str>,
    ) -> eventdesk_shared::Result<u64> {
        set_status(&self.write_db, id, status, transaction_id).await
    }

    pub async fn mark_success(&self, id: &str, transaction_id: &str) -> eventdesk_shared::Result<u64> {
        self.update_status(id, PaymentStatus::Success, Some(transaction_id))
            .await
    }

    pub async fn mark_failed(&self, id: &str) -> eventdesk_shared::Result<u64> {
        self.update_status(id, PaymentStatus::Failed, None).await
    }

    pub async fn count_success(&self, event_id: &str) -> eventdesk_shared::Result<i64> {
        Ok(sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM payment WHERE event_id = ? AND status = ?"#,
        )
        .bind(event_id)
        .bind(PaymentStatus::Success)
        .fetch_one(&self.read_db)
        .await?)
    }

    pub async fn total_revenue(&self, event_id: &str) -> eventdesk_shared::Result<Money> {
        Ok(sqlx::query_scalar(
            r#"SELECT COALESCE(SUM(amount), 0) FROM payment WHERE event_id = ? AND status = ?"#,
        )
        .bind(event_id)
        .bind(PaymentStatus::Success)
        .fetch_one(&self.read_db)
        .await?)
    }

    /// Revenue from successful payments across all events.
    pub async fn total_revenue_all(&self) -> eventdesk_shared::Result<Money> {
        Ok(
            sqlx::query_scalar(r#"SELECT COALESCE(SUM(amount), 0) FROM payment WHERE status = ?"#)
                .bind(PaymentStatus::Success)
                .fetch_one(&self.read_db)
                .await?,
        )
    }
}
