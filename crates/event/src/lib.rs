mod input;
mod repository;

use std::ops::Deref;

use eventdesk_db::table::Event as EventTable;
use eventdesk_shared::{
    Error, Money, State, serde_fmt, today_utc,
    validation::{parse_date, parse_time, sanitize},
};
use sea_query::{
    Cond, Expr, ExprTrait, LikeExpr, Order, Query, SelectStatement, SqliteQueryBuilder,
};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::prelude::FromRow;
use time::{Date, OffsetDateTime, Time};
use validator::Validate;

pub use input::{CreateEventInput, EventPatch};
pub use repository::{claim_seat, release_seat};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(with = "serde_fmt::date")]
    pub date: Date,
    #[serde(with = "serde_fmt::hour_minute")]
    pub time: Time,
    pub venue: String,
    pub category: String,
    pub price: Money,
    pub is_paid: bool,
    pub max_participants: i64,
    pub current_participants: i64,
    #[serde(with = "serde_fmt::date::option")]
    pub registration_deadline: Option<Date>,
    pub created_by: String,
    pub created_at: i64,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.current_participants >= self.max_participants
    }

    pub fn available_seats(&self) -> i64 {
        Ord::max(self.max_participants - self.current_participants, 0)
    }

    /// The deadline day itself is still open.
    pub fn deadline_passed(&self, today: Date) -> bool {
        self.registration_deadline
            .is_some_and(|deadline| today > deadline)
    }
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

/// Makes `%`, `_` and `\` literal in a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn select() -> SelectStatement {
    Query::select()
        .columns([
            EventTable::Id,
            EventTable::Title,
            EventTable::Description,
            EventTable::Date,
            EventTable::Time,
            EventTable::Venue,
            EventTable::Category,
            EventTable::Price,
            EventTable::IsPaid,
            EventTable::MaxParticipants,
            EventTable::CurrentParticipants,
            EventTable::RegistrationDeadline,
            EventTable::CreatedBy,
            EventTable::CreatedAt,
        ])
        .from(EventTable::Table)
        .order_by(EventTable::Date, Order::Asc)
        .order_by(EventTable::Time, Order::Asc)
        .to_owned()
}

impl Store {
    pub fn new(state: State) -> Self {
        Self { state }
    }

    pub async fn create(
        &self,
        input: CreateEventInput,
        created_by: impl Into<String>,
    ) -> eventdesk_shared::Result<String> {
        let event = input.parse()?;
        let created_by: String = created_by.into();
        let id = ulid::Ulid::new().to_string();
        let now = OffsetDateTime::now_utc().unix_timestamp();

        let statement = Query::insert()
            .into_table(EventTable::Table)
            .columns([
                EventTable::Id,
                EventTable::Title,
                EventTable::Description,
                EventTable::Date,
                EventTable::Time,
                EventTable::Venue,
                EventTable::Category,
                EventTable::Price,
                EventTable::IsPaid,
                EventTable::MaxParticipants,
                EventTable::RegistrationDeadline,
                EventTable::CreatedBy,
                EventTable::CreatedAt,
            ])
            .values_panic([
                id.to_owned().into(),
                event.title.to_owned().into(),
                event.description.into(),
                event.date.into(),
                event.time.into(),
                event.venue.into(),
                event.category.into(),
                event.price.minor_units().into(),
                event.is_paid.into(),
                event.max_participants.into(),
                event.registration_deadline.into(),
                created_by.into(),
                now.into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        tracing::info!(event_id = %id, title = %event.title, "event created");

        Ok(id)
    }

    pub async fn find(&self, id: impl Into<String>) -> eventdesk_shared::Result<Option<Event>> {
        let statement = select()
            .and_where(Expr::col(EventTable::Id).eq(id.into()))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, Event, _>(&sql, values)
            .fetch_optional(&self.read_db)
            .await?)
    }

    async fn fetch_all(&self, statement: SelectStatement) -> eventdesk_shared::Result<Vec<Event>> {
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, Event, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?)
    }

    pub async fn list_all(&self) -> eventdesk_shared::Result<Vec<Event>> {
        self.fetch_all(select()).await
    }

    pub async fn list_upcoming(&self) -> eventdesk_shared::Result<Vec<Event>> {
        let statement = select()
            .and_where(Expr::col(EventTable::Date).gte(today_utc()))
            .to_owned();

        self.fetch_all(statement).await
    }

    pub async fn list_by_category(
        &self,
        category: impl Into<String>,
    ) -> eventdesk_shared::Result<Vec<Event>> {
        let statement = select()
            .and_where(Expr::col(EventTable::Category).eq(category.into()))
            .and_where(Expr::col(EventTable::Date).gte(today_utc()))
            .to_owned();

        self.fetch_all(statement).await
    }

    /// Events taking place on the given day.
    pub async fn list_on(&self, date: Date) -> eventdesk_shared::Result<Vec<Event>> {
        let statement = select()
            .and_where(Expr::col(EventTable::Date).eq(date))
            .to_owned();

        self.fetch_all(statement).await
    }

    /// Upcoming events whose title, description or category contains the
    /// keyword, ignoring ASCII case. A blank keyword matches everything
    /// upcoming; `%` and `_` in the keyword match literally.
    pub async fn search(&self, keyword: &str) -> eventdesk_shared::Result<Vec<Event>> {
        let keyword = sanitize(keyword);
        if keyword.is_empty() {
            return self.list_upcoming().await;
        }

        let pattern = format!("%{}%", escape_like(&keyword));
        let like = || LikeExpr::new(pattern.to_owned()).escape('\\');
        let statement = select()
            .and_where(Expr::col(EventTable::Date).gte(today_utc()))
            .cond_where(
                Cond::any()
                    .add(Expr::col(EventTable::Title).like(like()))
                    .add(Expr::col(EventTable::Description).like(like()))
                    .add(Expr::col(EventTable::Category).like(like())),
            )
            .to_owned();

        self.fetch_all(statement).await
    }

    /// Applies the patch and returns the number of rows changed.
    pub async fn update(
        &self,
        id: impl Into<String>,
        patch: EventPatch,
    ) -> eventdesk_shared::Result<u64> {
        let id = id.into();
        patch.validate()?;

        if patch.is_empty() {
            return Ok(0);
        }

        let Some(current) = self.find(&id).await? else {
            return Ok(0);
        };

        let mut statement = Query::update()
            .table(EventTable::Table)
            .and_where(Expr::col(EventTable::Id).eq(id.to_owned()))
            .to_owned();

        if let Some(title) = patch.title {
            statement.value(EventTable::Title, sanitize(&title));
        }

        if let Some(description) = patch.description {
            statement.value(EventTable::Description, sanitize(&description));
        }

        if let Some(date) = patch.date {
            statement.value(EventTable::Date, parse_date(&date)?);
        }

        if let Some(time) = patch.time {
            statement.value(EventTable::Time, parse_time(&time)?);
        }

        if let Some(venue) = patch.venue {
            statement.value(EventTable::Venue, sanitize(&venue));
        }

        if let Some(category) = patch.category {
            statement.value(EventTable::Category, sanitize(&category));
        }

        if patch.price.is_some() || patch.is_paid.is_some() {
            let is_paid = patch.is_paid.unwrap_or(current.is_paid);
            let price = input::check_price(is_paid, patch.price.unwrap_or(current.price))?;
            statement.value(EventTable::IsPaid, is_paid);
            statement.value(EventTable::Price, price.minor_units());
        }

        if let Some(deadline) = patch.registration_deadline {
            statement.value(
                EventTable::RegistrationDeadline,
                input::parse_deadline(Some(&deadline))?,
            );
        }

        if let Some(max) = patch.max_participants {
            statement.value(EventTable::MaxParticipants, max);
            statement.and_where(Expr::col(EventTable::CurrentParticipants).lte(max));
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let affected = sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?
            .rows_affected();

        if affected == 0 && patch.max_participants.is_some() {
            if self.find(&id).await?.is_none() {
                return Ok(0);
            }

            return Err(Error::Invalid(
                "max_participants cannot be lower than the current number of participants"
                    .to_owned(),
            ));
        }

        Ok(affected)
    }

    pub async fn delete(&self, id: impl Into<String>) -> eventdesk_shared::Result<u64> {
        let statement = Query::delete()
            .from_table(EventTable::Table)
            .and_where(Expr::col(EventTable::Id).eq(id.into()))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let res = sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?;

        Ok(res.rows_affected())
    }

    pub async fn increment_participants(&self, id: &str) -> eventdesk_shared::Result<u64> {
        claim_seat(&self.write_db, id).await
    }

    pub async fn decrement_participants(&self, id: &str) -> eventdesk_shared::Result<u64> {
        release_seat(&self.write_db, id).await
    }

    /// An unknown event counts as full.
    pub async fn is_full(&self, id: impl Into<String>) -> eventdesk_shared::Result<bool> {
        Ok(self.find(id).await?.is_none_or(|event| event.is_full()))
    }

    pub async fn available_seats(&self, id: impl Into<String>) -> eventdesk_shared::Result<i64> {
        Ok(self
            .find(id)
            .await?
            .map(|event| event.available_seats())
            .unwrap_or(0))
    }

    pub async fn count(&self) -> eventdesk_shared::Result<i64> {
        Ok(sqlx::query_scalar(r#"SELECT COUNT(*) FROM "event""#)
            .fetch_one(&self.read_db)
            .await?)
    }

    pub async fn count_upcoming(&self) -> eventdesk_shared::Result<i64> {
        Ok(
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM "event" WHERE "date" >= ?"#)
                .bind(today_utc())
                .fetch_one(&self.read_db)
                .await?,
        )
    }
}
