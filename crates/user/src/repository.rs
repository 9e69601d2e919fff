use eventdesk_db::table::User;
use eventdesk_shared::{Error, Role, is_unique_violation};
use sea_query::{Expr, ExprTrait, Func, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};
use time::OffsetDateTime;

#[derive(FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: i64,
}

pub enum FindType {
    Id(String),
    Email(String),
}

pub(crate) async fn find(
    pool: &SqlitePool,
    arg_type: FindType,
) -> eventdesk_shared::Result<Option<UserRow>> {
    let mut statement = Query::select()
        .columns([
            User::Id,
            User::Name,
            User::Email,
            User::PasswordHash,
            User::Phone,
            User::Role,
            User::CreatedAt,
        ])
        .from(User::Table)
        .limit(1)
        .to_owned();

    match arg_type {
        FindType::Id(id) => statement.and_where(Expr::col(User::Id).eq(id)),
        FindType::Email(email) => statement.and_where(
            Expr::expr(Func::lower(Expr::col(User::Email))).eq(email.to_lowercase()),
        ),
    };

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, UserRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) struct CreateInput {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
}

pub(crate) async fn create(pool: &SqlitePool, input: CreateInput) -> eventdesk_shared::Result<String> {
    let id = ulid::Ulid::new().to_string();
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let statement = Query::insert()
        .into_table(User::Table)
        .columns([
            User::Id,
            User::Name,
            User::Email,
            User::PasswordHash,
            User::Phone,
            User::Role,
            User::CreatedAt,
        ])
        .values_panic([
            id.to_owned().into(),
            input.name.into(),
            input.email.into(),
            input.password_hash.into(),
            input.phone.into(),
            input.role.as_ref().into(),
            now.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    match sqlx::query_with(&sql, values).execute(pool).await {
        Ok(_) => Ok(id),
        Err(err) if is_unique_violation(&err) => Err(Error::EmailTaken),
        Err(err) => Err(err.into()),
    }
}

#[derive(Default)]
pub(crate) struct UpdateInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

pub(crate) async fn update(
    pool: &SqlitePool,
    id: &str,
    input: UpdateInput,
) -> eventdesk_shared::Result<u64> {
    let mut statement = Query::update()
        .table(User::Table)
        .and_where(Expr::col(User::Id).eq(id))
        .to_owned();

    let mut changed = false;

    if let Some(name) = input.name {
        statement.value(User::Name, name);
        changed = true;
    }

    if let Some(phone) = input.phone {
        statement.value(User::Phone, phone);
        changed = true;
    }

    if let Some(password_hash) = input.password_hash {
        statement.value(User::PasswordHash, password_hash);
        changed = true;
    }

    if let Some(role) = input.role {
        statement.value(User::Role, role.as_ref());
        changed = true;
    }

    if !changed {
        return Ok(0);
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let res = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(res.rows_affected())
}
