pub mod password;
pub(crate) mod repository;

use std::ops::Deref;

use eventdesk_shared::{
    Contact, Error, Role, State,
    validation::{self, is_valid_email, sanitize},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use repository::{CreateInput, FindType, UpdateInput, UserRow};

/// A user as exposed outside the crate; the password hash never leaves it.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: i64,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn contact(&self) -> Contact {
        Contact {
            name: self.name.to_owned(),
            email: self.email.to_owned(),
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(custom(function = "validation::phone"))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfilePatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(custom(function = "validation::phone"))]
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

impl Store {
    pub fn new(state: State) -> Self {
        Self { state }
    }

    pub async fn sign_up(&self, input: SignUpInput) -> eventdesk_shared::Result<String> {
        validation::require_fields(&[
            ("name", &input.name),
            ("email", &input.email),
            ("password", &input.password),
        ])?;
        input.validate()?;

        let email = input.email.trim().to_owned();
        if !is_valid_email(&email) {
            return Err(Error::Invalid("invalid email format".to_owned()));
        }

        if self.find_by_email(&email).await?.is_some() {
            return Err(Error::EmailTaken);
        }

        let id = repository::create(
            &self.write_db,
            CreateInput {
                name: sanitize(&input.name),
                email,
                password_hash: password::hash(&input.password)?,
                phone: input.phone.map(|phone| phone.trim().to_owned()),
                role: Role::User,
            },
        )
        .await?;

        tracing::info!(user_id = %id, "user signed up");

        Ok(id)
    }

    pub async fn login(&self, input: LoginInput) -> eventdesk_shared::Result<User> {
        input.validate().map_err(|_| Error::InvalidCredentials)?;

        let Some(row) = repository::find(&self.read_db, FindType::Email(input.email)).await? else {
            return Err(Error::InvalidCredentials);
        };

        if !password::verify(&row.password_hash, &input.password) {
            return Err(Error::InvalidCredentials);
        }

        Ok(row.into())
    }

    pub async fn find(&self, id: impl Into<String>) -> eventdesk_shared::Result<Option<User>> {
        let row = repository::find(&self.read_db, FindType::Id(id.into())).await?;

        Ok(row.map(Into::into))
    }

    pub async fn find_by_email(
        &self,
        email: impl Into<String>,
    ) -> eventdesk_shared::Result<Option<User>> {
        let row = repository::find(&self.read_db, FindType::Email(email.into())).await?;

        Ok(row.map(Into::into))
    }

    pub async fn contact(&self, id: impl Into<String>) -> eventdesk_shared::Result<Option<Contact>> {
        Ok(self.find(id).await?.map(|user| user.contact()))
    }

    /// Newest accounts first.
    pub async fn list_all(&self) -> eventdesk_shared::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, name, email, password_hash, phone, role, created_at
            FROM "user"
            ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.read_db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn count(&self) -> eventdesk_shared::Result<i64> {
        Ok(sqlx::query_scalar(r#"SELECT COUNT(*) FROM "user""#)
            .fetch_one(&self.read_db)
            .await?)
    }

    pub async fn update_profile(
        &self,
        id: &str,
        patch: ProfilePatch,
    ) -> eventdesk_shared::Result<u64> {
        patch.validate()?;

        repository::update(
            &self.write_db,
            id,
            UpdateInput {
                name: patch.name.map(|name| sanitize(&name)),
                phone: patch.phone.map(|phone| phone.trim().to_owned()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_role(&self, id: &str, role: Role) -> eventdesk_shared::Result<u64> {
        let affected = repository::update(
            &self.write_db,
            id,
            UpdateInput {
                role: Some(role),
                ..Default::default()
            },
        )
        .await?;

        tracing::info!(user_id = %id, %role, affected, "role changed");

        Ok(affected)
    }

    /// Makes sure an administrator account exists for the given credentials,
    /// creating it or promoting the existing account.
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> eventdesk_shared::Result<String> {
        if let Some(user) = self.find_by_email(email).await? {
            if !user.is_admin() {
                self.set_role(&user.id, Role::Admin).await?;
            }

            return Ok(user.id);
        }

        validation::validate_password(password)?;

        let id = repository::create(
            &self.write_db,
            CreateInput {
                name: name.to_owned(),
                email: email.to_owned(),
                password_hash: password::hash(password)?,
                phone: None,
                role: Role::Admin,
            },
        )
        .await?;

        tracing::info!(user_id = %id, %email, "admin account created");

        Ok(id)
    }
}
