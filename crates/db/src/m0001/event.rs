use sea_query::{Index, IndexCreateStatement, IndexDropStatement};

use crate::table::Event;

pub struct CreateTable;

// Written by hand for the participant CHECK constraint; the guarded seat
// updates rely on it as a last line.
const CREATE_TABLE: &str = r#"CREATE TABLE "event" (
    "id" varchar(26) NOT NULL PRIMARY KEY,
    "title" varchar(200) NOT NULL,
    "description" text NOT NULL,
    "date" text NOT NULL,
    "time" text NOT NULL,
    "venue" varchar(200) NOT NULL,
    "category" varchar(100) NOT NULL,
    "price" bigint NOT NULL DEFAULT 0 CHECK ("price" >= 0),
    "is_paid" boolean NOT NULL DEFAULT FALSE,
    "max_participants" integer NOT NULL CHECK ("max_participants" > 0),
    "current_participants" integer NOT NULL DEFAULT 0,
    "registration_deadline" text,
    "created_by" varchar(26) NOT NULL,
    "created_at" bigint NOT NULL,
    CHECK ("current_participants" >= 0 AND "current_participants" <= "max_participants")
)"#;

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateTable {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        sqlx::query(CREATE_TABLE).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        sqlx::query(r#"DROP TABLE "event""#)
            .execute(connection)
            .await?;

        Ok(())
    }
}

pub struct CreateIdx1;

fn create_idx_1() -> IndexCreateStatement {
    Index::create()
        .name("idx_event_date_time")
        .table(Event::Table)
        .col(Event::Date)
        .col(Event::Time)
        .to_owned()
}

fn drop_idx_1() -> IndexDropStatement {
    Index::drop()
        .name("idx_event_date_time")
        .table(Event::Table)
        .to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateIdx1 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_idx_1().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_idx_1().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
