mod event;
mod payment;
mod registration;
mod user;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "eventdesk",
    "m0001",
    vec_box![],
    vec_box![
        user::CreateTable,
        user::CreateUk1,
        event::CreateTable,
        event::CreateIdx1,
        registration::CreateTable,
        registration::CreateUk1,
        registration::CreateIdx1,
        payment::CreateTable,
        payment::CreateUk1,
        payment::CreateUk2,
        payment::CreateIdx1,
        payment::CreateIdx2
    ]
);
