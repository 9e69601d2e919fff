use clap::ValueEnum;
use eventdesk_shared::{Role, State};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum RoleArg {
    User,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Role::User,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[tracing::instrument(skip(config, role))]
pub async fn set_role(config: eventdesk::Config, email: String, role: RoleArg) -> anyhow::Result<()> {
    let pool = eventdesk::db::create_pool(&config.database.url, 1).await?;
    let users = eventdesk_user::Store::new(State::single(pool));

    let Some(user) = users.find_by_email(&email).await? else {
        tracing::error!("user {email} not found");
        return Ok(());
    };

    let role = Role::from(role);
    users.set_role(&user.id, role).await?;

    tracing::info!("{email} is now {role}");

    Ok(())
}
