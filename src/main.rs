use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

/// eventdesk - event registration and ticketing
#[derive(Parser)]
#[command(name = "eventdesk")]
#[command(about = "Event registration, seat capacity and ticket payments", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Change the role of an account
    SetRole {
        #[arg(long)]
        email: String,

        #[arg(long, value_enum)]
        role: cli::user::RoleArg,
    },
    /// Confirm registrations whose payment already succeeded
    Reconcile,
    /// Remind confirmed participants of the events on a day
    Remind {
        /// Day of the events, YYYY-MM-DD (defaults to tomorrow)
        #[arg(long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = eventdesk::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    eventdesk::observability::init_observability(
        "eventdesk",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host.to_owned());
            let port = port.unwrap_or(config.server.port);

            eventdesk::server::serve(config, host, port).await
        }
        Commands::Migrate => cli::database::migrate(config).await,
        Commands::Reset => cli::database::reset(config).await,
        Commands::SetRole { email, role } => cli::user::set_role(config, email, role).await,
        Commands::Reconcile => cli::lifecycle::reconcile(config).await,
        Commands::Remind { date } => cli::lifecycle::remind(config, date).await,
    }
}
