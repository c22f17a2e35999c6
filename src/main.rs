use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fulcrum_dash::config::Config;
use fulcrum_dash::storage::LocalStore;
use fulcrum_dash::transport::{
    self, AccountsCommand, CliSession, CoderCommand, ConfigCommand, GithubCommand, PmCommand,
    ProjectsCommand,
};
use fulcrum_dash::{offline, tui};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    env!("FULCRUM_VERSION_SUFFIX")
);

#[derive(Parser)]
#[command(name = "fulcrum")]
#[command(author, version = VERSION, about = "Fulcrum - terminal dashboard for the Fulcrum project manager", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard (default)
    Dashboard,

    /// Sign in and store the access token
    Login {
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account and sign in
    Register {
        email: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// LLM status and project summary
    Overview,

    /// Manage projects
    #[command(subcommand)]
    Projects(ProjectsCommand),

    /// Manage AI provider accounts
    #[command(subcommand)]
    Accounts(AccountsCommand),

    /// Chat assistant account and model
    #[command(subcommand)]
    Pm(PmCommand),

    /// Send one message to the project manager assistant
    Chat { message: String },

    /// GitHub integration
    #[command(subcommand)]
    Github(GithubCommand),

    /// Coder workspaces integration
    #[command(subcommand)]
    Coder(CoderCommand),

    /// Run the offline cache proxy in front of the server
    Serve {
        /// Port to listen on (default from config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn init_logging(verbose: bool, to_file: bool) -> Result<()> {
    let filter = if verbose {
        "fulcrum_dash=debug"
    } else {
        "fulcrum_dash=info"
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if to_file {
        // the terminal belongs to the dashboard
        let dir = Config::data_dir()?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let log_path = dir.join("fulcrum.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open {}", log_path.display()))?;
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Dashboard);

    init_logging(cli.verbose, matches!(command, Commands::Dashboard))?;
    tracing::debug!("fulcrum {} ({})", VERSION, env!("FULCRUM_GIT_HASH"));

    let mut config = Config::load()?;

    match command {
        Commands::Dashboard => {
            let store = LocalStore::open_default()?;
            tui::run_dashboard(&config, store).await?;
        }
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.offline.port = port;
            }
            if let Some(host) = host {
                config.offline.host = host;
            }
            offline::run_offline_proxy(&config).await?;
        }
        Commands::Config(command) => transport::config_command(&config, command)?,
        Commands::Login { email, password } => {
            CliSession::open(config)?.login(&email, password).await?
        }
        Commands::Register {
            email,
            password,
            full_name,
        } => {
            CliSession::open(config)?
                .register(&email, password, full_name)
                .await?
        }
        Commands::Logout => CliSession::open(config)?.logout()?,
        Commands::Overview => CliSession::open(config)?.overview().await?,
        Commands::Projects(command) => CliSession::open(config)?.projects(command).await?,
        Commands::Accounts(command) => CliSession::open(config)?.accounts(command).await?,
        Commands::Pm(command) => CliSession::open(config)?.pm(command).await?,
        Commands::Chat { message } => CliSession::open(config)?.chat(&message).await?,
        Commands::Github(command) => CliSession::open(config)?.github(command).await?,
        Commands::Coder(command) => CliSession::open(config)?.coder(command).await?,
    }

    Ok(())
}
