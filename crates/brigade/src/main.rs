//! Brigade server binary.

use std::io::{self, IsTerminal, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tokio::net::TcpListener;
use tracing::info;

use brigade::api::{self, AppState};
use brigade::auth::{AuthService, Role, TokenService};
use brigade::config::{self, AppConfig};
use brigade::db::Database;
use brigade::task::{TaskRepository, TaskService};
use brigade::user::{CreateUserRequest, UserRepository, UserService};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Brigade - staff task assignment service.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct CommonOpts {
    /// Override the config file path
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Increase logging verbosity (stackable)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Output machine readable JSON logs
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Create the initial admin user
    BootstrapAdmin(BootstrapAdminCommand),
    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Output the effective configuration
    Show,
    /// Print the resolved config file path
    Path,
}

#[derive(Debug, Clone, Args)]
struct BootstrapAdminCommand {
    /// Email address for the admin account
    #[arg(long)]
    email: String,
    /// Display name for the admin account
    #[arg(long)]
    name: String,
    /// Password for the admin account
    #[arg(long)]
    password: String,
}

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = config::config_file_path(cli.common.config.clone());
    let config = config::load(&config_path)?;

    init_logging(&cli.common, &config);

    match cli.command {
        Command::Serve => run_serve(config),
        Command::Config { command } => match command {
            ConfigCommand::Show => {
                let rendered = toml::to_string_pretty(&config).context("rendering config")?;
                print!("{rendered}");
                Ok(())
            }
            ConfigCommand::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
        },
        Command::BootstrapAdmin(cmd) => run_bootstrap_admin(config, cmd),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "brigade", &mut io::stdout());
            Ok(())
        }
    }
}

fn init_logging(common: &CommonOpts, config: &AppConfig) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let level = match common.verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("brigade={level},tower_http={level}")));

    if common.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .ok();
    } else {
        let disable_color = !io::stderr().is_terminal();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(!disable_color))
            .try_init()
            .ok();
    }

    // Also init env_logger for compatibility with log crate users
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init()
        .ok();
}

#[tokio::main]
async fn run_serve(config: AppConfig) -> Result<()> {
    // The signing secret is validated before anything binds; a missing or
    // weak secret aborts startup here.
    let secret = config.auth.validate().context("validating auth config")?;
    let tokens = TokenService::new(&secret, config.auth.token_lifetime_secs);

    let db_path = config.database.resolve_path()?;
    let db = Database::new(&db_path).await?;

    let state = build_state(&db, tokens);
    let app = api::create_router(state, config.server.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("parsing listen address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, db = %db_path.display(), "brigade listening");

    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}

#[tokio::main]
async fn run_bootstrap_admin(config: AppConfig, cmd: BootstrapAdminCommand) -> Result<()> {
    let db_path = config.database.resolve_path()?;
    let db = Database::new(&db_path).await?;

    let users = UserService::new(UserRepository::new(db.pool().clone()));
    let user = users
        .create_user(CreateUserRequest {
            email: cmd.email,
            name: cmd.name,
            password: cmd.password,
            role: Some(Role::Admin),
        })
        .await
        .context("creating admin user")?;

    println!("created admin user {} ({})", user.email, user.id);

    Ok(())
}

fn build_state(db: &Database, tokens: TokenService) -> AppState {
    let users = UserService::new(UserRepository::new(db.pool().clone()));
    let tasks = TaskService::new(TaskRepository::new(db.pool().clone()));
    let auth = AuthService::new(UserRepository::new(db.pool().clone()));

    AppState::new(users, tasks, auth, tokens)
}
