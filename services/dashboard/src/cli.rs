use crate::commands::{run_render, run_score, run_seed};
use crate::server;
use clap::{Args, Parser, Subcommand};
use employee_events::config::AppConfig;
use employee_events::entity::EntityKind;
use employee_events::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Employee Events Dashboard",
    about = "Serve and render employee and team performance reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Render one report page to stdout or a file
    Render(RenderArgs),
    /// Print the recruitment risk assessment for one employee or team as JSON
    Score(ScoreArgs),
    /// Create the demo event store
    Seed(SeedArgs),
}

/// Overrides for the event store and model locations.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct DataArgs {
    /// Path to the SQLite event store
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
    /// Path to the JSON risk model artifact
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

impl DataArgs {
    pub(crate) fn apply(&mut self, config: &mut AppConfig) {
        if let Some(database) = self.database.take() {
            config.data.database_path = database;
        }
        if let Some(model) = self.model.take() {
            config.data.model_path = model;
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

#[derive(Args, Debug)]
pub(crate) struct RenderArgs {
    /// `employee` or `team`
    #[arg(long)]
    pub(crate) kind: EntityKind,
    #[arg(long)]
    pub(crate) id: i64,
    /// Write the page here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// `employee` or `team`
    #[arg(long)]
    pub(crate) kind: EntityKind,
    #[arg(long)]
    pub(crate) id: i64,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

#[derive(Args, Debug)]
pub(crate) struct SeedArgs {
    /// Where to create the store (defaults to EMPLOYEE_EVENTS_DB)
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Render(args) => run_render(args).await,
        Command::Score(args) => run_score(args).await,
        Command::Seed(args) => run_seed(args).await,
    }
}
