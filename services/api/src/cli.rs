use crate::demo::{
    run_dataset, run_demo, run_score, run_train, DatasetArgs, DemoArgs, ScoreArgs, TrainArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use talent_insights::config::{AppConfig, InsightsConfig};
use talent_insights::error::AppError;
use talent_insights::insights::SubjectKind;

#[derive(Parser, Debug)]
#[command(
    name = "Talent Insights",
    about = "Score employee performance and goal completion, and retrain the insight models",
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
    /// Score a single employee or goal
    Score {
        #[command(subcommand)]
        command: ScoreCommand,
    },
    /// Retrain the employee and goal models and persist their artifacts
    Train(TrainArgs),
    /// Export the labelled training dataset as CSV
    Dataset(DatasetArgs),
    /// Walk through scoring, training, and rescoring against seed records
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ScoreCommand {
    /// Predicted performance and recommendations for an employee
    Employee(ScoreArgs),
    /// Completion probability for a goal
    Goal(ScoreArgs),
}

/// Where records and model artifacts come from; unset flags fall back to the environment.
#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// JSON snapshot of HR records (overrides INSIGHTS_RECORDS_PATH)
    #[arg(long)]
    pub(crate) records: Option<PathBuf>,
    /// Directory holding model artifacts (overrides INSIGHTS_MODEL_DIR)
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
}

impl SourceArgs {
    pub(crate) fn resolve(self) -> Result<InsightsConfig, AppError> {
        let mut insights = AppConfig::load()?.insights;
        if let Some(model_dir) = self.model_dir {
            insights.model_dir = model_dir;
        }
        if let Some(records) = self.records {
            insights.records_path = Some(records);
        }
        Ok(insights)
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
    pub(crate) source: SourceArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score {
            command: ScoreCommand::Employee(args),
        } => run_score(SubjectKind::Employee, args),
        Command::Score {
            command: ScoreCommand::Goal(args),
        } => run_score(SubjectKind::Goal, args),
        Command::Train(args) => run_train(args),
        Command::Dataset(args) => run_dataset(args),
        Command::Demo(args) => run_demo(args),
    }
}
