use crate::cli::SourceArgs;
use crate::infra::{insight_service, parse_timestamp, seed_snapshot, InMemoryRecordStore};
use chrono::{DateTime, Utc};
use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use talent_insights::config::AppConfig;
use talent_insights::error::AppError;
use talent_insights::insights::{
    write_dataset_csv, ArtifactKey, EmployeeScoreResult, FsModelStore, GoalScoreResult,
    InsightService, ScoreMeta, ScoringPath, SubjectKind, TrainOutcome, TrainingSummary,
};
use talent_insights::telemetry;
use tempfile::TempDir;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Primary key or business identifier of the employee or goal
    pub(crate) id: String,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Evaluation instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) as_of: Option<DateTime<Utc>>,
    /// Print the full JSON payload instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TrainArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Training timestamp recorded on the artifacts. Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

#[derive(Args, Debug)]
pub(crate) struct DatasetArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Write the CSV to this file instead of stdout
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Directory for the demo's model artifacts; artifacts already there are removed first.
    /// Defaults to a fresh temporary directory.
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
    /// Anchor date for the seed records (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_timestamp)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

pub(crate) fn run_score(kind: SubjectKind, args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        id,
        source,
        as_of,
        json,
    } = args;

    init_telemetry()?;
    let service = insight_service(&source.resolve()?)?;
    let now = as_of.unwrap_or_else(Utc::now);

    match kind {
        SubjectKind::Employee => {
            let result = service.score_employee_at(&id, now)?;
            if json {
                println!("{}", to_pretty_json(&result)?);
            } else {
                render_employee(&result);
            }
        }
        SubjectKind::Goal => {
            let result = service.score_goal_at(&id, now)?;
            if json {
                println!("{}", to_pretty_json(&result)?);
            } else {
                render_goal(&result);
            }
        }
    }
    Ok(())
}

pub(crate) fn run_train(args: TrainArgs) -> Result<(), AppError> {
    let TrainArgs { source, as_of } = args;

    init_telemetry()?;
    let insights = source.resolve()?;
    let service = insight_service(&insights)?;

    match service.retrain_at(as_of.unwrap_or_else(Utc::now))? {
        TrainOutcome::Trained(summary) => {
            println!(
                "Model artifacts written to {}",
                insights.model_dir.display()
            );
            render_training(&summary);
        }
        TrainOutcome::NoTrainingData => {
            println!("No reviews available; existing artifacts were left in place.");
        }
    }
    Ok(())
}

pub(crate) fn run_dataset(args: DatasetArgs) -> Result<(), AppError> {
    let DatasetArgs { source, out } = args;

    init_telemetry()?;
    let service = insight_service(&source.resolve()?)?;
    let rows = service.training_dataset()?;

    match out {
        Some(path) => {
            let file = BufWriter::new(File::create(&path)?);
            write_dataset_csv(&rows, file)?;
            println!("Wrote {} training rows to {}", rows.len(), path.display());
        }
        None => write_dataset_csv(&rows, io::stdout().lock())?,
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { model_dir, as_of } = args;

    init_telemetry()?;
    let now = as_of.unwrap_or_else(Utc::now);
    let (model_dir, _scratch) = demo_model_dir(model_dir)?;
    let service = InsightService::new(
        Arc::new(InMemoryRecordStore::from_snapshot(seed_snapshot(now))),
        Arc::new(FsModelStore::new(&model_dir)),
    );

    let employees = ["EMP1A2B3C4D", "EMP5E6F7A8B", "EMP9C0D1E2F"];
    let goals = ["GOL3B4A5C6D", "GOL7E8F9A0B", "GOL9E0F1A2B"];

    println!("Talent insights demo");
    println!("Model directory: {}", model_dir.display());

    println!("\nBefore training");
    for id in employees {
        render_employee(&service.score_employee_at(id, now)?);
    }
    for id in goals {
        render_goal(&service.score_goal_at(id, now)?);
    }

    println!("\nTraining");
    match service.retrain_at(now)? {
        TrainOutcome::Trained(summary) => render_training(&summary),
        TrainOutcome::NoTrainingData => println!("  No reviews available."),
    }

    println!("\nAfter training");
    for id in employees {
        render_employee(&service.score_employee_at(id, now)?);
    }
    for id in goals {
        render_goal(&service.score_goal_at(id, now)?);
    }

    Ok(())
}

/// Logs go to stderr, so enabling them never interleaves with stdout output.
fn init_telemetry() -> Result<(), AppError> {
    telemetry::init(&AppConfig::load()?.telemetry)?;
    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(AppError::Render)
}

/// The returned [`TempDir`] owns the scratch directory and must outlive the demo.
fn demo_model_dir(requested: Option<PathBuf>) -> Result<(PathBuf, Option<TempDir>), AppError> {
    match requested {
        Some(dir) => {
            clear_artifacts(&dir)?;
            Ok((dir, None))
        }
        None => {
            let scratch = tempfile::Builder::new()
                .prefix("talent-insights-demo")
                .tempdir()?;
            Ok((scratch.path().to_path_buf(), Some(scratch)))
        }
    }
}

fn clear_artifacts(dir: &Path) -> Result<(), AppError> {
    let store = FsModelStore::new(dir);
    for key in ArtifactKey::ALL {
        match std::fs::remove_file(store.artifact_path(key)) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn render_employee(result: &EmployeeScoreResult) {
    let features = &result.features;
    println!(
        "\nEmployee {}: predicted performance {:.2} ({})",
        result.employee_id,
        result.predicted_performance,
        path_label(&result.meta)
    );
    println!(
        "  goals {} | completion {:.2} | feedback {} | days since review {} | engagement {}",
        features.num_goals,
        features.goal_completion_rate,
        optional(features.avg_feedback_rating),
        features.days_since_review,
        optional(features.engagement_score)
    );
    for recommendation in &result.recommendations {
        println!("  - {recommendation}");
    }
}

fn render_goal(result: &GoalScoreResult) {
    let features = &result.features;
    println!(
        "\nGoal {}: completion probability {:.2} ({})",
        result.goal_id,
        result.probability,
        path_label(&result.meta)
    );
    println!(
        "  progress {:.0}% | days left {} | assignees {}",
        features.progress_ratio * 100.0,
        features.days_left,
        features.num_assignees
    );
}

fn render_training(summary: &TrainingSummary) {
    for artifact in &summary.artifacts {
        println!(
            "  {}: {} samples ({} train / {} held out), ROC-AUC {}, RMSE {}",
            artifact.key.label(),
            artifact.sample_count,
            artifact.metrics.train_rows,
            artifact.metrics.test_rows,
            optional(artifact.metrics.roc_auc),
            optional(artifact.metrics.rmse)
        );
    }
}

fn path_label(meta: &ScoreMeta) -> String {
    match meta.path {
        ScoringPath::Fallback => "fallback formula".to_string(),
        ScoringPath::Model => format!(
            "model: {}",
            meta.model_kind.as_deref().unwrap_or("unknown")
        ),
    }
}

fn optional(value: Option<f64>) -> String {
    value
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}
