use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use esg_risk_ai::config::AppConfig;
use esg_risk_ai::error::AppError;
use esg_risk_ai::http::{build_router, AppState};
use esg_risk_ai::risk::artifacts::ModelArtifacts;
use esg_risk_ai::risk::predict::{PredictionError, RiskPredictor};
use esg_risk_ai::risk::supplier::SupplierRecord;
use esg_risk_ai::risk::tables::RiskTables;
use esg_risk_ai::risk::train::{train_and_save, TrainingConfig, TrainingReport};
use esg_risk_ai::telemetry;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "Supplier ESG Risk Service",
    about = "Train and serve the supplier ESG risk tier classifier",
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
    /// Run the offline training pipeline and persist the artifacts
    Train(TrainArgs),
    /// Predict the three built-in sample suppliers against saved artifacts
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug, Default)]
struct TrainArgs {
    /// Override the configured artifact directory
    #[arg(long)]
    artifact_dir: Option<PathBuf>,
    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,
    /// Fraction of rows held out for evaluation
    #[arg(long)]
    holdout_fraction: Option<f64>,
}

#[derive(Args, Debug, Default)]
struct CheckArgs {
    /// Override the configured artifact directory
    #[arg(long)]
    artifact_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Train(args) => run_training(args),
        Command::Check(args) => run_check(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let predictor = load_predictor(&config.artifacts.dir);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState::new(predictor, readiness_flag.clone(), prometheus_handle);

    let app = build_router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "supplier ESG risk service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Missing or unreadable artifacts leave the service up but unable to
/// predict; every request then reports the documented model-not-loaded
/// error.
fn load_predictor(dir: &Path) -> Option<RiskPredictor> {
    match ModelArtifacts::load_optional(dir) {
        Ok(Some(artifacts)) => {
            info!(
                dir = %dir.display(),
                features = artifacts.schema.len(),
                "model artifacts loaded"
            );
            Some(RiskPredictor::new(RiskTables::standard(), artifacts))
        }
        Ok(None) => {
            warn!(
                dir = %dir.display(),
                "model artifacts missing; run the train command first"
            );
            None
        }
        Err(err) => {
            warn!(error = %err, "model artifacts unreadable; predictions will fail");
            None
        }
    }
}

fn run_training(args: TrainArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let dir = args.artifact_dir.unwrap_or(config.artifacts.dir);
    let mut training = TrainingConfig::default();
    if let Some(max_depth) = args.max_depth {
        training.max_depth = max_depth;
    }
    if let Some(fraction) = args.holdout_fraction {
        training.holdout_fraction = fraction;
    }

    let report = train_and_save(&training, &dir)?;
    render_training_report(&report, &dir);
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let dir = args.artifact_dir.unwrap_or(config.artifacts.dir);

    let artifacts = ModelArtifacts::load_optional(&dir)
        .map_err(|_| AppError::Prediction(PredictionError::ModelNotLoaded))?
        .ok_or(AppError::Prediction(PredictionError::ModelNotLoaded))?;

    let predictor = RiskPredictor::new(RiskTables::standard(), artifacts);

    println!("Supplier ESG risk checker");
    for (name, record) in sample_suppliers() {
        let prediction = predictor.predict(&record)?;
        println!("\n--- {name} ---");
        println!("Prediction: {}", prediction.prediction);
        println!("Confidence:");
        println!(
            "  - Low:    {:.2}%",
            prediction.confidence_scores.low * 100.0
        );
        println!(
            "  - Medium: {:.2}%",
            prediction.confidence_scores.medium * 100.0
        );
        println!(
            "  - High:   {:.2}%",
            prediction.confidence_scores.high * 100.0
        );
    }

    Ok(())
}

fn render_training_report(report: &TrainingReport, dir: &Path) {
    println!("Training complete");
    println!(
        "Samples: {}  Features: {}",
        report.n_samples, report.n_features
    );
    if let Some(accuracy) = report.holdout_accuracy {
        println!("Holdout accuracy: {accuracy:.2}");
    }
    println!("Training accuracy: {:.2}", report.training_accuracy);
    println!("Artifacts written to {}", dir.display());
}

/// Sample suppliers engineered to sit clearly in each tier.
fn sample_suppliers() -> Vec<(&'static str, SupplierRecord)> {
    vec![
        (
            "Green Threads USA (expected Low)",
            SupplierRecord {
                name: Some("Green Threads USA".to_string()),
                country: Some("USA".to_string()),
                industry_vertical: Some("Raw Material Farming".to_string()),
                processing_type: Some("Farming".to_string()),
                sector: Some("Apparel".to_string()),
                number_of_workers: Some("51-200".to_string()),
                total_emissions_kg_co2e: Some(30_000.0),
                water_usage_m3: Some(20_000.0),
                turnover_rate_percent: Some(5.0),
                workplace_accidents_last_year: Some(0.0),
                has_anti_corruption_policy: Some(true),
                publishes_esg_report: Some(true),
                is_iso14001_certified: Some(true),
                is_sa8000_certified: Some(true),
            },
        ),
        (
            "Ankara Weaving Mill (expected Medium)",
            SupplierRecord {
                name: Some("Ankara Weaving Mill".to_string()),
                country: Some("Turkey".to_string()),
                industry_vertical: Some("Weaving & Knitting".to_string()),
                processing_type: Some("Weaving".to_string()),
                sector: Some("Apparel".to_string()),
                number_of_workers: Some("501-1000".to_string()),
                total_emissions_kg_co2e: Some(115_000.0),
                water_usage_m3: Some(90_000.0),
                turnover_rate_percent: Some(18.0),
                workplace_accidents_last_year: Some(4.0),
                has_anti_corruption_policy: Some(true),
                publishes_esg_report: Some(false),
                is_iso14001_certified: Some(true),
                is_sa8000_certified: Some(false),
            },
        ),
        (
            "Dhaka Dye Works (expected High)",
            SupplierRecord {
                name: Some("Dhaka Dye Works".to_string()),
                country: Some("Bangladesh".to_string()),
                industry_vertical: Some("Dyeing & Finishing".to_string()),
                processing_type: Some("Dyeing|Finishing".to_string()),
                sector: Some("Apparel".to_string()),
                number_of_workers: Some("1001-5000".to_string()),
                total_emissions_kg_co2e: Some(350_000.0),
                water_usage_m3: Some(200_000.0),
                turnover_rate_percent: Some(30.0),
                workplace_accidents_last_year: Some(10.0),
                has_anti_corruption_policy: Some(false),
                publishes_esg_report: Some(false),
                is_iso14001_certified: Some(false),
                is_sa8000_certified: Some(false),
            },
        ),
    ]
}
