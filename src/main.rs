//! retail-dna - command line front end for the dashboard controller.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

use retail_dna::adapters::ai::{GeminiConfig, GeminiProvider, LlmInsightGateway, RetryPolicy};
use retail_dna::adapters::ingest::{load_dataset, synthetic_dataset, IngestError};
use retail_dna::adapters::storage::{FileKeyValueStore, InMemoryKeyValueStore};
use retail_dna::application::{
    DashboardController, DashboardError, DashboardSettings, DashboardStore, PipelineReport,
    StatusUpdate,
};
use retail_dna::config::{
    AiConfig, AppConfig, ConfigError, LogFormat, LoggingConfig, StorageBackend, StorageConfig,
    ValidationError,
};
use retail_dna::domain::foundation::{SegmentId, ValidationError as InvalidInput};
use retail_dna::domain::{Dataset, SegmentStatus};
use retail_dna::ports::{AIError, AIProvider, InsightGateway, KeyValueStore, StorageError};

#[derive(Parser)]
#[command(name = "retail-dna", version, about = "Learn shopper segments from behavioral data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a .csv or .json file and run the full pipeline
    Ingest { path: PathBuf },
    /// Run the pipeline on generated demo data
    Demo {
        #[arg(long, default_value_t = 50)]
        rows: usize,
    },
    /// List stored segments
    Segments,
    /// Deploy a segment as an active strategy
    Deploy { segment_id: String },
    /// Change a segment's status without deploying it
    Status {
        segment_id: String,
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Build the persona and friction profile for a segment
    Profile { segment_id: String },
    /// Regenerate merchandising recommendations
    Recommend,
    /// Delete stored state and return to the built-in defaults
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Discovery,
    Monitoring,
    Archived,
}

impl From<StatusArg> for SegmentStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Discovery => SegmentStatus::Discovery,
            StatusArg::Monitoring => SegmentStatus::Monitoring,
            StatusArg::Archived => SegmentStatus::Archived,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    InvalidConfig(#[from] ValidationError),
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Provider(#[from] AIError),
    #[error("segment not found: {0}")]
    UnknownSegment(SegmentId),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    if let Err(err) = installed {
        eprintln!("warning: tracing already initialised: {}", err);
    }
}

async fn run(command: Command, config: AppConfig) -> Result<(), CliError> {
    config.validate()?;
    let mut store = DashboardStore::load(key_value_store(&config.storage)).await?;

    match command {
        Command::Segments => {
            print_segments(&store);
            Ok(())
        }
        Command::Status { segment_id, status } => {
            let id = SegmentId::new(segment_id)?;
            let status = SegmentStatus::from(status);
            if !store.set_segment_status(&id, status).await? {
                return Err(CliError::UnknownSegment(id));
            }
            println!("{} -> {}", id, status);
            Ok(())
        }
        Command::Reset => {
            store.reset().await?;
            println!("Stored state cleared; built-in defaults restored");
            Ok(())
        }
        command => {
            let controller = DashboardController::new(
                insight_gateway(&config.ai)?,
                store,
                settings(&config),
            );
            spawn_event_logger(&controller);
            run_model_command(command, &controller).await
        }
    }
}

async fn run_model_command(
    command: Command,
    controller: &Arc<DashboardController>,
) -> Result<(), CliError> {
    match command {
        Command::Ingest { path } => {
            let dataset = load_dataset(&path).await?;
            run_pipeline(controller, dataset).await
        }
        Command::Demo { rows } => run_pipeline(controller, synthetic_dataset(rows)).await,
        Command::Deploy { segment_id } => {
            let id = SegmentId::new(segment_id)?;
            match controller
                .update_segment_status(&id, SegmentStatus::ActiveStrategy)
                .await?
            {
                StatusUpdate::DeploymentFailed { reason } => {
                    println!("Deployment failed: {}", reason);
                }
                _ => {
                    if let Some(notice) = controller.notice().await {
                        println!("{}", notice);
                    }
                    let deployed = controller.segments().await.into_iter().find(|s| s.id == id);
                    if let Some(manifest) = deployed.and_then(|s| s.manifest) {
                        println!("Technical hook: {}", manifest.technical_hook);
                        println!("Ad copy: {}", manifest.ad_copy_draft);
                        for step in &manifest.activation_plan {
                            println!("  - {} [{}] {}", step.step, step.status, step.delay);
                        }
                    }
                }
            }
            Ok(())
        }
        Command::Profile { segment_id } => {
            let id = SegmentId::new(segment_id)?;
            match controller.select_and_profile(&id).await? {
                Some(profile) => {
                    println!("Backstory: {}", profile.persona.backstory);
                    println!("Motivation: {}", profile.persona.motivation);
                    println!("Churn risks: {}", profile.persona.churn_risks.join(", "));
                    println!("Friction score: {}", profile.friction.friction_score);
                    println!("Primary gaps: {}", profile.friction.primary_gaps.join(", "));
                }
                None => println!("No profile available for {}", id),
            }
            Ok(())
        }
        Command::Recommend => {
            controller.refresh_recommendations().await?;
            print_recommendations(controller).await;
            Ok(())
        }
        Command::Segments | Command::Status { .. } | Command::Reset => Ok(()),
    }
}

async fn run_pipeline(
    controller: &Arc<DashboardController>,
    dataset: Dataset,
) -> Result<(), CliError> {
    let PipelineReport {
        sampled_rows,
        context_version,
        segments,
        reviews,
        recommendations,
    } = controller.ingest(dataset).await?;

    let context = controller.context().await;
    println!(
        "Domain: {} ({}), maturity {:.0}%",
        context.domain_name, context_version, context.maturity_index
    );
    println!(
        "Sampled {} rows -> {} segments, {} reviews, {} recommendations",
        sampled_rows, segments, reviews, recommendations
    );
    for segment in controller.segments().await {
        println!("  {:<24} {}", segment.id, segment.name);
    }
    print_recommendations(controller).await;
    Ok(())
}

fn print_segments(store: &DashboardStore) {
    let context = store.context();
    println!("Domain: {} ({})", context.domain_name, context.version);
    for segment in store.segments() {
        let marker = if store.selected() == Some(&segment.id) { "*" } else { " " };
        println!(
            "{} {:<24} {:<32} {:<16} n={}",
            marker, segment.id, segment.name, segment.status, segment.sample_size
        );
    }
}

async fn print_recommendations(controller: &DashboardController) {
    for rec in controller.recommendations().await {
        println!(
            "* {} -> {} ({}, confidence {:.0}%)",
            rec.title, rec.target_segment, rec.roi_projection, rec.confidence
        );
    }
}

fn spawn_event_logger(controller: &Arc<DashboardController>) {
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::debug!(?event, "Dashboard event");
        }
    });
}

fn key_value_store(storage: &StorageConfig) -> Arc<dyn KeyValueStore> {
    match storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
        StorageBackend::File => Arc::new(FileKeyValueStore::new(&storage.data_dir)),
    }
}

fn insight_gateway(ai: &AiConfig) -> Result<Arc<dyn InsightGateway>, CliError> {
    let api_key = ai.require_api_key()?;
    let provider = GeminiProvider::new(
        GeminiConfig::new(api_key.expose_secret().clone())
            .with_model(&ai.model)
            .with_base_url(&ai.base_url)
            .with_timeout(ai.timeout()),
    )?;
    let info = provider.provider_info();
    tracing::info!(
        provider = %info.name,
        model = %info.model,
        max_context_tokens = info.max_context_tokens,
        "Using model provider"
    );

    let gateway = LlmInsightGateway::new(Arc::new(provider))
        .with_retry_policy(RetryPolicy::new(ai.max_retries, ai.base_backoff()))
        .with_call_timeout(ai.timeout());
    Ok(Arc::new(gateway))
}

fn settings(config: &AppConfig) -> DashboardSettings {
    DashboardSettings {
        sample_limit: config.dashboard.sample_limit,
        debounce: config.dashboard.debounce(),
        notice_ttl: config.dashboard.notice_ttl(),
        event_capacity: config.dashboard.event_capacity,
    }
}
