use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use screener::api_client::ApiClient;
use screener::config::Config;
use screener::dashboard::{DashboardState, StatisticsAggregator};
use screener::models::{CandidateId, CandidateRecord, ResumeFile};
use screener::presentation::{NotificationKind, Notifier, Route, RouteRecorder};
use screener::upload::{StartUpload, UploadOutcome, UploadPipeline};

#[derive(Debug, Parser)]
#[command(name = "screener", version, about = "Resume screener dashboard and upload client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show dashboard statistics and the most recent candidates
    Stats,
    /// Upload a PDF or DOCX resume for analysis
    Upload {
        file: PathBuf,
        /// Job description to score the resume against
        #[arg(long, conflicts_with = "job_description_file")]
        job_description: Option<String>,
        /// Read the job description from a file
        #[arg(long)]
        job_description_file: Option<PathBuf>,
    },
    /// Show one candidate
    Show { id: CandidateId },
    /// Check that the analysis service is up
    Health,
}

/// Prints notifications to stderr, the CLI's stand-in for toasts.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => eprintln!("✔ {message}"),
            NotificationKind::Error => eprintln!("✖ {message}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting screener v{}", env!("CARGO_PKG_VERSION"));
    info!("Analysis service: {}", config.api_url);

    let client = Arc::new(ApiClient::from_config(&config));
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

    match cli.command {
        Command::Stats => run_stats(client, notifier).await,
        Command::Upload {
            file,
            job_description,
            job_description_file,
        } => {
            let job_description = match job_description_file {
                Some(path) => Some(
                    tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Could not read {}", path.display()))?,
                ),
                None => job_description,
            };
            run_upload(client, notifier, file, job_description).await
        }
        Command::Show { id } => {
            let candidate = client
                .get_candidate(&id)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            print_candidate(&candidate);
            Ok(())
        }
        Command::Health => {
            let health = client
                .health()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            println!(
                "{} ({})",
                health.status,
                health.timestamp.as_deref().unwrap_or("no timestamp")
            );
            Ok(())
        }
    }
}

async fn run_stats(client: Arc<ApiClient>, notifier: Arc<dyn Notifier>) -> Result<()> {
    let aggregator = StatisticsAggregator::new(client, notifier);
    let mut state = DashboardState::default();
    let statistics = aggregator.refresh(&mut state, Local::now()).await;

    for card in statistics.cards() {
        println!("{:<18} {}", card.title, card.value);
    }
    println!(
        "{:<18} {} qualified, {} not a fit",
        "",
        statistics.categories.qualified,
        statistics.categories.not_a_fit
    );

    println!();
    println!("Recent Candidates");
    if state.recent_candidates.is_empty() {
        println!("  No candidates yet. Upload your first resume to get started!");
    }
    for candidate in &state.recent_candidates {
        print_candidate(candidate);
    }
    Ok(())
}

async fn run_upload(
    client: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    path: PathBuf,
    job_description: Option<String>,
) -> Result<()> {
    // The picker's job: only hand accepted files to the pipeline.
    let file = ResumeFile::from_path(&path)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    if let Err(rejected) = file.check_accepted() {
        notifier.notify(NotificationKind::Error, &rejected.to_string());
        bail!(rejected);
    }

    let navigator = Arc::new(RouteRecorder::default());
    let pipeline = UploadPipeline::new(client.clone(), notifier, navigator.clone());

    let handle = match pipeline.start_upload(file, job_description) {
        StartUpload::Started(handle) => handle,
        StartUpload::Rejected => bail!("An upload is already in progress"),
    };
    eprintln!("Analyzing {} ...", path.display());

    match handle.outcome().await {
        Some(UploadOutcome::Succeeded { .. }) => {}
        Some(UploadOutcome::Failed { error }) => bail!("Upload failed: {error}"),
        None => bail!("Upload was abandoned before it finished"),
    }

    match navigator.take() {
        Some(Route::CandidateDetail(id)) => match client.get_candidate(&id).await {
            Ok(candidate) => print_candidate(&candidate),
            Err(e) => println!("Candidate {id}: {}", e.user_message()),
        },
        Some(Route::CandidateList) | None => {
            let candidates = client
                .list_candidates()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            for candidate in &candidates {
                print_candidate(candidate);
            }
        }
    }
    Ok(())
}

fn print_candidate(candidate: &CandidateRecord) {
    let id = candidate
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let uploaded = candidate
        .uploaded_at()
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown date".to_string());
    println!(
        "  [{id}] {} | {} | Score: {}% | Uploaded {uploaded}",
        candidate.display_name(),
        candidate.category_label(),
        candidate.overall_score().round()
    );
}
