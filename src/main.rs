mod api;
mod config;
mod error;
mod render;
mod report;
mod tracker;

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use api::{AnalysisApi, SiteId};
use config::{CliArgs, Command};
use error::ApiError;
use report::ReportModel;
use tracker::{JobTracker, TrackingOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seo_console=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    info!("Starting seo-console v{}", env!("CARGO_PKG_VERSION"));
    info!("Audit backend: {}", args.api_url);

    let api = Arc::new(AnalysisApi::new(args.api_url.clone()));

    match args.command {
        Command::Analyze { site_id } => analyze(api, site_id).await,
        Command::Status { site_id } => status(&api, site_id).await,
        Command::Report { site_id } => report(&api, site_id).await,
        Command::History { site_id, limit } => history(&api, site_id, limit).await,
    }
}

/// Trigger a run, follow its progress, then render the fresh report.
async fn analyze(api: Arc<AnalysisApi>, site_id: SiteId) -> anyhow::Result<()> {
    let mut tracker = JobTracker::new(api.clone());
    let mut handle = tracker.start(site_id).await?;

    let mut progress_rx = handle.progress();
    let printer = tokio::spawn(async move {
        while progress_rx.changed().await.is_ok() {
            let snapshot = progress_rx.borrow_and_update().clone();
            let step = snapshot.current_step.as_deref().unwrap_or("working");
            info!("[{:>3}%] {}", snapshot.progress_percentage, step);
        }
    });

    // Ctrl+C stops tracking rather than leaving the poll loop behind.
    let outcome = {
        let wait = handle.wait();
        tokio::pin!(wait);
        tokio::select! {
            outcome = &mut wait => Some(outcome),
            _ = tokio::signal::ctrl_c() => None,
        }
    };
    printer.abort();

    let outcome = match outcome {
        Some(outcome) => outcome,
        None => {
            info!("Interrupted, stopping tracking");
            handle.stop();
            TrackingOutcome::Stopped
        }
    };

    match outcome {
        TrackingOutcome::Completed { analysis_id } => {
            match analysis_id {
                Some(id) => info!("Analysis {} completed", id),
                None => info!("Analysis completed"),
            }
            let payload = api.fetch_latest_report(site_id).await?;
            println!("{}", render::render_report(&ReportModel::new(payload)));
            Ok(())
        }
        TrackingOutcome::Failed { message } => {
            error!("Analysis failed: {}", message);
            std::process::exit(1);
        }
        TrackingOutcome::Stopped => Ok(()),
    }
}

async fn status(api: &AnalysisApi, site_id: SiteId) -> anyhow::Result<()> {
    match api.fetch_progress(site_id).await {
        Ok(progress) => {
            println!(
                "{} {}%{}",
                progress.status.label(),
                progress.progress_percentage,
                progress
                    .current_step
                    .as_deref()
                    .map(|s| format!(" - {}", s))
                    .unwrap_or_default()
            );
            if let Some(message) = progress.error_message {
                println!("error: {}", message);
            }
            Ok(())
        }
        Err(ApiError::NotFound) => {
            println!("No analysis in progress for site {}", site_id);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn report(api: &AnalysisApi, site_id: SiteId) -> anyhow::Result<()> {
    match api.fetch_latest_report(site_id).await {
        Ok(payload) => {
            println!("{}", render::render_report(&ReportModel::new(payload)));
            Ok(())
        }
        Err(ApiError::NotFound) => {
            println!("No report yet for site {}; run `analyze` first", site_id);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn history(api: &AnalysisApi, site_id: SiteId, limit: u32) -> anyhow::Result<()> {
    let summaries = api.fetch_history(site_id, limit).await?;
    if summaries.is_empty() {
        println!("No past analyses for site {}", site_id);
        return Ok(());
    }
    for summary in summaries {
        let when = summary
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  #{}  total {:.0}  (tech {:.0} / content {:.0} / ux {:.0} / auth {:.0})",
            when,
            summary.id,
            summary.total_score,
            summary.technical_score,
            summary.content_score,
            summary.user_experience_score,
            summary.authority_score
        );
    }
    Ok(())
}
