use clap::{Parser, Subcommand};
use url::Url;

/// SEO Audit Console. Triggers audit runs on the backend and renders
/// their reports.
#[derive(Parser, Debug, Clone)]
#[command(name = "seo-console")]
pub struct CliArgs {
    /// Base URL of the audit backend
    #[arg(long = "api-url", default_value = DEFAULT_API_URL)]
    pub api_url: Url,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Trigger an analysis run and follow it to completion
    Analyze {
        /// Site to analyze
        site_id: i64,
    },
    /// Show the current progress record for a site
    Status { site_id: i64 },
    /// Fetch and render the latest report for a site
    Report { site_id: i64 },
    /// List past analysis summaries, most recent first
    History {
        site_id: i64,
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
}

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

// Polling constants
pub const POLL_INTERVAL_MS: u64 = 1000;
// Consecutive "no record yet" polls tolerated before the session is
// declared stuck. Transport errors do not count against this budget.
pub const NOT_FOUND_RETRY_BUDGET: u32 = 30;

// HTTP constants
pub const HTTP_TIMEOUT_SECS: u64 = 10;

// Core Web Vitals display targets. Classification only; these never
// feed back into any score.
pub const LCP_TARGET_SECS: f64 = 2.5;
pub const FID_TARGET_MS: f64 = 100.0;
pub const CLS_TARGET: f64 = 0.1;

// History constants
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

// Breakdown invariant: contribution should equal score * weight up to
// the producer's rounding.
pub const CONTRIBUTION_TOLERANCE: f64 = 0.5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_url_parses() {
        let url: Url = DEFAULT_API_URL.parse().unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn test_cli_args_analyze() {
        let args = CliArgs::parse_from(["seo-console", "analyze", "42"]);
        assert_eq!(args.api_url.as_str(), "http://localhost:8000/");
        match args.command {
            Command::Analyze { site_id } => assert_eq!(site_id, 42),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_args_custom_api_url() {
        let args = CliArgs::parse_from([
            "seo-console",
            "--api-url",
            "https://audits.example.com",
            "status",
            "7",
        ]);
        assert_eq!(args.api_url.host_str(), Some("audits.example.com"));
    }

    #[test]
    fn test_cli_args_history_default_limit() {
        let args = CliArgs::parse_from(["seo-console", "history", "7"]);
        match args.command {
            Command::History { site_id, limit } => {
                assert_eq!(site_id, 7);
                assert_eq!(limit, DEFAULT_HISTORY_LIMIT);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_args_history_explicit_limit() {
        let args = CliArgs::parse_from(["seo-console", "history", "7", "--limit", "3"]);
        match args.command {
            Command::History { limit, .. } => assert_eq!(limit, 3),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
