//! bugvet - release bug verification CLI
//!
//! For every bug fixed in an accepted release tag, checks that each
//! linked review request carries the QA approval label and, when the
//! policy passes, moves the bug from ON_QA to VERIFIED. Failing bugs
//! receive an explanatory private comment instead; the comment is
//! posted at most once per distinct text.
//!
//! ## Commands
//!
//! - `verify`: run the full verification procedure with side effects
//! - `resolve`: print each bug's linked review requests, no side effects

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use bugvet_clients::{BugzillaConfig, BugzillaTracker, GithubCodeHost, GithubConfig};
use bugvet_core::{init_tracing, resolve_links, BugId, Verifier, VerifierConfig};

#[derive(Parser)]
#[command(name = "bugvet")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Verify release bugs against QA approval of their review requests", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify bugs fixed in a release and move approved ones to VERIFIED
    Verify {
        /// Release tag the bugs were fixed in (e.g. 4.14.3)
        #[arg(long)]
        tag: String,

        /// Bug ID to verify (repeatable)
        #[arg(long = "bug", value_name = "ID", required = true)]
        bugs: Vec<BugId>,

        /// QA approval label required on every linked review request
        #[arg(long, default_value = "qe-approved")]
        approval_label: String,

        /// Robot identity whose prior comments suppress re-posting
        /// (repeatable; defaults to the built-in pair)
        #[arg(long = "robot", value_name = "ACCOUNT")]
        robots: Vec<String>,

        #[command(flatten)]
        endpoints: EndpointArgs,
    },

    /// Resolve bugs to their linked review requests without side effects
    Resolve {
        /// Bug ID to resolve (repeatable)
        #[arg(long = "bug", value_name = "ID", required = true)]
        bugs: Vec<BugId>,

        #[command(flatten)]
        endpoints: EndpointArgs,
    },
}

#[derive(Args)]
struct EndpointArgs {
    /// Defect tracker base URL
    #[arg(long, env = "BUGVET_TRACKER_URL", default_value = "https://bugzilla.redhat.com")]
    tracker_url: String,

    /// Defect tracker API key
    #[arg(long, env = "BUGVET_TRACKER_API_KEY", hide_env_values = true)]
    tracker_api_key: Option<String>,

    /// Code host API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    github_api: String,

    /// Code host bearer token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
}

impl EndpointArgs {
    fn tracker(&self) -> BugzillaTracker {
        let mut config = BugzillaConfig::new(&self.tracker_url);
        if let Some(key) = &self.tracker_api_key {
            config = config.with_api_key(key);
        }
        BugzillaTracker::new(config)
    }

    fn code_host(&self) -> GithubCodeHost {
        let mut config = GithubConfig::new(&self.github_api);
        if let Some(token) = &self.github_token {
            config = config.with_token(token);
        }
        GithubCodeHost::new(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(level, cli.json);

    match cli.command {
        Commands::Verify {
            tag,
            bugs,
            approval_label,
            robots,
            endpoints,
        } => {
            let mut config = VerifierConfig::default().with_approval_label(approval_label);
            if !robots.is_empty() {
                config = config.with_robot_identities(robots);
            }
            let verifier = Verifier::new(
                Arc::new(endpoints.tracker()),
                Arc::new(endpoints.code_host()),
                config,
            );

            let errors = verifier.verify_bugs(&bugs, &tag).await;
            for error in &errors {
                eprintln!("error: {error}");
            }
            if !errors.is_empty() {
                bail!("verification finished with {} error(s)", errors.len());
            }
        }

        Commands::Resolve { bugs, endpoints } => {
            let tracker = endpoints.tracker();
            let (resolved, errors) =
                resolve_links(&tracker, &VerifierConfig::default(), &bugs).await;

            for (bug_id, requests) in &resolved {
                let joined: Vec<String> = requests.iter().map(|r| r.to_string()).collect();
                println!("bug {bug_id}: {}", joined.join(", "));
            }
            for error in &errors {
                eprintln!("error: {error}");
            }
            if !errors.is_empty() {
                bail!("resolution finished with {} error(s)", errors.len());
            }
        }
    }

    Ok(())
}
