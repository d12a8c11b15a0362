//! CLI argument parsing via `clap`.

use crate::config::Overrides;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bugwatch",
    version,
    about = "Bug tracker triage reports and new-bug notifications",
    long_about = "bugwatch — query a Bugzilla REST endpoint, normalize severities and print a sorted triage report, or mail newly matching bugs.\n\nConfiguration precedence: CLI > bugwatch.toml > defaults.",
    after_help = "Examples:\n  bugwatch report\n  bugwatch report --query 'component:disability' --output json\n  bugwatch notify --dry-run\n  bugwatch notify --state-file ~/data/seen.json --to triage@example.org",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current bugwatch version.")]
    Version,
    /// Print the triage report
    #[command(
        about = "Print a sorted triage report",
        long_about = "Run every report query, normalize severities and print one line per bug, sorted by severity, product, component and newest first.",
        after_help = "Examples:\n  bugwatch report\n  bugwatch report --output html > a11y.html"
    )]
    Report {
        #[arg(long, help = "Directory to start config discovery from (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Explicit path to bugwatch.toml|yaml")]
        config: Option<String>,
        #[arg(long, help = "Search endpoint URL")]
        endpoint: Option<String>,
        #[arg(long = "query", help = "Quicksearch query; repeat to merge several (replaces configured queries)")]
        queries: Vec<String>,
        #[arg(long, help = "Output mode: tsv|html|json (default: tsv)")]
        output: Option<String>,
    },
    /// Mail newly matching bugs
    #[command(
        about = "Mail bugs not seen by the previous run",
        long_about = "Run the notify queries, compare against the saved id set, save the current set and send one HTML mail listing new bugs. Nothing is sent when there are no new bugs.",
        after_help = "Examples:\n  bugwatch notify\n  bugwatch notify --dry-run"
    )]
    Notify {
        #[arg(long, help = "Directory to start config discovery from (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Explicit path to bugwatch.toml|yaml")]
        config: Option<String>,
        #[arg(long, help = "Search endpoint URL")]
        endpoint: Option<String>,
        #[arg(long, help = "Path of the seen-id state file")]
        state_file: Option<String>,
        #[arg(long, help = "Recipient address")]
        to: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Print the mail instead of sending; state is not saved")]
        dry_run: bool,
    },
}

impl Commands {
    /// Flags that feed config resolution.
    pub fn overrides(&self) -> Overrides {
        match self {
            Commands::Version => Overrides::default(),
            Commands::Report {
                repo_root,
                config,
                endpoint,
                queries,
                output,
            } => Overrides {
                repo_root: repo_root.clone(),
                config: config.clone(),
                endpoint: endpoint.clone(),
                queries: queries.clone(),
                output: output.clone(),
                ..Default::default()
            },
            Commands::Notify {
                repo_root,
                config,
                endpoint,
                state_file,
                to,
                ..
            } => Overrides {
                repo_root: repo_root.clone(),
                config: config.clone(),
                endpoint: endpoint.clone(),
                state_file: state_file.clone(),
                to: to.clone(),
                ..Default::default()
            },
        }
    }
}
