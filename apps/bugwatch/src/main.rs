//! Bugwatch CLI binary entry point.
//! Resolves configuration, runs the selected pipeline and prints results.

use bugwatch::cli::{Cli, Commands};
use bugwatch::config::{self, Effective, Overrides};
use bugwatch::notify::{MailSettings, Notifier, SmtpMailer};
use bugwatch::query::HttpSearchClient;
use bugwatch::state::StateStore;
use bugwatch::{output, pipeline, utils, Result};
use clap::Parser;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{} {}", utils::error_prefix(), err);
        std::process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let overrides = cli.cmd.overrides();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Report { .. } => {
            let eff = resolve(&overrides)?;
            let client = HttpSearchClient::new(&eff.endpoint);
            let rows = pipeline::run_report(&client, &eff)?;
            print_stdout(&output::render_report(&rows, &eff.output, &eff.show_bug_url));
            Ok(())
        }
        Commands::Notify { dry_run, .. } => {
            let eff = resolve(&overrides)?;
            let client = HttpSearchClient::new(&eff.endpoint);
            notify(&client, &eff, dry_run)
        }
    }
}

fn resolve(overrides: &Overrides) -> Result<Effective> {
    let eff = config::resolve_effective(overrides)?;
    if eff.config_path.is_none() {
        tracing::debug!("no bugwatch.toml found; using defaults");
    }
    Ok(eff)
}

fn notify(client: &HttpSearchClient, eff: &Effective, dry_run: bool) -> Result<()> {
    let store = StateStore::new(&eff.state_file);
    let mailer = SmtpMailer::new(&eff.smtp_host, eff.smtp_port);
    let settings: MailSettings = eff.mail.clone();
    let notifier = Notifier::new(&mailer, settings);
    if dry_run {
        match pipeline::preview_notify(client, &store, &notifier, eff)? {
            Some(email) => {
                let message = email.to_message()?;
                print_stdout(&String::from_utf8_lossy(&message.formatted()));
            }
            None => eprintln!("{} no new bugs", utils::note_prefix()),
        }
        return Ok(());
    }
    let outcome = pipeline::run_notify(client, &store, &notifier, eff)?;
    tracing::info!(
        new = outcome.new.len(),
        sent = outcome.sent,
        seen = outcome.seen,
        "notify finished"
    );
    Ok(())
}

fn print_stdout(s: &str) {
    let mut out = io::stdout().lock();
    // A closed pipe (e.g. `| head`) is not worth a panic.
    let _ = out.write_all(s.as_bytes());
    let _ = out.flush();
}
