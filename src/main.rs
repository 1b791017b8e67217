//! Jira worklog reporting CLI.
//!
//! Fetches time-tracking entries for a day or a date range through
//! `jiralog_api` and renders them as a table, summary metrics and an
//! hours-per-user chart, with optional CSV export.

mod config;
mod output;
mod store;
mod summary;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::debug;

use jiralog_api::{
    DateWindow, JiraClient, JiraConfig, SearchSource, UpdatedFeedSource, WorklogRecord,
    WorklogSource,
};

use config::{ConfigManager, Settings};
use output::OutputFormat;
use store::RecordStore;

#[derive(Parser)]
#[command(name = "jiralog")]
#[command(author, version, about = "Jira worklog reporting CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: table (default) or json
    #[arg(long, global = true, default_value = "table")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Worklogs for a single day (defaults to today)
    Day {
        /// Day to report, YYYY-MM-DD
        date: Option<NaiveDate>,

        /// Keep only records authored by this user
        #[arg(long)]
        user: Option<String>,

        /// Write the records as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Re-render every N seconds, reusing cached records for up to
        /// five minutes
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,

        /// Drop cached records before every render instead of reusing them
        #[arg(long)]
        refresh: bool,
    },

    /// Worklogs for an inclusive date range
    Range {
        /// First day of the range, YYYY-MM-DD
        from: NaiveDate,

        /// Last day of the range, YYYY-MM-DD
        to: NaiveDate,

        /// Extra JQL predicate ANDed into the issue search
        #[arg(long)]
        jql: Option<String>,

        /// Keep only records authored by this user
        #[arg(long)]
        user: Option<String>,

        /// Write the records as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Manage stored credentials
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print current settings (token redacted)
    Show,
    /// Store credentials in the config file
    Set {
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        api_token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Day {
            date,
            user,
            csv,
            watch,
            refresh,
        } => run_day(date, user, csv, watch, refresh, cli.format).await,
        Commands::Range {
            from,
            to,
            jql,
            user,
            csv,
        } => run_range(from, to, jql, user, csv, cli.format).await,
        Commands::Config { action } => run_config(action),
    }
}

async fn run_day(
    date: Option<NaiveDate>,
    user: Option<String>,
    csv: Option<PathBuf>,
    watch: Option<u64>,
    refresh: bool,
    format: OutputFormat,
) -> Result<()> {
    let day = date.unwrap_or_else(|| Local::now().date_naive());
    let window = DateWindow::single(day);
    let client = build_client(&load_settings()?)?;
    let source = UpdatedFeedSource;

    let Some(interval) = watch else {
        let records = source
            .fetch(&client, &window)
            .await
            .context("failed to fetch worklogs from Jira")?;
        return report(&records, user.as_deref(), csv.as_deref(), format);
    };

    let store = RecordStore::new(Duration::from_secs(store::DEFAULT_TTL_SECS));
    let key = format!("day:{day}");
    loop {
        if refresh {
            store.invalidate(&key);
        }
        let records = match store.get(&key) {
            Some(cached) => {
                debug!("rendering {} cached records for {key}", cached.len());
                cached
            }
            None => {
                let fresh = source
                    .fetch(&client, &window)
                    .await
                    .context("failed to fetch worklogs from Jira")?;
                store.set(key.clone(), fresh.clone());
                fresh
            }
        };

        eprintln!("── {} · {} ──", day, Local::now().format("%H:%M:%S"));
        report(&records, user.as_deref(), csv.as_deref(), format)?;
        tokio::time::sleep(Duration::from_secs(interval.max(1))).await;
    }
}

async fn run_range(
    from: NaiveDate,
    to: NaiveDate,
    jql: Option<String>,
    user: Option<String>,
    csv: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    // Validated before credentials are even read; an inverted range must
    // never reach the network.
    let window = DateWindow::new(from, to)?;
    let client = build_client(&load_settings()?)?;

    let records = SearchSource { extra_jql: jql }
        .fetch(&client, &window)
        .await
        .context("failed to fetch worklogs from Jira")?;
    report(&records, user.as_deref(), csv.as_deref(), format)
}

fn run_config(action: ConfigAction) -> Result<()> {
    let manager = ConfigManager::new();
    match action {
        ConfigAction::Show => {
            let settings = manager.load();
            println!("domain:    {}", value_or_unset(&settings.domain));
            println!("email:     {}", value_or_unset(&settings.email));
            println!(
                "api_token: {}",
                if settings.api_token.is_empty() {
                    "<unset>"
                } else {
                    "<set>"
                }
            );
        }
        ConfigAction::Set {
            domain,
            email,
            api_token,
        } => {
            let settings = manager.load().with_overrides(domain, email, api_token);
            manager
                .save(&settings)
                .context("failed to write config file")?;
            println!("Saved {}", manager.path().display());
        }
    }
    Ok(())
}

fn value_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "<unset>"
    } else {
        value
    }
}

fn load_settings() -> Result<Settings> {
    let settings = ConfigManager::new().resolve();
    if !settings.is_complete() {
        bail!(
            "missing Jira credentials: set JIRA_DOMAIN, JIRA_EMAIL and JIRA_API_TOKEN \
             or run `jiralog config set`"
        );
    }
    Ok(settings)
}

fn build_client(settings: &Settings) -> Result<JiraClient> {
    let config = JiraConfig::new(
        settings.domain.as_str(),
        settings.email.as_str(),
        settings.api_token.as_str(),
    );
    Ok(JiraClient::new(config)?)
}

fn report(
    records: &[WorklogRecord],
    user: Option<&str>,
    csv: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let view: Vec<WorklogRecord> = match user {
        Some(user) => summary::filter_by_user(records.to_vec(), user),
        None => records.to_vec(),
    };

    output::print_records(&view, format)?;
    if format == OutputFormat::Table && !view.is_empty() {
        println!();
        output::print_summary(&summary::summarize(&view));
    }

    if let Some(path) = csv {
        output::write_csv(path, &view)
            .with_context(|| format!("failed to write CSV to {}", path.display()))?;
        eprintln!("CSV written to {}", path.display());
    }
    Ok(())
}
