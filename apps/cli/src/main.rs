//! Command line client for the prior-authorization backend.
//!
//! Submits prior-authorization requests and polls them to completion, checks
//! a submission's status, probes backend authentication, runs FHIR⇄Availity
//! conversions through the remote mapper, and inspects the tracked API call
//! log and the cached result of the last submission.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{ArgAction, Parser, Subcommand};
use priorflow_cache::{CacheRecord, FileSlotCache, ResultCache};
use priorflow_client::{submit_and_poll, PriorAuthClient, TrackerQuery};
use priorflow_poll::{
    CancelToken, PollOptions, PollReport, Progress, ProgressObserver, ReviewStatus, StatusSnapshot,
};
use serde_json::Value;

mod config;

use config::Config;

#[derive(Parser)]
#[command(
    name = "priorflow",
    about = "Command line client for the prior-authorization backend",
    version,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a prior-authorization request and poll it to completion.
    Submit {
        /// Reuse an existing resource id instead of submitting a new request.
        #[arg(long)]
        resource_id: Option<String>,
        /// Seconds between poll attempts (1-10). Defaults to the config value.
        #[arg(short, long)]
        interval: Option<u64>,
        /// Maximum poll attempts (1-30). Defaults to the config value.
        #[arg(short, long)]
        max_attempts: Option<u32>,
        /// Submit only; skip polling.
        #[arg(long, action = ArgAction::SetTrue)]
        no_poll: bool,
    },

    /// One-shot status check for a submission.
    Status {
        /// Resource id of the submission.
        id: String,
        /// Pretty-print the embedded JSON payload, when present.
        #[arg(short, long, action = ArgAction::SetTrue)]
        pretty: bool,
    },

    /// Poll an existing submission until it settles.
    Poll {
        /// Resource id of the submission.
        id: String,
        /// Seconds between poll attempts (1-10). Defaults to the config value.
        #[arg(short, long)]
        interval: Option<u64>,
        /// Maximum poll attempts (1-30). Defaults to the config value.
        #[arg(short, long)]
        max_attempts: Option<u32>,
    },

    /// Probe the backend's authentication against the payer.
    Auth,

    /// Convert between FHIR and Availity through the remote mapper.
    Convert {
        #[command(subcommand)]
        command: ConvertCommands,
    },

    /// Inspect the tracked API call log.
    Tracker {
        #[command(subcommand)]
        command: TrackerCommands,
    },

    /// Inspect the cached result of the last submission.
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Print CLI version.
    Version,
}

#[derive(Subcommand)]
enum ConvertCommands {
    /// Convert a FHIR Claim to an Availity service review.
    ToAvaility {
        /// Path to a JSON file ("-" or omitted for stdin).
        input: Option<PathBuf>,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print JSON output.
        #[arg(short, long, action = ArgAction::SetTrue)]
        pretty: bool,
    },

    /// Convert an Availity service review to a FHIR Claim.
    ToFhir {
        /// Path to a JSON file ("-" or omitted for stdin).
        input: Option<PathBuf>,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print JSON output.
        #[arg(short, long, action = ArgAction::SetTrue)]
        pretty: bool,
    },
}

#[derive(Subcommand)]
enum TrackerCommands {
    /// List tracked calls.
    List {
        /// Endpoint filter ("all" disables it).
        #[arg(long, default_value = "all")]
        endpoint: String,
        /// One of: all, today, yesterday, week, month.
        #[arg(long, default_value = "all")]
        date_range: String,
        /// 1-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },

    /// Show one tracked call's payloads.
    Show {
        id: String,
        /// Pretty-print the payloads.
        #[arg(short, long, action = ArgAction::SetTrue)]
        pretty: bool,
    },

    /// Delete all tracked calls.
    Clear,
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Print the cached submission record.
    Show,
    /// Empty the cache slot.
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    init_logging(&config);

    match cli.command {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Submit {
            resource_id,
            interval,
            max_attempts,
            no_poll,
        } => {
            run_submit(&config, resource_id.as_deref(), interval, max_attempts, no_poll).await?;
        }
        Commands::Status { id, pretty } => {
            run_status(&config, &id, pretty).await?;
        }
        Commands::Poll {
            id,
            interval,
            max_attempts,
        } => {
            run_poll(&config, &id, interval, max_attempts).await?;
        }
        Commands::Auth => {
            run_auth(&config).await?;
        }
        Commands::Convert { command } => match command {
            ConvertCommands::ToAvaility {
                input,
                output,
                pretty,
            } => {
                run_convert(
                    &config,
                    Direction::ToAvaility,
                    input.as_deref(),
                    output.as_deref(),
                    pretty,
                )
                .await?;
            }
            ConvertCommands::ToFhir {
                input,
                output,
                pretty,
            } => {
                run_convert(
                    &config,
                    Direction::ToFhir,
                    input.as_deref(),
                    output.as_deref(),
                    pretty,
                )
                .await?;
            }
        },
        Commands::Tracker { command } => match command {
            TrackerCommands::List {
                endpoint,
                date_range,
                page,
                page_size,
            } => {
                run_tracker_list(&config, endpoint, date_range, page, page_size).await?;
            }
            TrackerCommands::Show { id, pretty } => {
                run_tracker_show(&config, &id, pretty).await?;
            }
            TrackerCommands::Clear => {
                run_tracker_clear(&config).await?;
            }
        },
        Commands::Cache { command } => match command {
            CacheCommands::Show => run_cache_show(&config)?,
            CacheCommands::Clear => run_cache_clear(&config)?,
        },
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run_submit(
    config: &Config,
    resource_id: Option<&str>,
    interval: Option<u64>,
    max_attempts: Option<u32>,
    no_poll: bool,
) -> Result<()> {
    let client = make_client(config)?;
    let cache = make_cache(config);

    if no_poll {
        // The clear-then-submit order still applies without polling.
        cache.clear().context("Failed to clear the result cache")?;
        let receipt = client.submit().await?;
        if let Err(error) = cache.save(&CacheRecord::submitted(receipt.resource_id.as_str())) {
            tracing::warn!(%error, "could not persist submission record");
        }
        println!("{}", receipt.raw.trim_end());
        return Ok(());
    }

    let options = poll_options(config, interval, max_attempts)?;
    let cancel = spawn_ctrl_c_handler();
    let report = submit_and_poll(
        &client,
        &cache,
        resource_id,
        options,
        &cancel,
        &ConsoleProgress,
    )
    .await?;
    finish_report(&report)
}

async fn run_poll(
    config: &Config,
    id: &str,
    interval: Option<u64>,
    max_attempts: Option<u32>,
) -> Result<()> {
    let client = make_client(config)?;
    let cache = make_cache(config);
    let options = poll_options(config, interval, max_attempts)?;
    let cancel = spawn_ctrl_c_handler();
    let report =
        submit_and_poll(&client, &cache, Some(id), options, &cancel, &ConsoleProgress).await?;
    finish_report(&report)
}

async fn run_status(config: &Config, id: &str, pretty: bool) -> Result<()> {
    let client = make_client(config)?;
    let raw = client.review_status_text(id).await?;
    let snapshot = StatusSnapshot::from_raw(raw);

    println!("Status: {}", snapshot.status);
    match &snapshot.json {
        Some(json) if pretty => println!("{}", serde_json::to_string_pretty(json)?),
        Some(json) => println!("{json}"),
        None => println!("{}", snapshot.raw.trim_end()),
    }
    Ok(())
}

async fn run_auth(config: &Config) -> Result<()> {
    let client = make_client(config)?;
    let probe = client.auth_probe().await?;

    match &probe.token {
        Some(token) => {
            println!("Authentication successful");
            println!("Token: {token}");
            Ok(())
        }
        None => {
            println!("{}", probe.raw.trim_end());
            bail!("authentication failed");
        }
    }
}

enum Direction {
    ToAvaility,
    ToFhir,
}

async fn run_convert(
    config: &Config,
    direction: Direction,
    input: Option<&Path>,
    output: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let payload = read_json_input(input)?;
    let client = make_client(config)?;
    let converted = match direction {
        Direction::ToAvaility => client.fhir_to_availity(&payload).await?,
        Direction::ToFhir => client.availity_to_fhir(&payload).await?,
    };
    write_json_output(&converted, output, pretty)
}

async fn run_tracker_list(
    config: &Config,
    endpoint: String,
    date_range: String,
    page: u32,
    page_size: u32,
) -> Result<()> {
    let client = make_client(config)?;
    let result = client
        .tracker_calls(&TrackerQuery {
            endpoint,
            date_range,
            page,
            page_size,
        })
        .await?;

    if result.calls.is_empty() {
        println!("No tracked calls.");
        return Ok(());
    }

    println!(
        "{:<12} {:<22} {:<24} {:<16} {}",
        "ID", "TIMESTAMP", "ENDPOINT", "REQUEST", "STATUS"
    );
    for call in &result.calls {
        println!(
            "{:<12} {:<22} {:<24} {:<16} {}",
            call.id,
            call.timestamp.as_deref().unwrap_or("-"),
            call.endpoint,
            call.request_id.as_deref().unwrap_or("-"),
            call.status.as_deref().unwrap_or("-"),
        );
    }
    println!(
        "Page {}/{} ({} calls)",
        result.current_page, result.total_pages, result.total_calls
    );
    Ok(())
}

async fn run_tracker_show(config: &Config, id: &str, pretty: bool) -> Result<()> {
    let client = make_client(config)?;
    let detail = client.tracker_call(id).await?;

    print_payload("FHIR payload", detail.fhir_payload.as_ref(), pretty)?;
    print_payload("Availity payload", detail.availity_payload.as_ref(), pretty)?;
    print_payload("Response", detail.response.as_ref(), pretty)?;
    Ok(())
}

async fn run_tracker_clear(config: &Config) -> Result<()> {
    let client = make_client(config)?;
    client.clear_tracker().await?;
    println!("Cleared all tracked API calls.");
    Ok(())
}

fn run_cache_show(config: &Config) -> Result<()> {
    let cache = make_cache(config);
    match cache.load().context("Failed to read the result cache")? {
        Some(record) => {
            println!("Resource ID: {}", record.resource_id);
            println!("Saved: {}", record.timestamp);
            if let Some(polling) = &record.polling_status {
                println!(
                    "Polling: {} after {} attempt(s) in {}s ({})",
                    polling.status,
                    polling.attempts,
                    polling.time,
                    if polling.success { "success" } else { "unfinished" }
                );
            }
            if let Some(json) = &record.availity_json {
                println!("\nAvaility response:\n{json}");
            }
            if let Some(json) = &record.fhir_json {
                println!("\nFHIR rendering:\n{json}");
            }
        }
        None => println!("No cached submission."),
    }
    Ok(())
}

fn run_cache_clear(config: &Config) -> Result<()> {
    let cache = make_cache(config);
    cache.clear().context("Failed to clear the result cache")?;
    println!("Cleared the cached submission.");
    Ok(())
}

fn make_client(config: &Config) -> Result<PriorAuthClient> {
    PriorAuthClient::with_timeout(
        &config.server.base_url,
        Duration::from_secs(config.server.http_timeout_seconds),
    )
    .context("Failed to create backend client")
}

fn make_cache(config: &Config) -> FileSlotCache {
    FileSlotCache::new(config.cache.directory.as_ref().map(PathBuf::from))
}

fn poll_options(
    config: &Config,
    interval: Option<u64>,
    max_attempts: Option<u32>,
) -> Result<PollOptions> {
    let interval = interval.unwrap_or(config.polling.interval_seconds);
    let max_attempts = max_attempts.unwrap_or(config.polling.max_attempts);
    Ok(PollOptions::validated(interval, max_attempts)?)
}

/// Ctrl-C requests cooperative cancellation; the current attempt finishes
/// before the session reports Stopped.
fn spawn_ctrl_c_handler() -> CancelToken {
    let cancel = CancelToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("stopping after the current attempt...");
            token.cancel();
        }
    });
    cancel
}

struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&self, progress: &Progress) {
        eprintln!(
            "[{}] {:>5.1}% {:>4} {}",
            progress.attempt_label(),
            progress.percent(),
            progress.elapsed_label(),
            progress.status_label()
        );
    }
}

fn finish_report(report: &PollReport) -> Result<()> {
    println!("Resource ID: {}", report.resource_id);
    println!(
        "Outcome: {} after {} attempt(s) in {}s",
        report.outcome,
        report.attempts,
        report.elapsed.as_secs()
    );
    if let Some(snapshot) = &report.last_snapshot {
        match &snapshot.json {
            Some(json) => println!("{}", serde_json::to_string_pretty(json)?),
            None => println!("{}", snapshot.raw.trim_end()),
        }
    }

    if report.outcome == ReviewStatus::Timeout {
        bail!("polling timed out after {} attempt(s)", report.attempts);
    }
    Ok(())
}

fn read_json_input(path: Option<&Path>) -> Result<Value> {
    let contents = match path {
        None => read_stdin()?,
        Some(path) if path.to_string_lossy() == "-" => read_stdin()?,
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
    };
    serde_json::from_str(&contents).context("input is not valid JSON")
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read JSON from stdin")?;
    Ok(buf)
}

fn write_json_output(value: &Value, output: Option<&Path>, pretty: bool) -> Result<()> {
    if let Some(output_path) = output {
        let content = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        fs::write(output_path, content)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        eprintln!("Wrote output to {}", output_path.display());
    } else if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}

fn print_payload(name: &str, payload: Option<&Value>, pretty: bool) -> Result<()> {
    match payload {
        Some(value) if pretty => println!("{name}:\n{}", serde_json::to_string_pretty(value)?),
        Some(value) => println!("{name}: {value}"),
        None => println!("{name}: (none)"),
    }
    Ok(())
}
