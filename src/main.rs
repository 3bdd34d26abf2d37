//! Leadscope main entry point
//!
//! Command-line interface for the lead-listing collector.

use clap::Parser;
use leadscope::config::{load_config, load_specialists, Config, Specialist};
use leadscope::job::{run_crawl, RunOptions};
use leadscope::scheduler::{JobRequest, JobScheduler, SchedulerConfig};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Leadscope: authenticated lead-listing collector
///
/// Logs into the broker portal once, crawls every configured specialist's
/// paginated lead listing, deduplicates leads, and writes per-status summary
/// CSVs (plus full detail rows with --full).
#[derive(Parser, Debug)]
#[command(name = "leadscope")]
#[command(version = "1.0.0")]
#[command(about = "Authenticated lead-listing collector", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Path to the specialists JSON file
    #[arg(long, default_value = "./specialists.json")]
    specialists: PathBuf,

    /// One-time OTP for this run (overrides any configured value)
    #[arg(long, value_name = "CODE")]
    otp: Option<String>,

    /// Capture full lead details in addition to the summary
    #[arg(long)]
    full: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "every")]
    dry_run: bool,

    /// Run continuously, enqueueing a crawl job every N minutes
    #[arg(long, value_name = "MINUTES", conflicts_with = "otp")]
    every: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let specialists = match load_specialists(&cli.specialists) {
        Ok(list) => {
            tracing::info!(
                "Loaded {} specialists from {}",
                list.len(),
                cli.specialists.display()
            );
            list
        }
        Err(e) => {
            tracing::error!("Failed to load specialists: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &specialists);
        return Ok(());
    }

    if let Some(minutes) = cli.every {
        return handle_schedule(&cli, &config, minutes).await;
    }

    handle_crawl(&config, &specialists, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("leadscope=info,warn"),
            1 => EnvFilter::new("leadscope=debug,info"),
            2 => EnvFilter::new("leadscope=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl plan
fn handle_dry_run(config: &Config, specialists: &[Specialist]) {
    println!("=== Leadscope Dry Run ===\n");

    println!("Crawl Configuration:");
    println!("  Driver mode: {:?}", config.crawl.mode);
    println!("  Page cap: {}", config.crawl.page_cap);
    println!(
        "  Continue on specialist failure: {}",
        config.crawl.continue_on_specialist_failure
    );

    println!("\nTimeouts:");
    println!("  Navigation: {}s", config.timeouts.navigation_secs);
    println!("  OTP wait: {}s", config.timeouts.otp_wait_secs);
    println!("  Push wait: {}s", config.timeouts.push_wait_secs);
    println!("  Watchdog: {}s", config.timeouts.watchdog_secs);

    println!("\nOutput directory: {}", config.output.dir);

    println!("\nSpecialists ({}):", specialists.len());
    for specialist in specialists {
        println!(
            "  - {} ({}) -> {}",
            specialist.name, specialist.region, specialist.listing_url
        );
    }

    println!("\n✓ Configuration is valid");
}

/// Handles one crawl run
async fn handle_crawl(
    config: &Config,
    specialists: &[Specialist],
    cli: &Cli,
) -> anyhow::Result<()> {
    let options = RunOptions {
        otp: cli.otp.clone(),
        full: cli.full,
    };

    let started = Instant::now();
    match run_crawl(config, specialists, &options).await {
        Ok(report) => {
            tracing::info!(
                crawled = report.specialists_crawled,
                failed = report.specialists_failed.len(),
                distinct = report.distinct_leads,
                elapsed = %format_duration(started.elapsed()),
                "Crawl completed"
            );
            tracing::info!("Summary CSV: {}", report.summary_csv.display());
            if let Some(path) = &report.detail_csv {
                tracing::info!("Detail CSV: {}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                elapsed = %format_duration(started.elapsed()),
                "Crawl failed: {}",
                e
            );
            Err(e.into())
        }
    }
}

/// Handles --every: a long-running scheduler that enqueues crawl jobs
///
/// Each job is this same binary run as a child process, so a wedged crawl is
/// killed by the watchdog without taking the scheduler down.
async fn handle_schedule(cli: &Cli, config: &Config, minutes: u64) -> anyhow::Result<()> {
    let program = std::env::current_exe()?;

    let mut base_args = vec![cli.config.display().to_string()];
    base_args.push("--specialists".to_string());
    base_args.push(cli.specialists.display().to_string());
    if cli.full {
        base_args.push("--full".to_string());
    }

    let scheduler = JobScheduler::new(SchedulerConfig {
        program: program.display().to_string(),
        base_args,
        watchdog: config.timeouts.watchdog(),
    });

    tracing::info!(every_minutes = minutes, "Scheduler started");

    let mut run = 0u64;
    loop {
        run += 1;
        let position = scheduler.enqueue(JobRequest {
            name: format!("crawl-{}", run),
            args: vec![],
        });
        if position > 0 {
            tracing::warn!(position, "Previous crawl still running, job queued");
        }
        tokio::time::sleep(Duration::from_secs(minutes * 60)).await;
    }
}

/// Formats a duration as HH:MM:SS.mmm
fn format_duration(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let ms = total_ms % 1000;
    let seconds = (total_ms / 1000) % 60;
    let minutes = (total_ms / 60_000) % 60;
    let hours = total_ms / 3_600_000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(0)), "00:00:00.000");
        assert_eq!(format_duration(Duration::from_millis(1234)), "00:00:01.234");
        assert_eq!(
            format_duration(Duration::from_secs(3600 + 2 * 60 + 3)),
            "01:02:03.000"
        );
    }
}
