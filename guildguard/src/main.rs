#![forbid(unsafe_code)]

use clap::Parser;
use guildguard_lib::config::{load_from_path, Config, LoggingConfig};
use guildguard_lib::telemetry::{init_metrics, init_tracing, start_observability_server};
use guildguard_lib::{parse_event, spawn_sweeper, DosProtection};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rate limiting and spam detection for Discord bot events")]
struct Cli {
    /// Path to configuration TOML file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/guildguard.toml"
    )]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match load_from_path(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            // Tracing is configured from the file we failed to read; fall back to defaults.
            let _ = init_tracing(&LoggingConfig::default(), "warn");
            error!(%err, path = %cli.config.display(), "failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing(&cfg.logging, &cfg.telemetry.otel_log_level) {
        eprintln!("failed to initialize tracing: {err}");
        std::process::exit(1);
    }

    info!(
        config = %cli.config.display(),
        sweep_interval_secs = cfg.maintenance.sweep_interval_secs,
        max_age_hours = cfg.maintenance.max_age_hours,
        "configuration loaded"
    );

    if let Err(err) = run(cfg).await {
        error!(%err, "guildguard exited with error");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cancel = CancellationToken::new();
    let mut protection = DosProtection::new(&cfg);

    let registry = match cfg.telemetry.metrics_port {
        Some(_) => {
            let (metrics, registry) = init_metrics()?;
            protection = protection.with_metrics(metrics);
            Some(registry)
        }
        None => None,
    };
    let protection = Arc::new(protection);

    let observability = match (cfg.telemetry.metrics_port, registry) {
        (Some(port), Some(registry)) => {
            let protection = protection.clone();
            let cancel = cancel.clone();
            Some(tokio::spawn(async move {
                if let Err(e) =
                    start_observability_server(port, registry, protection, cancel).await
                {
                    error!(error = %e, port, "Observability server failed");
                }
            }))
        }
        _ => None,
    };

    let sweeper = spawn_sweeper(
        protection.clone(),
        cfg.maintenance.sweep_interval(),
        cfg.maintenance.max_age(),
        cancel.clone(),
    );

    tokio::select! {
        result = process_events(&protection) => {
            if let Err(e) = result {
                warn!(error = %e, "event stream failed");
            }
            info!("event stream closed, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
        }
    }

    cancel.cancel();
    if let Err(e) = sweeper.await {
        warn!(error = %e, "sweeper task did not stop cleanly");
    }
    if let Some(handle) = observability {
        if let Err(e) = handle.await {
            warn!(error = %e, "observability task did not stop cleanly");
        }
    }

    let spam = protection.spam_stats();
    info!(
        tracked = ?protection.stats(),
        spam_detected_actors = spam.spam_detected_actors,
        total_spam_messages = spam.total_spam_messages,
        "guildguard stopped"
    );
    Ok(())
}

/// Read one event per stdin line and answer each with a verdict line on stdout.
async fn process_events(protection: &DosProtection) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = match parse_event(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "skipping malformed event");
                continue;
            }
        };

        let verdict = protection.evaluate(&event);
        debug!(actor = %verdict.actor, category = %verdict.category, allowed = verdict.allowed, "verdict");

        let mut out = serde_json::to_vec(&verdict).map_err(std::io::Error::other)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    Ok(())
}
