//! Fraud Monitor Binary
//!
//! Scores transactions against the configured rules and prints one JSON line
//! per scored transaction.
//!
//! ```text
//! fraud-monitor                     # simulate `simulator.count` random transactions
//! fraud-monitor simulate
//! fraud-monitor score payments.jsonl
//! ```

use anyhow::{bail, Context, Result};
use fraud_monitor::models::TransactionRequest;
use fraud_monitor::{Config, FlagPolicy, RuleBook, TransactionGenerator, TransactionMonitor};
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(config.logging.json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!config.logging.json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    info!("Starting Fraud Monitor");
    info!(
        "Flag threshold: {}, high severity threshold: {}",
        config.policy.flag_threshold, config.policy.high_severity_threshold
    );

    let drafts = match &config.rules.path {
        Some(path) => {
            info!("Loading rules from: {:?}", path);
            RuleBook::load_drafts(path).with_context(|| format!("Failed to read rules from {:?}", path))?
        }
        None => {
            info!("No rules file configured, using seed rules");
            RuleBook::default_drafts()
        }
    };
    let rules = Arc::new(RuleBook::from_drafts(drafts)?);
    info!("{} rules loaded ({} enabled)", rules.len(), rules.enabled().len());

    let monitor = TransactionMonitor::from_config(
        rules,
        FlagPolicy::from_config(&config.policy),
        &config.policy,
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let requests: Box<dyn Iterator<Item = Result<TransactionRequest>>> =
        match args.first().map(String::as_str) {
            None | Some("simulate") => {
                info!("Simulating {} transactions", config.simulator.count);
                Box::new(
                    TransactionGenerator::new(config.simulator.seed)
                        .take(config.simulator.count)
                        .map(Ok::<_, anyhow::Error>),
                )
            }
            Some("score") => {
                let Some(path) = args.get(1) else {
                    bail!("usage: fraud-monitor score <transactions.jsonl>");
                };
                info!("Scoring transactions from: {}", path);
                let file = std::fs::File::open(path).with_context(|| format!("Failed to open {}", path))?;
                Box::new(read_requests(BufReader::new(file)))
            }
            Some(other) => bail!("unknown command '{}', expected 'simulate' or 'score'", other),
        };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for request in requests {
        let request = request?;
        match monitor.submit(request) {
            Ok(scored) => writeln!(out, "{}", serde_json::to_string(&scored)?)?,
            Err(e) => error!("Transaction rejected: {}", e),
        }
    }
    out.flush()?;

    let summary = monitor.summary();
    info!(
        "Processed {} transactions, {} flagged, alerts: {:?}",
        summary.transactions, summary.flagged, summary.alerts_by_severity
    );
    for (account, count) in monitor.top_accounts(5) {
        info!("Top alerted account {}: {} alerts", account, count);
    }

    Ok(())
}

fn read_requests<R: BufRead>(reader: R) -> impl Iterator<Item = Result<TransactionRequest>> {
    reader
        .lines()
        .enumerate()
        .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
        .map(|(index, line)| {
            let line = line?;
            serde_json::from_str(&line).with_context(|| format!("Invalid transaction on line {}", index + 1))
        })
}
