//! ppf: operator and relayer tool for the pair price feed.
//!
//! `sign` prints the 65-byte signature as hex; `--legacy` encodes the
//! recovery indicator as 0/1 instead of 27/28. `replay` applies recorded
//! calls to a fresh in-memory feed and prints the report as JSON.

mod config;
mod replay;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ppf_feed::signer::sign_update;
use ppf_feed::PriceFeed;
use ppf_types::rate::encode_rate;
use ppf_types::{Address, UpdateMessage};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;
use crate::replay::{replay, Submission};

#[derive(Parser, Debug)]
#[command(name = "ppf", version, about = "Pair price feed operator tool")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "PPF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the address of the configured operator key
    Address,
    /// Sign one update with the operator key
    Sign {
        /// Encode the recovery indicator as 0/1
        #[arg(long)]
        legacy: bool,
        base: Address,
        quote: Address,
        /// Decimal rate, e.g. `2` or `0.000123`
        #[arg(value_parser = encode_rate)]
        rate: u128,
        when: u64,
    },
    /// Replay a JSON array of recorded calls against a fresh feed
    Replay { file: PathBuf },
}

/// Log filter from `RUST_LOG` when set, else `ppf=<log_level>`.
fn env_filter(rust_log: Option<&str>, log_level: &str) -> anyhow::Result<EnvFilter> {
    let directives = match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives.to_string(),
        _ => format!("ppf={log_level}"),
    };
    EnvFilter::try_new(&directives).with_context(|| format!("log filter {directives:?}"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    // Logs go to stderr so stdout stays machine-readable.
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(rust_log.as_deref(), &config.logging.log_level)?)
        .init();

    match cli.command {
        Command::Address => {
            let key = config.operator_key()?;
            println!("{}", key.address());
        }
        Command::Sign {
            legacy,
            base,
            quote,
            rate,
            when,
        } => cmd_sign(&config, UpdateMessage::new(base, quote, rate, when), legacy)?,
        Command::Replay { file } => cmd_replay(&config, &file)?,
    }
    Ok(())
}

fn cmd_sign(config: &CliConfig, msg: UpdateMessage, legacy: bool) -> anyhow::Result<()> {
    let key = config.operator_key()?;
    let mut signature = sign_update(&key, &msg)?;
    if legacy {
        signature = signature.to_legacy()?;
    }

    info!(
        signer = %key.address(),
        pair = %msg.pair(),
        rate = msg.rate,
        when = msg.when,
        "signed update"
    );
    println!("{}", signature.to_hex());
    Ok(())
}

fn cmd_replay(config: &CliConfig, path: &std::path::Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let submissions: Vec<Submission> = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;

    let (operator, owner) = config.roles()?;
    let mut feed = PriceFeed::new(operator, owner)?;
    info!(%operator, %owner, calls = submissions.len(), "replaying");

    let report = replay(&mut feed, &submissions);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
