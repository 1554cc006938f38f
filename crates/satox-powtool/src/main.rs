//! satox-powtool: compute and verify KawPoW hashes from the command line.
//!
//! Usage:
//!   satox-powtool hash <header_hex> <nonce> [height]
//!   satox-powtool verify <header_hex> <nonce> <mix_hex> <difficulty> [height]
//!   satox-powtool validate <block.json>
//!   satox-powtool vectors
//!
//! Results are printed to stdout as JSON; logs go to stderr. Configuration
//! is read from `$SATOX_CONFIG` or `./satox.toml`.

mod commands;
mod config;
mod vectors;

use satox_pow::EpochStore;
use tracing::info;

use crate::config::ToolConfig;

const USAGE: &str = "usage: satox-powtool <hash|verify|validate|vectors> [args...]";

fn main() -> anyhow::Result<()> {
    let config = ToolConfig::load()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("satox={}", config.log.level).parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        anyhow::bail!(USAGE);
    };

    if command == "vectors" {
        let vectors = vectors::generate_all_vectors()?;
        println!("{}", serde_json::to_string_pretty(&vectors)?);
        return Ok(());
    }

    let store = EpochStore::new(config.pow.params(), config.pow.retain_epochs)?;
    info!(network = ?config.pow.network, command = %command, "satox-powtool starting");

    let result = match command.as_str() {
        "hash" => commands::hash(&store, rest),
        "verify" => commands::verify(&store, rest),
        "validate" => commands::validate(&store, &config.validation, rest),
        other => Err(anyhow::anyhow!("unknown command {other:?}; {USAGE}")),
    };
    store.shutdown();

    let output = result?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    if output["valid"] == false {
        std::process::exit(1);
    }
    Ok(())
}
