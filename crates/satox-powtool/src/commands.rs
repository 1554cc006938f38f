//! Command handlers.
//!
//! Each handler returns the JSON document printed on stdout.

use anyhow::{bail, Context};
use serde_json::{json, Value};
use satox_chain::{unix_now, Block, TransactionRecord, ValidationConfig};
use satox_pow::{difficulty_to_target, EpochStore};

fn parse_hex(field: &str, s: &str) -> anyhow::Result<Vec<u8>> {
    hex::decode(s).with_context(|| format!("{field} is not valid hex"))
}

fn parse_u64(field: &str, s: &str) -> anyhow::Result<u64> {
    s.parse().with_context(|| format!("{field} is not an unsigned integer"))
}

fn parse_height(arg: Option<&String>) -> anyhow::Result<u64> {
    arg.map_or(Ok(0), |s| parse_u64("height", s))
}

/// `hash <header_hex> <nonce> [height]`
pub fn hash(store: &EpochStore, args: &[String]) -> anyhow::Result<Value> {
    let [header, nonce, rest @ ..] = args else {
        bail!("usage: hash <header_hex> <nonce> [height]");
    };
    let header = parse_hex("header", header)?;
    let nonce = parse_u64("nonce", nonce)?;
    let height = parse_height(rest.first())?;

    let output = store.compute_hash(&header, nonce, height)?;
    Ok(json!({
        "epoch": store.params().epoch(height),
        "height": height,
        "nonce": nonce,
        "hash": output.hash_hex(),
        "mix_hash": output.mix_hash_hex(),
    }))
}

/// `verify <header_hex> <nonce> <mix_hex> <difficulty> [height]`
pub fn verify(store: &EpochStore, args: &[String]) -> anyhow::Result<Value> {
    let [header, nonce, mix_hash, difficulty, rest @ ..] = args else {
        bail!("usage: verify <header_hex> <nonce> <mix_hex> <difficulty> [height]");
    };
    let header = parse_hex("header", header)?;
    let nonce = parse_u64("nonce", nonce)?;
    let mix_hash = parse_hex("mix_hash", mix_hash)?;
    let difficulty: u32 = difficulty
        .parse()
        .context("difficulty is not an unsigned integer")?;
    let height = parse_height(rest.first())?;

    let target = difficulty_to_target(difficulty);
    let valid = store.verify_hash(&header, nonce, height, &mix_hash, &target);
    Ok(json!({
        "valid": valid,
        "target": hex::encode(target),
    }))
}

/// `validate <block.json>`
pub fn validate(store: &EpochStore, config: &ValidationConfig, args: &[String]) -> anyhow::Result<Value> {
    let [path, ..] = args else {
        bail!("usage: validate <block.json>");
    };
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    validate_json(store, config, &content, unix_now())
}

/// Validate one block document at `now`.
pub fn validate_json(
    store: &EpochStore,
    config: &ValidationConfig,
    content: &str,
    now: i64,
) -> anyhow::Result<Value> {
    let block: Block<TransactionRecord> = Block::from_json_str(content)?;
    let verdict = block.check(store, config, now);
    Ok(json!({
        "height": block.height,
        "hash": block.hash,
        "valid": verdict.is_ok(),
        "reason": verdict.err().map(|r| r.to_string()),
    }))
}
