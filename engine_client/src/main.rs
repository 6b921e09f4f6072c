//! Standalone client binary.
//!
//! Usage:
//!   cargo run -p engine_client -- [--config client.json] [--data-dir data] [--cell <hex key>]...
//!
//! Loads the configured world cells through the resource cache and prints a
//! load report. `--cell` may be given multiple times and appends to the
//! config's key list.

use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::Context;
use engine_assets::cache::ResourceCache;
use engine_assets::key::ResourceKey;
use engine_client::{CellLoader, ClientConfig, DirProvider};
use tracing::info;

fn parse_args() -> anyhow::Result<ClientConfig> {
    let mut cfg = ClientConfig::default();
    let mut extra_cells = Vec::new();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                let text = fs::read_to_string(&args[i + 1])
                    .with_context(|| format!("read config {}", args[i + 1]))?;
                cfg = ClientConfig::from_json_str(&text).context("parse config")?;
                i += 2;
            }
            "--data-dir" if i + 1 < args.len() => {
                cfg.data_dir = args[i + 1].clone();
                i += 2;
            }
            "--cell" if i + 1 < args.len() => {
                let raw = u32::from_str_radix(args[i + 1].trim_start_matches("0x"), 16)
                    .with_context(|| format!("parse cell key {}", args[i + 1]))?;
                extra_cells.push(raw);
                i += 2;
            }
            _ => i += 1,
        }
    }
    cfg.cell_keys.extend(extra_cells);
    Ok(cfg)
}

fn main() -> anyhow::Result<()> {
    let cfg = parse_args()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.log_filter)),
        )
        .init();

    info!(data_dir = %cfg.data_dir, cells = cfg.cell_keys.len(), "starting client");

    let provider = Arc::new(DirProvider::new(cfg.data_dir.as_str()));
    let cache = Arc::new(ResourceCache::new(provider));
    let mut loader = CellLoader::new(cache);

    let keys: Vec<ResourceKey> = cfg
        .cell_keys
        .iter()
        .map(|&raw| ResourceKey::from_raw(raw))
        .collect();
    let report = loader.load_cells(&keys);

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize report")?
    );

    if !report.all_loaded() {
        std::process::exit(1);
    }
    Ok(())
}
