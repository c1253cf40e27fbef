//! Engine state file handling for the operator CLI.
//!
//! Each invocation restores the engine from its CBOR snapshot, runs one
//! service call and writes the snapshot back if anything may have changed.
//! A missing snapshot means a fresh engine seeded from `[genesis]`.

use super::config::AgoraConfig;
use agora::governance::ProposalEngine;
use agora::ledger::InMemoryTokenLedger;
use agora::service::{DaoService, SystemClock};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Service type driven by the CLI.
pub type CliService = DaoService<InMemoryTokenLedger, SystemClock>;

/// Restore (or create) the engine and wrap it in a service.
pub fn open(config: &AgoraConfig) -> Result<CliService, Box<dyn std::error::Error>> {
    let engine = load_engine(config)?;
    let ledger = InMemoryTokenLedger::with_balances(config.balances());
    Ok(DaoService::new(engine, ledger, SystemClock))
}

fn load_engine(config: &AgoraConfig) -> Result<ProposalEngine, Box<dyn std::error::Error>> {
    let path = &config.state.path;
    if path.exists() {
        let bytes = fs::read(path)
            .map_err(|e| format!("Failed to read state file '{}': {}", path.display(), e))?;
        let engine = ProposalEngine::from_bytes(&bytes)
            .map_err(|e| format!("Corrupt state file '{}': {}", path.display(), e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "state restored");
        return Ok(engine);
    }

    let engine = ProposalEngine::new(config.genesis_config()?, config.engine_options()?)
        .map_err(|e| format!("Invalid [genesis] section: {}", e))?;
    info!(path = %path.display(), "initialized new governance state");
    Ok(engine)
}

/// Write the service snapshot to the configured state path.
pub fn persist(service: &CliService, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = service.snapshot()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create state directory: {}", e))?;
    }

    // Write-then-rename so a crash never leaves a truncated snapshot.
    let tmp = path.with_extension("cbor.tmp");
    fs::write(&tmp, &bytes)
        .map_err(|e| format!("Failed to write state file '{}': {}", tmp.display(), e))?;
    fs::rename(&tmp, path)
        .map_err(|e| format!("Failed to replace state file '{}': {}", path.display(), e))?;

    debug!(path = %path.display(), bytes = bytes.len(), "state persisted");
    Ok(())
}
