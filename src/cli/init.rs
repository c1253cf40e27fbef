use super::config::{default_state_path, AgoraConfig};
use std::path::{Path, PathBuf};

/// Write a commented default configuration file
///
/// Refuses to overwrite an existing file unless `force` is set. The state
/// file itself is created lazily by the first command that needs it.
pub async fn execute(
    config_path: &Path,
    state_path: Option<String>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if config_path.exists() && !force {
        return Err(format!(
            "Config file already exists at '{}' (use --force to overwrite)",
            config_path.display()
        )
        .into());
    }

    let state_path = state_path
        .map(PathBuf::from)
        .unwrap_or_else(default_state_path);

    AgoraConfig::create_default(config_path, &state_path)?;

    println!("Created config: {}", config_path.display());
    println!("State file:     {}", state_path.display());
    println!();
    println!("Edit [genesis] and [ledger.balances] before the first proposal.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let state = temp_dir.path().join("state.cbor").display().to_string();

        execute(&config_path, Some(state.clone()), false)
            .await
            .unwrap();
        assert!(execute(&config_path, Some(state.clone()), false)
            .await
            .is_err());
        assert!(execute(&config_path, Some(state), true).await.is_ok());
    }
}
