//! Agora operator configuration file handling
//!
//! Provides default configuration generation and loading for the `agora`
//! binary. Configuration files are TOML.
//!
//! ## Genesis vs Live Configuration
//!
//! The `[genesis]` section only seeds a NEW state file. Once the engine state
//! exists, governance parameters change exclusively through `update_config`
//! proposals; editing `[genesis]` afterwards has no effect.

use agora::governance::{Config, EngineOptions, NeuronParams, Principal, StatusSchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default voting window
const DEFAULT_PROPOSAL_LENGTH: &str = "7days";

/// Default dissolve delay cap (8 x 365 days)
const DEFAULT_MAX_DISSOLVE_DELAY: &str = "2920days";

/// Agora operator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgoraConfig {
    /// Governance parameters used when the state file is first created
    #[serde(default)]
    pub genesis: GenesisConfig,

    /// Engine construction options
    #[serde(default)]
    pub engine: EngineConfig,

    /// Engine state location
    pub state: StateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Token balances served by the in-process ledger
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Genesis governance parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// Yes share needed to pass, in basis points
    pub threshold_pass: u64,

    /// No share needed to fail, in basis points
    pub threshold_fail: u64,

    /// Total weight before thresholds are checked
    pub quorum: u64,

    /// Voting window, e.g. "7days" or "36h"
    pub proposal_length: String,

    pub min_to_propose: u64,
    pub min_to_vote: u64,
    pub quadratic_voting: bool,
    pub neuron_voting: bool,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        let config = Config::default();
        Self {
            threshold_pass: config.threshold_pass,
            threshold_fail: config.threshold_fail,
            quorum: config.quorum,
            proposal_length: DEFAULT_PROPOSAL_LENGTH.to_string(),
            min_to_propose: config.min_to_propose,
            min_to_vote: config.min_to_vote,
            quadratic_voting: config.quadratic_voting,
            neuron_voting: config.neuron_voting,
        }
    }
}

/// Engine construction options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Status schema: "staged" or "collapsed"
    pub schema: StatusSchema,

    /// Execute proposals as soon as they pass
    pub auto_execute: bool,

    /// Smallest stake a new neuron may lock (optional)
    pub min_neuron_stake: Option<u64>,

    /// Dissolve delay at which neuron bonus saturates, e.g. "2920days"
    pub max_dissolve_delay: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema: StatusSchema::default(),
            auto_execute: true,
            min_neuron_stake: None,
            max_dissolve_delay: DEFAULT_MAX_DISSOLVE_DELAY.to_string(),
        }
    }
}

/// Engine state location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Path to the CBOR engine snapshot
    pub path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// In-process token ledger seed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// principal text -> token balance
    #[serde(default)]
    pub balances: BTreeMap<String, u64>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AgoraConfig {
    /// Create a new configuration with the given state path
    pub fn new(state_path: PathBuf) -> Self {
        Self {
            genesis: GenesisConfig::default(),
            engine: EngineConfig::default(),
            state: StateConfig { path: state_path },
            logging: LoggingConfig::default(),
            ledger: LedgerConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: AgoraConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Genesis governance config, with the voting window parsed.
    pub fn genesis_config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let g = &self.genesis;
        Ok(Config {
            threshold_pass: g.threshold_pass,
            threshold_fail: g.threshold_fail,
            quorum: g.quorum,
            proposal_length: parse_secs("genesis.proposal_length", &g.proposal_length)?,
            min_to_propose: g.min_to_propose,
            min_to_vote: g.min_to_vote,
            quadratic_voting: g.quadratic_voting,
            neuron_voting: g.neuron_voting,
        })
    }

    /// Engine options, with the dissolve delay cap parsed.
    pub fn engine_options(&self) -> Result<EngineOptions, Box<dyn std::error::Error>> {
        let max_dissolve_delay =
            parse_secs("engine.max_dissolve_delay", &self.engine.max_dissolve_delay)?;
        if max_dissolve_delay == 0 {
            return Err("engine.max_dissolve_delay must be greater than zero".into());
        }

        Ok(EngineOptions {
            schema: self.engine.schema,
            auto_execute: self.engine.auto_execute,
            neurons: NeuronParams {
                min_neuron_stake: self.engine.min_neuron_stake,
                max_dissolve_delay,
            },
        })
    }

    /// Ledger seed as typed principals.
    pub fn balances(&self) -> impl Iterator<Item = (Principal, u64)> + '_ {
        self.ledger
            .balances
            .iter()
            .map(|(owner, amount)| (Principal::new(owner.as_str()), *amount))
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(state_path: &Path) -> String {
        format!(
            r#"# Agora Configuration
#
# [genesis] seeds a NEW state file only. After the first run, governance
# parameters change exclusively through update_config proposals.

[genesis]
# Shares are in basis points (10000 = 100%)
threshold_pass = 5000
threshold_fail = 5000

# Total vote weight required before thresholds are evaluated
quorum = 100

# Voting window (humantime format: "7days", "36h", "90min")
proposal_length = "{proposal_length}"

min_to_propose = 1
min_to_vote = 1
quadratic_voting = false
neuron_voting = false

[engine]
# "staged": passed and expired are distinct states
# "collapsed": passed proposals execute at once, unvoted proposals fail
schema = "staged"
auto_execute = true

# Dissolve delay at which the neuron bonus saturates
max_dissolve_delay = "{max_dissolve_delay}"

# Smallest stake a new neuron may lock (optional)
# min_neuron_stake = 10

[state]
# CBOR snapshot of the governance engine
path = "{state_path}"

[logging]
# Log level: trace, debug, info, warn, error (RUST_LOG overrides)
level = "info"

[ledger.balances]
# Token balances served to the engine, keyed by principal
# "aaaaa-aa" = 100
"#,
            proposal_length = DEFAULT_PROPOSAL_LENGTH,
            max_dissolve_delay = DEFAULT_MAX_DISSOLVE_DELAY,
            state_path = state_path.display()
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        state_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(state_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64, Box<dyn std::error::Error>> {
    let duration: Duration = humantime::parse_duration(value)
        .map_err(|e| format!("Invalid duration for {} ('{}'): {}", field, value, e))?;
    Ok(duration.as_secs())
}

/// Get the default config file path
///
/// - Config: ~/.config/agora/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agora")
        .join("config.toml")
}

/// Get the default state file path
///
/// - State: ~/.local/share/agora/state.cbor
pub fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agora")
        .join("state.cbor")
}
