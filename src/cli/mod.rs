use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub mod account;
pub mod config;
pub mod init;
pub mod neuron;
pub mod proposals;
pub mod propose;
pub mod state;
pub mod status;
pub mod version;
pub mod vote;

use config::{default_config_path, AgoraConfig};
use neuron::NeuronCommand;
use propose::ProposeArgs;
use vote::VoteChoice;

#[derive(Parser)]
#[command(name = "agora")]
#[command(author = "Agora Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator CLI for the Agora governance engine", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.config/agora/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Path to the engine state file (default: ~/.local/share/agora/state.cbor)
        #[arg(long)]
        state_path: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show governance parameters and a proposal summary
    Status,

    /// List proposals
    Proposals {
        /// Show only this proposal
        #[arg(long)]
        id: Option<u64>,
    },

    /// List ballots on a proposal or by a principal
    Votes {
        #[arg(long, conflicts_with = "principal")]
        proposal: Option<u64>,

        #[arg(long)]
        principal: Option<String>,
    },

    /// Submit a proposal
    Propose(ProposeArgs),

    /// Vote on a proposal
    Vote {
        #[arg(long)]
        caller: String,

        #[arg(long)]
        id: u64,

        #[arg(value_enum)]
        choice: VoteChoice,
    },

    /// Execute a passed proposal
    Execute {
        #[arg(long)]
        id: u64,
    },

    /// Settle proposals whose voting window has elapsed
    Sweep,

    /// Show a principal's token balance and voting power
    Power {
        #[arg(long)]
        principal: String,
    },

    /// Manage neurons
    Neuron {
        #[command(subcommand)]
        action: NeuronCommand,
    },

    /// Show the caller's subaccount and neurons
    Account {
        #[arg(long)]
        caller: String,
    },

    /// Display version information
    Version,
}

impl Cli {
    /// Config path from `--config`, or the default location.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_config_path)
    }
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise the `[logging] level` of the config file is
/// used when it can be read. Logs go to stderr so `--json` output stays
/// parseable.
pub fn init_logging(config_path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = AgoraConfig::load(config_path)
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "warn".to_string());
        EnvFilter::new(level)
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = cli.config_path();
    let json = cli.json;

    match cli.command {
        Commands::Init { state_path, force } => {
            init::execute(&config_path, state_path, force).await
        }
        Commands::Version => {
            version::execute();
            Ok(())
        }
        command => {
            let config = load_config(&config_path)?;
            match command {
                Commands::Status => status::execute(&config, json).await,
                Commands::Proposals { id } => proposals::execute(&config, id, json).await,
                Commands::Votes {
                    proposal,
                    principal,
                } => proposals::execute_votes(&config, proposal, principal, json).await,
                Commands::Propose(args) => propose::execute(&config, args, json).await,
                Commands::Vote { caller, id, choice } => {
                    vote::execute(&config, caller, id, choice, json).await
                }
                Commands::Execute { id } => vote::execute_proposal(&config, id, json).await,
                Commands::Sweep => vote::execute_sweep(&config, json).await,
                Commands::Power { principal } => {
                    account::execute_power(&config, principal, json).await
                }
                Commands::Neuron { action } => neuron::execute(&config, action, json).await,
                Commands::Account { caller } => account::execute(&config, caller, json).await,
                Commands::Init { .. } | Commands::Version => Ok(()),
            }
        }
    }
}

fn load_config(path: &Path) -> Result<AgoraConfig, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!(
            "No config file at '{}'. Run `agora init` first.",
            path.display()
        )
        .into());
    }
    AgoraConfig::load(path)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
