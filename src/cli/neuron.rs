use super::config::AgoraConfig;
use super::{print_json, state};
use agora::governance::{Neuron, NeuronId, Principal};
use clap::Subcommand;
use std::time::Duration;

#[derive(Subcommand, Debug)]
pub enum NeuronCommand {
    /// Lock tokens into a new neuron
    Create {
        #[arg(long)]
        caller: String,

        /// Tokens to lock
        #[arg(long)]
        balance: u64,

        /// Dissolve delay (humantime format, e.g. "180days")
        #[arg(long)]
        delay: String,
    },

    /// Start dissolving a neuron
    Dissolve {
        #[arg(long)]
        caller: String,

        #[arg(long)]
        id: NeuronId,
    },

    /// Re-lock a dissolving neuron with a new delay
    Relock {
        #[arg(long)]
        caller: String,

        #[arg(long)]
        id: NeuronId,

        /// New dissolve delay (humantime format)
        #[arg(long)]
        delay: String,
    },
}

pub async fn execute(
    config: &AgoraConfig,
    command: NeuronCommand,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = state::open(config)?;

    let result = match command {
        NeuronCommand::Create {
            caller,
            balance,
            delay,
        } => {
            let delay = parse_delay(&delay)?;
            service
                .neuron_create(&Principal::new(caller), balance, delay)
                .await
        }
        NeuronCommand::Dissolve { caller, id } => {
            service.neuron_dissolve(&Principal::new(caller), id)
        }
        NeuronCommand::Relock { caller, id, delay } => {
            let delay = parse_delay(&delay)?;
            service.neuron_relock(&Principal::new(caller), id, delay)
        }
    };
    // Elapsed neurons are advanced even when the call itself is refused.
    state::persist(&service, &config.state.path)?;
    let (id, neuron) = result?;

    if json {
        return print_json(&(id, neuron));
    }

    print_neuron(id, &neuron);
    Ok(())
}

pub(super) fn print_neuron(id: NeuronId, neuron: &Neuron) {
    println!(
        "neuron {}: {} tokens, {} (delay {})",
        id,
        neuron.balance,
        neuron.status,
        humantime::format_duration(Duration::from_secs(neuron.dissolve_delay.delay))
    );
}

fn parse_delay(text: &str) -> Result<i64, Box<dyn std::error::Error>> {
    let secs = humantime::parse_duration(text)
        .map_err(|e| format!("Invalid delay '{}': {}", text, e))?
        .as_secs();
    Ok(i64::try_from(secs).map_err(|_| format!("Delay '{}' is too large", text))?)
}
