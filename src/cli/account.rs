use super::config::AgoraConfig;
use super::neuron::print_neuron;
use super::{print_json, state};
use agora::governance::Principal;
use serde::Serialize;

/// Show the caller's subaccount and neurons
pub async fn execute(
    config: &AgoraConfig,
    caller: String,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = state::open(config)?;
    let (owner, account) = service.my_account(&Principal::new(caller))?;
    // Reading an account advances elapsed dissolving neurons.
    state::persist(&service, &config.state.path)?;

    if json {
        return print_json(&(owner, account));
    }

    println!("Principal:  {}", owner);
    println!("Subaccount: {}", account.subaccount);
    if account.neurons.is_empty() {
        println!("No neurons.");
    }
    for (id, neuron) in &account.neurons {
        print_neuron(*id, neuron);
    }
    Ok(())
}

#[derive(Serialize)]
struct PowerReport<'a> {
    principal: &'a Principal,
    token_balance: u64,
    voting_power: u64,
}

/// Show a principal's token balance and current voting power
pub async fn execute_power(
    config: &AgoraConfig,
    principal: String,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = state::open(config)?;
    let principal = Principal::new(principal);

    let token_balance = service.get_token_balance(&principal).await?;
    let voting_power = service.get_voting_power(&principal).await?;

    if json {
        return print_json(&PowerReport {
            principal: &principal,
            token_balance,
            voting_power,
        });
    }

    println!("Principal:     {}", principal);
    println!("Token balance: {}", token_balance);
    println!("Voting power:  {}", voting_power);
    Ok(())
}
