//! Proposal payload execution.
//!
//! Applies the payload of a passed proposal. Each payload variant has its own
//! handler; a handler either applies its change in full or returns an error
//! and leaves state untouched.

use super::config_store::ConfigStore;
use super::error::GovernanceResult;
use super::types::{ConfigPayload, ProposalPayload};
use tracing::info;

/// Mutable state a payload may touch.
pub struct ExecutionContext<'a> {
    pub config: &'a mut ConfigStore,
    pub webpage: &'a mut String,
}

/// Execute an approved payload.
pub fn execute_payload(
    ctx: &mut ExecutionContext<'_>,
    payload: &ProposalPayload,
) -> GovernanceResult<()> {
    match payload {
        ProposalPayload::UpdateWebpage { message } => execute_webpage_update(ctx, message),
        ProposalPayload::UpdateConfig(update) => execute_config_update(ctx, update),
    }
}

/// Publish a new webpage message for the external renderer.
fn execute_webpage_update(ctx: &mut ExecutionContext<'_>, message: &str) -> GovernanceResult<()> {
    *ctx.webpage = message.to_string();
    info!(bytes = message.len(), "webpage updated");
    Ok(())
}

/// Merge a config payload into the config store.
fn execute_config_update(
    ctx: &mut ExecutionContext<'_>,
    update: &ConfigPayload,
) -> GovernanceResult<()> {
    let config = ctx.config.apply(update)?;
    info!(
        fields = ?update.changed_fields(),
        threshold_pass = config.threshold_pass,
        threshold_fail = config.threshold_fail,
        quadratic_voting = config.quadratic_voting,
        neuron_voting = config.neuron_voting,
        "config updated"
    );
    Ok(())
}
