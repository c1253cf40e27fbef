//! Config store.
//!
//! Holds the singleton governance config. `apply` is the only writer and is
//! reached exclusively through execution of a passed `update_config`
//! proposal.

use super::error::{GovernanceError, GovernanceResult};
use super::types::{Config, ConfigPayload, BPS_DENOMINATOR};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigStore {
    config: Config,
}

impl ConfigStore {
    /// Create a store seeded with the genesis config.
    ///
    /// The genesis config goes through the same validation as updates.
    pub fn new(config: Config) -> GovernanceResult<Self> {
        validate(&config)?;
        Ok(Self { config })
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    /// Merge the present fields of `payload` into the current config.
    ///
    /// The merged config is validated before it replaces the current one, so
    /// on error the store is left exactly as it was.
    pub(crate) fn apply(&mut self, payload: &ConfigPayload) -> GovernanceResult<Config> {
        let merged = merge(&self.config, payload);
        validate(&merged)?;
        self.config = merged.clone();
        Ok(merged)
    }
}

/// Merge with "absent = unchanged" semantics.
pub fn merge(current: &Config, payload: &ConfigPayload) -> Config {
    Config {
        threshold_pass: payload.threshold_pass.unwrap_or(current.threshold_pass),
        threshold_fail: payload.threshold_fail.unwrap_or(current.threshold_fail),
        quorum: payload.quorum.unwrap_or(current.quorum),
        proposal_length: payload.proposal_length.unwrap_or(current.proposal_length),
        min_to_propose: payload.min_to_propose.unwrap_or(current.min_to_propose),
        min_to_vote: payload.min_to_vote.unwrap_or(current.min_to_vote),
        quadratic_voting: payload.quadratic_voting.unwrap_or(current.quadratic_voting),
        neuron_voting: payload.neuron_voting.unwrap_or(current.neuron_voting),
    }
}

/// Check the cross-field invariants the type system cannot express.
pub fn validate(config: &Config) -> GovernanceResult<()> {
    if config.threshold_pass == 0 || config.threshold_fail == 0 {
        return Err(GovernanceError::ConfigValidationFailed(
            "thresholds must be greater than zero".to_string(),
        ));
    }

    let sum = config.threshold_pass.saturating_add(config.threshold_fail);
    if sum > BPS_DENOMINATOR {
        return Err(GovernanceError::ConfigValidationFailed(format!(
            "threshold_pass + threshold_fail = {} bps exceeds {} bps",
            sum, BPS_DENOMINATOR
        )));
    }

    if config.proposal_length == 0 {
        return Err(GovernanceError::ConfigValidationFailed(
            "proposal_length must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut store = ConfigStore::default();
        let before = store.get_config().clone();

        let payload = ConfigPayload {
            min_to_vote: Some(42),
            quadratic_voting: Some(true),
            ..Default::default()
        };
        let after = store.apply(&payload).unwrap();

        assert_eq!(after.min_to_vote, 42);
        assert!(after.quadratic_voting);
        assert_eq!(after.threshold_pass, before.threshold_pass);
        assert_eq!(after.proposal_length, before.proposal_length);
        assert_eq!(store.get_config(), &after);
    }

    #[test]
    fn test_apply_rejects_threshold_sum_over_one() {
        let mut store = ConfigStore::default();
        let before = store.get_config().clone();

        let payload = ConfigPayload {
            threshold_pass: Some(7_000),
            ..Default::default()
        };
        let result = store.apply(&payload);

        assert!(matches!(
            result,
            Err(GovernanceError::ConfigValidationFailed(_))
        ));
        assert_eq!(store.get_config(), &before);
    }

    #[test]
    fn test_apply_rejects_zero_length() {
        let mut store = ConfigStore::default();
        let payload = ConfigPayload {
            proposal_length: Some(0),
            ..Default::default()
        };
        assert!(store.apply(&payload).is_err());
        assert_eq!(store.get_config().proposal_length, Config::default().proposal_length);
    }

    #[test]
    fn test_new_validates_genesis() {
        let config = Config {
            threshold_fail: 0,
            ..Default::default()
        };
        assert!(ConfigStore::new(config).is_err());
        assert!(ConfigStore::new(Config::default()).is_ok());
    }

    #[test]
    fn test_threshold_sum_exactly_one_is_valid() {
        let config = Config {
            threshold_pass: 4_000,
            threshold_fail: 6_000,
            ..Default::default()
        };
        assert!(validate(&config).is_ok());
    }
}
