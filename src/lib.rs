//! Agora - Token-Weighted DAO Governance Engine
//!
//! Proposals, ballots and neuron-based voting power for a single
//! decentralized organization.
//!
//! Key principles:
//! - Governance parameters change only through executed proposals
//! - One immutable ballot per principal per proposal
//! - Clock-driven lazy expiry (every operation takes `now`)
//! - Single writer: all mutations serialize behind one lock

pub mod governance;
pub mod ledger;
pub mod serialization;
pub mod service;
