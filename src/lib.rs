//! MONARCH — an autonomous stablecoin rotation agent.
//!
//! The agent holds exactly one roster token at a time and rotates it
//! through a configured mesh of swap venues whenever a scored candidate
//! route strictly beats the profit threshold. A vault-sourced guild
//! variant runs closed-loop raids on pooled capital alongside the main
//! position.
//!
//! Module map:
//! - [`config`]: TOML configuration, token roster, edge list
//! - [`types`]: shared data model (edges, routes, position state)
//! - [`graph`]: route enumeration over the token mesh
//! - [`chain`]: the on-chain collaborator seam
//! - [`oracle`]: protocol-dispatched price quotes
//! - [`strategy`]: 18-decimal scoring and thresholds
//! - [`storage`]: JSON position persistence
//! - [`engine`]: the decision loop, executor, and guild runner
//! - [`ledger`]: best-effort guild activity reporting

pub mod chain;
pub mod config;
pub mod engine;
pub mod graph;
pub mod ledger;
pub mod oracle;
pub mod storage;
pub mod strategy;
pub mod types;
