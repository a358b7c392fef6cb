//! Scenario, determinism and property tests for the combat core.
//!
//! - `scenarios.rs`: end-to-end fights driven through the [`Engine`](crate::Engine)
//! - `determinism.rs`: same seed, same journal
//! - `properties.rs`: proptest checks over timers and dispatch spacing
//! - `helpers.rs`: spawning and journal queries shared by the above

mod determinism;
mod helpers;
mod properties;
