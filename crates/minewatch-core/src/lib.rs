//! minewatch-core - Domain layer for the minewatch automation daemon.
//!
//! This crate holds everything that can be judged without talking to the
//! remote game services: the records the services report, the time and
//! lifecycle predicates over them, the reinforcement selection policies,
//! and the per-user configuration. Anything that performs network I/O
//! lives in `minewatch-daemon` behind collaborator traits.
//!
//! # Modules
//!
//! - [`clock`]: Injectable time source for deterministic predicates
//! - [`config`]: Per-user automation settings loaded from TOML
//! - [`game`]: Mine, team, and recruit records plus time predicates
//! - [`strategy`]: Reinforcement selection policies

pub mod clock;
pub mod config;
pub mod game;
pub mod strategy;
