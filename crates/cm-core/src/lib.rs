//! # cm-core
//!
//! Core types shared across all CarbonMeter crates:
//! - Entity structs (activity observations, organization profiles, cohort
//!   entries, carbon credit transactions)
//! - Closed enums for scopes, categories, transaction types and ranking labels
//! - ID prefix constants
//! - Cross-cutting error types
//! - Response types returned by the engine's exposed operations

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
