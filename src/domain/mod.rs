//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, IDs, errors)
//! - `account` - Account records, rank tiers, ban duration rules and the form state machine
//! - `reconciliation` - Pure rules for merging remote status and rank answers into records

pub mod account;
pub mod foundation;
pub mod reconciliation;
