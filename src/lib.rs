//! Ban Watch - Game Account Roster with Ban Reconciliation
//!
//! This crate keeps a roster of game accounts together with each account's
//! temporary-ban state and competitive rank, and reconciles that roster with
//! remote ban-status and rank services in a single background pass.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
