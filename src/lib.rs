//! cds-sync library
//!
//! Reconciles the CdsHelper city data stores:
//! - database → cities.json (coordinates and library flag)
//! - city CSV export → database (guild flag)

pub mod commands;
pub mod config;
pub mod store;
