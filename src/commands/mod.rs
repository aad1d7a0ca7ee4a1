//! CLI commands

pub mod sync_cities;
pub mod sync_guild;
pub mod utils;
