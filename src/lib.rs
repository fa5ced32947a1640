//! Recommends when to run household appliances on a half-hourly electricity tariff.

pub mod api;
pub mod config;
pub mod core;
pub mod prelude;
pub mod quantity;
