mod client;
pub mod octopus;
pub mod open_meteo;
mod price_provider;

pub use self::price_provider::{PriceProvider, group_by_date};
