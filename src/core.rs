pub mod appliance;
pub mod constraints;
pub mod error;
pub mod household;
pub mod interval;
pub mod search;
pub mod slot;
pub mod smart;
pub mod time_window;
pub mod weather;

pub use self::{
    appliance::{Appliance, ApplianceClass, ControlType, UsageFrequency, WaitDays},
    constraints::{Constraints, filter_by_constraints},
    error::PlanError,
    household::Household,
    search::{Options, Recommendation, WindowSearch, best_windows},
    slot::PriceSlot,
    smart::{
        DryingStrategy,
        RecommendationOption,
        SmartPlanner,
        SmartRecommendation,
        generate_smart_recommendations,
    },
    time_window::{TimeOfDay, TimeWindow},
    weather::WeatherForecast,
};
