use crate::core::appliance::ApplianceClass;

/// Reasons a single planning call gives up.
///
/// None of them is fatal: callers skip the appliance and carry on with the rest.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("no feasible time slots found matching constraints")]
    NoFeasibleSlots,

    #[error("no feasible options found within the lookahead window")]
    NoFeasibleOptions,

    #[error("unsupported appliance class `{0}` or missing coupled appliance")]
    UnsupportedClass(ApplianceClass),
}
