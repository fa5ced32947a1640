use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::quantity::cost::Pence;

/// Cost in the account currency.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Pounds(pub f64);

impl Pounds {
    pub const ZERO: Self = Self(0.0);
}

impl From<Pence> for Pounds {
    fn from(pence: Pence) -> Self {
        Self(pence.0 / 100.0)
    }
}

impl Display for Pounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0.0 { write!(f, "-£{:.2}", -self.0) } else { write!(f, "£{:.2}", self.0) }
    }
}

impl Debug for Pounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
