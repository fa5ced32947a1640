pub mod cost;
pub mod currency;
pub mod energy;
pub mod rate;

use std::ops::{Div, Mul};

use serde::{Deserialize, Serialize};

/// Dimensioned value: the const parameters are the exponents of energy, time, and cost.
#[derive(
    Clone,
    Copy,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Quantity<T, const ENERGY: isize, const TIME: isize, const COST: isize>(pub T);

impl<const ENERGY: isize, const TIME: isize, const COST: isize> Quantity<f64, ENERGY, TIME, COST> {
    pub const ZERO: Self = Self(0.0);
}

impl<T, const ENERGY: isize, const TIME: isize, const COST: isize> Mul<T>
    for Quantity<T, ENERGY, TIME, COST>
where
    T: Mul<T>,
{
    type Output = Quantity<T::Output, ENERGY, TIME, COST>;

    fn mul(self, rhs: T) -> Self::Output {
        Quantity(self.0 * rhs)
    }
}

impl<T, const ENERGY: isize, const TIME: isize, const COST: isize> Div<T>
    for Quantity<T, ENERGY, TIME, COST>
where
    T: Div<T>,
{
    type Output = Quantity<T::Output, ENERGY, TIME, COST>;

    fn div(self, rhs: T) -> Self::Output {
        Quantity(self.0 / rhs)
    }
}
