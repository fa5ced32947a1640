use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Cost in the smallest currency unit.
pub type Pence = Quantity<f64, 0, 0, 1>;

impl Display for Pence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} p", self.0)
    }
}

impl Debug for Pence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}p", self.0)
    }
}
