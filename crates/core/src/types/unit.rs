//! Units of measure for produce listings.

use serde::{Deserialize, Serialize};

/// Unit a listing is priced and sold in.
///
/// Quantities are decimal, so fractional amounts of divisible units
/// (2.5 kg, 0.5 litre) are representable; the backend enforces whole
/// numbers for countable units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    #[default]
    Kg,
    Piece,
    Bunch,
    Litre,
    Bag,
}

impl UnitOfMeasure {
    /// Human-readable unit name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Kg => "Kilogram",
            Self::Piece => "Piece",
            Self::Bunch => "Bunch",
            Self::Litre => "Litre",
            Self::Bag => "Bag",
        }
    }
}

impl std::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kg => write!(f, "kg"),
            Self::Piece => write!(f, "piece"),
            Self::Bunch => write!(f, "bunch"),
            Self::Litre => write!(f, "litre"),
            Self::Bag => write!(f, "bag"),
        }
    }
}
