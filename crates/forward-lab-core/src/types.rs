use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values and prices. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions measured from contract inception.
pub type Years = Decimal;

/// Side of a forward contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Long,
    Short,
}

impl Position {
    /// Convert a long-position value into the value for this side.
    pub fn apply(self, long_value: Money) -> Money {
        match self {
            Position::Long => long_value,
            Position::Short => -long_value,
        }
    }
}

/// Shape of the forward relative to spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketCondition {
    Contango,
    Backwardation,
    Flat,
}

impl MarketCondition {
    pub fn from_basis(basis: Money) -> Self {
        if basis > Decimal::ZERO {
            MarketCondition::Contango
        } else if basis < Decimal::ZERO {
            MarketCondition::Backwardation
        } else {
            MarketCondition::Flat
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_short_is_negated_long() {
        assert_eq!(Position::Short.apply(dec!(12.5)), dec!(-12.5));
        assert_eq!(Position::Long.apply(dec!(12.5)), dec!(12.5));
    }

    #[test]
    fn test_position_serde_lowercase() {
        let p: Position = serde_json::from_str("\"short\"").unwrap();
        assert_eq!(p, Position::Short);
        assert_eq!(serde_json::to_string(&Position::Long).unwrap(), "\"long\"");
    }

    #[test]
    fn test_market_condition_from_basis() {
        assert_eq!(MarketCondition::from_basis(dec!(1)), MarketCondition::Contango);
        assert_eq!(
            MarketCondition::from_basis(dec!(-0.01)),
            MarketCondition::Backwardation
        );
        assert_eq!(MarketCondition::from_basis(Decimal::ZERO), MarketCondition::Flat);
    }
}
