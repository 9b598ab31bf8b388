//! Threshold conditions for slicing paired data
//!
//! A threshold is a comparison applied to the underlying pairs: an operator,
//! one or two boundary values and, optionally, the quantile probabilities
//! those values were derived from. Thresholds are immutable value types with
//! a total order so that stores and sets built over them iterate
//! deterministically.
//!
//! Ordering and equality over the `f64` boundaries use the IEEE total order
//! (`f64::total_cmp` and bit equality), which keeps `Eq`/`Ord` lawful even
//! for the negative-infinity bound used by [`Threshold::all_data`].

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// One or two boundary values.
///
/// Single-boundary operators use only the first value; `Between` uses both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OneOrTwoValues {
    first: f64,
    second: Option<f64>,
}

impl OneOrTwoValues {
    /// One boundary value
    pub fn one(first: f64) -> Self {
        Self {
            first,
            second: None,
        }
    }

    /// Two boundary values
    pub fn two(first: f64, second: f64) -> Self {
        Self {
            first,
            second: Some(second),
        }
    }

    pub fn first(&self) -> f64 {
        self.first
    }

    pub fn second(&self) -> Option<f64> {
        self.second
    }
}

impl PartialEq for OneOrTwoValues {
    fn eq(&self, other: &Self) -> bool {
        self.first.to_bits() == other.first.to_bits()
            && self.second.map(f64::to_bits) == other.second.map(f64::to_bits)
    }
}

impl Eq for OneOrTwoValues {}

impl PartialOrd for OneOrTwoValues {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OneOrTwoValues {
    fn cmp(&self, other: &Self) -> Ordering {
        self.first.total_cmp(&other.first).then_with(|| {
            match (self.second, other.second) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.total_cmp(&b),
            }
        })
    }
}

impl fmt::Display for OneOrTwoValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.second {
            Some(second) => write!(f, "{},{}", self.first, second),
            None => write!(f, "{}", self.first),
        }
    }
}

/// The comparison a threshold applies to a value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdOperator {
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    /// Lower bound inclusive, upper bound exclusive
    Between,
}

impl ThresholdOperator {
    pub fn as_str(&self) -> &str {
        match self {
            ThresholdOperator::Greater => ">",
            ThresholdOperator::GreaterEqual => ">=",
            ThresholdOperator::Less => "<",
            ThresholdOperator::LessEqual => "<=",
            ThresholdOperator::Between => "between",
        }
    }
}

impl fmt::Display for ThresholdOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The side of the pairing a threshold condition applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSide {
    Observed,
    Predicted,
    Both,
}

impl ThresholdSide {
    pub fn as_str(&self) -> &str {
        match self {
            ThresholdSide::Observed => "observed",
            ThresholdSide::Predicted => "predicted",
            ThresholdSide::Both => "observed and predicted",
        }
    }
}

impl fmt::Display for ThresholdSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A filter condition on the underlying paired data.
///
/// The boundary values are real data values; when the threshold was derived
/// from climatological quantiles, `probabilities` records the quantile
/// probabilities alongside.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Threshold {
    values: OneOrTwoValues,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    probabilities: Option<OneOrTwoValues>,
    operator: ThresholdOperator,
    side: ThresholdSide,
}

impl Threshold {
    /// A threshold in real values
    pub fn of(values: OneOrTwoValues, operator: ThresholdOperator, side: ThresholdSide) -> Self {
        Self {
            values,
            probabilities: None,
            operator,
            side,
        }
    }

    /// A quantile threshold: real values plus the probabilities they were
    /// derived from
    pub fn of_quantiles(
        values: OneOrTwoValues,
        probabilities: OneOrTwoValues,
        operator: ThresholdOperator,
        side: ThresholdSide,
    ) -> Self {
        Self {
            values,
            probabilities: Some(probabilities),
            operator,
            side,
        }
    }

    /// The catch-all threshold that admits every finite value
    pub fn all_data() -> Self {
        Self::of(
            OneOrTwoValues::one(f64::NEG_INFINITY),
            ThresholdOperator::Greater,
            ThresholdSide::Observed,
        )
    }

    pub fn values(&self) -> &OneOrTwoValues {
        &self.values
    }

    pub fn probabilities(&self) -> Option<&OneOrTwoValues> {
        self.probabilities.as_ref()
    }

    pub fn operator(&self) -> ThresholdOperator {
        self.operator
    }

    pub fn side(&self) -> ThresholdSide {
        self.side
    }

    pub fn is_quantile(&self) -> bool {
        self.probabilities.is_some()
    }

    pub fn is_all_data(&self) -> bool {
        self.operator == ThresholdOperator::Greater
            && self.values.first() == f64::NEG_INFINITY
            && self.values.second().is_none()
    }

    /// Apply the condition to one value
    pub fn test(&self, value: f64) -> bool {
        let first = self.values.first();
        match self.operator {
            ThresholdOperator::Greater => value > first,
            ThresholdOperator::GreaterEqual => value >= first,
            ThresholdOperator::Less => value < first,
            ThresholdOperator::LessEqual => value <= first,
            ThresholdOperator::Between => {
                // A between threshold without a second bound admits nothing
                match self.values.second() {
                    Some(second) => value >= first && value < second,
                    None => false,
                }
            }
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all_data() {
            return write!(f, "all data");
        }
        write!(f, "{} {} {}", self.side, self.operator, self.values)?;
        if let Some(probabilities) = &self.probabilities {
            write!(f, " [Pr={}]", probabilities)?;
        }
        Ok(())
    }
}

/// A primary threshold with an optional secondary threshold.
///
/// The secondary condition combines, for example, a decision threshold with
/// a data threshold; most evaluations carry only the primary.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ThresholdPair {
    first: Threshold,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    second: Option<Threshold>,
}

impl ThresholdPair {
    /// A pair with only a primary threshold
    pub fn of(first: Threshold) -> Self {
        Self {
            first,
            second: None,
        }
    }

    /// A pair with a primary and a secondary threshold
    pub fn of_both(first: Threshold, second: Threshold) -> Self {
        Self {
            first,
            second: Some(second),
        }
    }

    /// The all-data pair: admits everything, no secondary condition
    pub fn all_data() -> Self {
        Self::of(Threshold::all_data())
    }

    pub fn first(&self) -> &Threshold {
        &self.first
    }

    pub fn second(&self) -> Option<&Threshold> {
        self.second.as_ref()
    }

    pub fn has_two(&self) -> bool {
        self.second.is_some()
    }
}

impl fmt::Display for ThresholdPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.second {
            Some(second) => write!(f, "{} AND {}", self.first, second),
            None => write!(f, "{}", self.first),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Threshold::of_quantiles(
            OneOrTwoValues::one(531.88),
            OneOrTwoValues::one(0.005),
            ThresholdOperator::Greater,
            ThresholdSide::Observed,
        );
        let b = Threshold::of_quantiles(
            OneOrTwoValues::one(531.88),
            OneOrTwoValues::one(0.005),
            ThresholdOperator::Greater,
            ThresholdSide::Observed,
        );
        assert_eq!(a, b);

        let c = Threshold::of(
            OneOrTwoValues::one(531.88),
            ThresholdOperator::Greater,
            ThresholdSide::Observed,
        );
        assert_ne!(a, c);
    }

    #[test]
    fn test_all_data_admits_finite_values() {
        let all = Threshold::all_data();
        assert!(all.is_all_data());
        assert!(all.test(-1.0e18));
        assert!(all.test(0.0));
        assert!(all.test(26648.0));
    }

    #[test]
    fn test_operators() {
        let greater = Threshold::of(
            OneOrTwoValues::one(5.0),
            ThresholdOperator::Greater,
            ThresholdSide::Observed,
        );
        assert!(greater.test(5.1));
        assert!(!greater.test(5.0));

        let between = Threshold::of(
            OneOrTwoValues::two(1.0, 2.0),
            ThresholdOperator::Between,
            ThresholdSide::Observed,
        );
        assert!(between.test(1.0));
        assert!(between.test(1.5));
        assert!(!between.test(2.0));
    }

    #[test]
    fn test_ordering_is_total() {
        let mut thresholds = vec![
            Threshold::of(
                OneOrTwoValues::one(6.0),
                ThresholdOperator::Greater,
                ThresholdSide::Observed,
            ),
            Threshold::all_data(),
            Threshold::of(
                OneOrTwoValues::one(5.0),
                ThresholdOperator::Greater,
                ThresholdSide::Observed,
            ),
        ];
        thresholds.sort();
        assert!(thresholds[0].is_all_data());
        assert_eq!(thresholds[1].values().first(), 5.0);
        assert_eq!(thresholds[2].values().first(), 6.0);
    }

    #[test]
    fn test_pair_display() {
        let pair = ThresholdPair::of_both(
            Threshold::of(
                OneOrTwoValues::one(1.0),
                ThresholdOperator::GreaterEqual,
                ThresholdSide::Observed,
            ),
            Threshold::of(
                OneOrTwoValues::one(5.0),
                ThresholdOperator::Greater,
                ThresholdSide::Predicted,
            ),
        );
        assert_eq!(
            pair.to_string(),
            "observed >= 1 AND predicted > 5"
        );
    }
}
