//! Time slices: the temporal window of one unit of work
//!
//! A slice bounds the reference times, valid times and lead durations of the
//! pairs it admits. Slices are immutable value types; the derived
//! lexicographic order over the six bounds gives stores and sets a
//! deterministic iteration order, and two slices are equal iff all bounds
//! are equal.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

/// The temporal window of one evaluation slice.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSlice {
    earliest_reference: DateTime<Utc>,
    latest_reference: DateTime<Utc>,
    earliest_valid: DateTime<Utc>,
    latest_valid: DateTime<Utc>,
    earliest_lead: TimeDelta,
    latest_lead: TimeDelta,
}

impl TimeSlice {
    /// A slice with explicit bounds in all dimensions
    pub fn new(
        earliest_reference: DateTime<Utc>,
        latest_reference: DateTime<Utc>,
        earliest_valid: DateTime<Utc>,
        latest_valid: DateTime<Utc>,
        earliest_lead: TimeDelta,
        latest_lead: TimeDelta,
    ) -> Self {
        Self {
            earliest_reference,
            latest_reference,
            earliest_valid,
            latest_valid,
            earliest_lead,
            latest_lead,
        }
    }

    /// A slice bounded only by a lead-duration range, unbounded in reference
    /// and valid time
    pub fn of_lead_bounds(earliest_lead: TimeDelta, latest_lead: TimeDelta) -> Self {
        Self::new(
            DateTime::<Utc>::MIN_UTC,
            DateTime::<Utc>::MAX_UTC,
            DateTime::<Utc>::MIN_UTC,
            DateTime::<Utc>::MAX_UTC,
            earliest_lead,
            latest_lead,
        )
    }

    /// A slice pinned to a single lead duration
    pub fn of_lead(lead: TimeDelta) -> Self {
        Self::of_lead_bounds(lead, lead)
    }

    pub fn earliest_reference(&self) -> DateTime<Utc> {
        self.earliest_reference
    }

    pub fn latest_reference(&self) -> DateTime<Utc> {
        self.latest_reference
    }

    pub fn earliest_valid(&self) -> DateTime<Utc> {
        self.earliest_valid
    }

    pub fn latest_valid(&self) -> DateTime<Utc> {
        self.latest_valid
    }

    pub fn earliest_lead(&self) -> TimeDelta {
        self.earliest_lead
    }

    pub fn latest_lead(&self) -> TimeDelta {
        self.latest_lead
    }
}

impl fmt::Display for TimeSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ref {}..{}, valid {}..{}, lead {}..{}]",
            self.earliest_reference,
            self.latest_reference,
            self.earliest_valid,
            self.latest_valid,
            self.earliest_lead,
            self.latest_lead
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_requires_all_bounds() {
        let a = TimeSlice::of_lead(TimeDelta::hours(42));
        let b = TimeSlice::of_lead(TimeDelta::hours(42));
        let c = TimeSlice::of_lead_bounds(TimeDelta::hours(42), TimeDelta::hours(66));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_ordering_by_lead() {
        let mut slices = vec![
            TimeSlice::of_lead(TimeDelta::hours(714)),
            TimeSlice::of_lead(TimeDelta::hours(42)),
            TimeSlice::of_lead(TimeDelta::hours(66)),
        ];
        slices.sort();

        assert_eq!(slices[0].earliest_lead(), TimeDelta::hours(42));
        assert_eq!(slices[2].earliest_lead(), TimeDelta::hours(714));
    }
}
