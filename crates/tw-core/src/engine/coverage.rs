//! Day → covering observation lookup.

use chrono::NaiveDate;

use super::rate::{Coverage, RatedObservation};

/// Index over the coverage intervals of a rated sequence.
///
/// Intervals are kept sorted by end date. In a sequence produced by
/// `compute_rates` they are disjoint, so a lookup is one binary search.
/// For hand-built overlapping input the most recent covering observation
/// wins, which needs a scan over the later intervals.
#[derive(Debug, Clone)]
pub struct CoverageIndex<'a> {
    entries: Vec<(Coverage, &'a RatedObservation)>,
    overlapping: bool,
}

impl<'a> CoverageIndex<'a> {
    pub fn new(rated: &'a [RatedObservation]) -> Self {
        let mut entries: Vec<(Coverage, &'a RatedObservation)> = rated
            .iter()
            .filter(|r| r.rate.is_some())
            .filter_map(|r| r.coverage.map(|c| (c, r)))
            .collect();
        entries.sort_by_key(|(c, r)| (c.end, r.date));
        let overlapping = entries
            .windows(2)
            .any(|pair| pair[1].0.start <= pair[0].0.end);
        CoverageIndex {
            entries,
            overlapping,
        }
    }

    /// The observation whose coverage contains `day`, if any.
    pub fn covering(&self, day: NaiveDate) -> Option<&'a RatedObservation> {
        let first_candidate = self.entries.partition_point(|(c, _)| c.end < day);
        if !self.overlapping {
            return self
                .entries
                .get(first_candidate)
                .filter(|(c, _)| c.contains(day))
                .map(|(_, r)| *r);
        }
        self.entries[first_candidate..]
            .iter()
            .rev()
            .find(|(c, _)| c.contains(day))
            .map(|(_, r)| *r)
    }

    /// Rate attributed to `day`; 0 when no observation covers it.
    pub fn rate_on(&self, day: NaiveDate) -> f64 {
        self.covering(day).and_then(|r| r.rate).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest and latest covered day.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.entries.iter().map(|(c, _)| c.start).min()?;
        let end = self.entries.last().map(|(c, _)| c.end)?;
        Some((start, end))
    }
}
