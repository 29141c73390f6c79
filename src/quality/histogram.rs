//! Per-position quality score histograms.
//!
//! # Overview
//!
//! For each read position, the upstream QC pipeline reports how many reads
//! carried each PHRED quality score at that position. A [`PositionHistogram`]
//! holds one such position and a [`QualityHistogram`] holds all of them, in
//! read order.
//!
//! Scores are always kept sorted in ascending order. The percentile
//! computation below walks the scores from the lowest upwards and relies on
//! this ordering, so it is established explicitly when a histogram is built
//! rather than left to whichever map type the data was deserialized into.
//!
//! ```
//! use qcpp_report::quality::histogram::PositionHistogram;
//!
//! let position = PositionHistogram::from_counts([(30, 5), (20, 5)]);
//! assert_eq!(position.total(), 10);
//!
//! // The 6th read (0-indexed: 5) is the first with a score of 30.
//! assert_eq!(position.percentile(0.5).unwrap(), Some(30));
//! ```

use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;

use crate::errors::Error;

/// A mapping from quality score to the number of reads with that score at a
/// single read position. Scores are sorted in ascending order and unique.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "IndexMap<u32, u64>")]
pub struct PositionHistogram {
    counts: Vec<(u32, u64)>,
}

impl PositionHistogram {
    /// Builds a histogram from `(score, count)` pairs in any order. Repeated
    /// scores are summed.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (u32, u64)>,
    {
        let counts = counts
            .into_iter()
            .sorted_by_key(|(score, _)| *score)
            .coalesce(|(a, x), (b, y)| {
                if a == b {
                    Ok((a, x.saturating_add(y)))
                } else {
                    Err(((a, x), (b, y)))
                }
            })
            .collect();

        Self { counts }
    }

    /// The `(score, count)` pairs in ascending score order.
    pub fn counts(&self) -> &[(u32, u64)] {
        &self.counts
    }

    /// The total number of reads observed at this position, saturating at
    /// `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |total, (_, count)| total.saturating_add(*count))
    }

    fn checked_total(&self) -> Option<u64> {
        self.counts
            .iter()
            .try_fold(0u64, |total, (_, count)| total.checked_add(*count))
    }

    /// Finds the quality score at the `percentile`th read.
    ///
    /// The target read is `floor(total * percentile)` (0-indexed). Walking
    /// the scores upwards, the first score whose running count exceeds the
    /// target is returned. A percentile of exactly `1.0` resolves to the
    /// highest observed score.
    ///
    /// Returns `Ok(None)` when no reads were observed at this position.
    pub fn percentile(&self, percentile: f64) -> Result<Option<u32>, Error> {
        if !(0.0..=1.0).contains(&percentile) {
            return Err(Error::InvalidPercentile(percentile));
        }

        let total = self.checked_total().ok_or_else(|| {
            Error::MalformedDocument(String::from(
                "read counts at a single position exceed the supported total",
            ))
        })?;
        if total == 0 {
            return Ok(None);
        }

        let target = ((total as f64 * percentile).floor() as u64).min(total - 1);

        let mut running = 0u64;
        for (score, count) in &self.counts {
            running += count;
            if target < running {
                return Ok(Some(*score));
            }
        }

        // The running count reaches `total`, which is above `target`.
        Ok(self.counts.last().map(|(score, _)| *score))
    }
}

impl From<IndexMap<u32, u64>> for PositionHistogram {
    fn from(map: IndexMap<u32, u64>) -> Self {
        Self::from_counts(map)
    }
}

/// Quality score histograms for every read position, first position first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct QualityHistogram(Vec<PositionHistogram>);

impl QualityHistogram {
    /// Creates a new [`QualityHistogram`] from its positions.
    pub fn new(positions: Vec<PositionHistogram>) -> Self {
        Self(positions)
    }

    /// The histograms of each position, in read order.
    pub fn positions(&self) -> &[PositionHistogram] {
        &self.0
    }

    /// Number of read positions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no read positions at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The largest number of reads observed at any single position.
    pub fn max_depth(&self) -> u64 {
        self.0.iter().map(|p| p.total()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_are_sorted_and_merged() {
        let position = PositionHistogram::from_counts([(35, 1), (2, 4), (20, 2), (2, 1)]);
        assert_eq!(position.counts(), [(2, 5), (20, 2), (35, 1)]);
        assert_eq!(position.total(), 8);
    }

    #[test]
    fn test_percentile_tie_break_is_strict() {
        // target read is 5; the running counts are [5, 10], so only the second
        // score has strictly more than five reads at or below it.
        let position = PositionHistogram::from_counts([(20, 5), (30, 5)]);
        assert_eq!(position.percentile(0.5).unwrap(), Some(30));
        assert_eq!(position.percentile(0.49).unwrap(), Some(20));
    }

    #[test]
    fn test_percentile_bounds() {
        let position = PositionHistogram::from_counts([(10, 1), (20, 1), (30, 1)]);
        assert_eq!(position.percentile(0.0).unwrap(), Some(10));
        assert_eq!(position.percentile(1.0).unwrap(), Some(30));
        assert!(matches!(
            position.percentile(1.5),
            Err(Error::InvalidPercentile(_))
        ));
        assert!(matches!(
            position.percentile(-0.1),
            Err(Error::InvalidPercentile(_))
        ));
    }

    #[test]
    fn test_percentile_with_overflowing_counts() {
        let position = PositionHistogram::from_counts([(20, u64::MAX), (30, 1)]);
        assert_eq!(position.total(), u64::MAX);
        assert!(matches!(
            position.percentile(0.5),
            Err(Error::MalformedDocument(_))
        ));

        let position = PositionHistogram::from_counts([(30, u64::MAX)]);
        assert_eq!(position.percentile(1.0).unwrap(), Some(30));
    }

    #[test]
    fn test_percentile_of_empty_position() {
        let position = PositionHistogram::from_counts([(20, 0), (30, 0)]);
        assert_eq!(position.percentile(0.5).unwrap(), None);
        assert_eq!(PositionHistogram::default().percentile(0.5).unwrap(), None);
    }

    #[test]
    fn test_percentiles_are_monotonic() {
        let position =
            PositionHistogram::from_counts([(2, 3), (12, 17), (25, 40), (33, 120), (38, 9)]);
        let fractions = [0.0, 0.05, 0.1, 0.25, 0.5, 0.75, 0.9, 0.95, 1.0];

        let values = fractions
            .iter()
            .map(|p| position.percentile(*p).unwrap().unwrap())
            .collect::<Vec<_>>();

        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_median_covers_half_the_reads() {
        let position = PositionHistogram::from_counts([(5, 1), (15, 2), (25, 6), (35, 2)]);
        let median = position.percentile(0.5).unwrap().unwrap();
        let covered: u64 = position
            .counts()
            .iter()
            .filter(|(score, _)| *score <= median)
            .map(|(_, count)| count)
            .sum();

        assert!(covered > position.total() / 2);
    }

    #[test]
    fn test_deserialize_unordered_yaml() {
        let histogram: QualityHistogram =
            serde_yaml::from_str("- {38: 2, 12: 1, 30: 7}\n- {30: 4}\n").unwrap();

        assert_eq!(histogram.len(), 2);
        assert_eq!(
            histogram.positions()[0].counts(),
            [(12, 1), (30, 7), (38, 2)]
        );
        assert_eq!(histogram.max_depth(), 10);
    }
}
