//! Percentile bands across all read positions of a [`QualityHistogram`].

use crate::errors::Error;
use crate::quality::histogram::QualityHistogram;

/// Spacing between ticks on the read position axis.
pub const TICK_SPACING: u32 = 10;

/// Headroom added above the highest upper percentile on the quality axis.
pub const Y_HEADROOM: u32 = 2;

/// An ascending set of percentile fractions with the median in the middle.
/// The `i`th and `(last - i)`th fractions bound a shaded range.
#[derive(Clone, Debug, PartialEq)]
pub struct PercentileSet {
    fractions: Vec<f64>,
}

/// A range between two percentiles of a [`PercentileSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PercentileRange {
    /// Index of the lower bounding fraction.
    pub lower: usize,

    /// Index of the upper bounding fraction.
    pub upper: usize,

    /// Percentage of reads covered by the range.
    pub label: u32,
}

impl PercentileSet {
    /// The 5th, 25th, 50th, 75th and 95th percentiles.
    pub fn standard() -> Self {
        Self {
            fractions: vec![0.05, 0.25, 0.5, 0.75, 0.95],
        }
    }

    /// The fractions, in ascending order.
    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    /// Index of the median fraction.
    pub fn median_index(&self) -> usize {
        self.fractions.len() / 2
    }

    /// The ranges bounded by symmetric pairs of fractions, innermost first.
    pub fn ranges(&self) -> Vec<PercentileRange> {
        let last = self.fractions.len() - 1;

        (0..self.median_index())
            .rev()
            .map(|lower| {
                let upper = last - lower;
                let width = self.fractions[upper] - self.fractions[lower];

                PercentileRange {
                    lower,
                    upper,
                    label: (width * 100.0).round() as u32,
                }
            })
            .collect()
    }
}

impl Default for PercentileSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// The quality score at each fraction of a [`PercentileSet`], for every read
/// position.
#[derive(Clone, Debug)]
pub struct PercentileBands {
    set: PercentileSet,
    values: Vec<Vec<u32>>,
}

impl PercentileBands {
    /// Computes every percentile of `set` at every position of `histogram`.
    ///
    /// Fails with [`Error::MissingData`] if there are no positions or if any
    /// position has no observed reads.
    pub fn compute(histogram: &QualityHistogram, set: &PercentileSet) -> Result<Self, Error> {
        if histogram.is_empty() {
            return Err(Error::MissingData(String::from(
                "quality histogram has no read positions",
            )));
        }

        let mut values = vec![Vec::with_capacity(histogram.len()); set.fractions().len()];

        for (i, position) in histogram.positions().iter().enumerate() {
            for (j, fraction) in set.fractions().iter().enumerate() {
                let score = position.percentile(*fraction)?.ok_or_else(|| {
                    Error::MissingData(format!("read position {} has no observed reads", i + 1))
                })?;

                values[j].push(score);
            }
        }

        Ok(Self {
            set: set.clone(),
            values,
        })
    }

    /// The percentile set these bands were computed for.
    pub fn set(&self) -> &PercentileSet {
        &self.set
    }

    /// Number of read positions.
    pub fn positions(&self) -> usize {
        self.values[0].len()
    }

    /// 1-based read positions, for use as x values.
    pub fn read_positions(&self) -> Vec<u32> {
        (1..=self.positions() as u32).collect()
    }

    /// Quality scores of the `index`th fraction across all positions.
    pub fn values(&self, index: usize) -> &[u32] {
        &self.values[index]
    }

    /// Median quality score across all positions.
    pub fn median(&self) -> &[u32] {
        self.values(self.set.median_index())
    }

    /// Upper limit of the quality axis: the highest value of the top
    /// percentile plus [`Y_HEADROOM`].
    pub fn y_upper_bound(&self) -> u32 {
        let top = self.values.last().map(|v| v.as_slice()).unwrap_or_default();
        top.iter().copied().max().unwrap_or(0) + Y_HEADROOM
    }

    /// Positions that receive a tick on the read position axis: every
    /// multiple of [`TICK_SPACING`] below the last position. Reads too short
    /// for any such tick get one on every position instead.
    pub fn x_ticks(&self) -> Vec<u32> {
        let last = self.positions() as u32;
        let ticks: Vec<u32> = (TICK_SPACING..last).step_by(TICK_SPACING as usize).collect();

        if ticks.is_empty() {
            (1..=last).collect()
        } else {
            ticks
        }
    }
}
