//! Per-base quality score histograms and the percentiles derived from them.

pub mod histogram;
pub mod percentiles;

pub use histogram::PositionHistogram;
pub use histogram::QualityHistogram;
pub use percentiles::PercentileBands;
pub use percentiles::PercentileSet;
