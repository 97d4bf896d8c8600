//! Segmentation of the intensity trace: smoothing, noise threshold estimation
//! and detection of the scan ranges over which the trace exceeds the threshold.
mod ranges;
mod smoothing;
mod threshold;

pub use ranges::{CrossingRange, CrossingRangeFilter, CrossingRanges};
pub use smoothing::{SmoothedTrace, SmoothingWindow};
pub use threshold::{NoiseEstimator, NoiseMethod};
