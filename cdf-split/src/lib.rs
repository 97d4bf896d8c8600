//! Splits a scan-indexed intensity trace, stored as a netCDF classic dataset,
//! into one sub-dataset for each range of scans over which the smoothed
//! intensity rises above a noise threshold.
pub mod archive;
pub mod classic;
pub mod dataset;
pub mod error;
pub mod parameters;
pub mod plot;
pub mod signal;
pub mod slicing;
pub mod split;

pub use error::{SplitError, SplitResult};
pub use parameters::SplitParameters;
pub use split::{RangeReport, SplitReport, TraceAnalysis, run};
