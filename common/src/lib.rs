pub mod tracer;

pub use tracer::{TracerEngine, TracerOptions};

/// Floating-point type used for intensities, timestamps and thresholds.
pub type Real = f64;

/// Index along the scan axis of a dataset.
pub type ScanIndex = usize;

/// Index along the point axis of a dataset.
pub type PointIndex = usize;
