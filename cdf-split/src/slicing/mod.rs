//! Cutting a dataset down to the scans of one crossing range, together with
//! the points those scans own, while keeping the result self-consistent.
mod scan_map;
mod schema;
mod slicer;

pub use scan_map::ScanPointMap;
pub use schema::{Rebase, SliceSchema};
pub use slicer::{SliceWindow, slice_dataset};
