use crate::{classic::ClassicError, dataset::DataType, dataset::ValuesError};
use cdf_split_common::{Real, ScanIndex};
use std::path::PathBuf;
use thiserror::Error;

pub type SplitResult<T> = Result<T, SplitError>;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Output path {0} exists but is not a directory")]
    InvalidOutputTarget(PathBuf),
    #[error("No samples within the {noise_sec}s baseline window")]
    EmptyBaselineWindow { noise_sec: Real },
    #[error("Intensity trace has {intensity} samples but the time axis has {times}")]
    TraceLengthMismatch { intensity: usize, times: usize },
    #[error("Dimension {0} missing from dataset")]
    MissingDimension(String),
    #[error("Variable {0} missing from dataset")]
    MissingVariable(String),
    #[error("Variable {name} has unsupported type {data_type}")]
    UnsupportedVariableType { name: String, data_type: DataType },
    #[error("Variable {name} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("Point offset {offset} of scan {scan} is inconsistent with a point axis of {point_count} points")]
    InconsistentPointOffsets {
        scan: ScanIndex,
        offset: i64,
        point_count: usize,
    },
    #[error("Scan range {start}..{end} exceeds the {scan_count} scans of the dataset")]
    ScanRangeOutOfBounds {
        start: ScanIndex,
        end: ScanIndex,
        scan_count: usize,
    },
    #[error("Cannot re-base variable {name}: {error}")]
    Rebase { name: String, error: ValuesError },
    #[error("Values Error: {0}")]
    Values(#[from] ValuesError),
    #[error("{0}")]
    Classic(#[from] ClassicError),
    #[error("Archive Error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Plot Error: {0}")]
    Plot(String),
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
}
