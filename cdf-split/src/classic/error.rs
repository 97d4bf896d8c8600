use crate::dataset::ValuesError;
use thiserror::Error;

pub type ClassicResult<T> = Result<T, ClassicError>;

#[derive(Debug, Error)]
pub enum ClassicError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Unsupported format: magic number {0:?}")]
    UnsupportedFormat([u8; 4]),
    #[error("Malformed header at byte {offset}: {reason}")]
    MalformedHeader { offset: u64, reason: String },
    #[error("Unknown external type {0}")]
    UnknownType(u32),
    #[error("Encoded dataset needs {required} bytes, exceeding the {limit} byte buffer")]
    BufferOverflow { required: u64, limit: u64 },
    #[error("Unlimited dimension {dimension} must be the leading dimension of variable {variable}")]
    UnlimitedNotLeading { dimension: String, variable: String },
    #[error("Dataset has more than one unlimited dimension")]
    MultipleUnlimited,
    #[error("Fixed dimension {0} has length zero, which would encode as unlimited")]
    EmptyFixedDimension(String),
    #[error("Variable {variable} has {found} bytes of data, expected {expected}")]
    DataLength {
        variable: String,
        expected: usize,
        found: usize,
    },
    #[error("Variable {0} has no leading axis")]
    NoLeadingAxis(String),
    #[error("Values Error: {0}")]
    Values(#[from] ValuesError),
    #[error("Array Shape Error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
