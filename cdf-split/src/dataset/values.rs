use cdf_split_common::Real;
use ndarray::{Array1, ArrayD, Axis, Slice};
use num::{CheckedSub, NumCast, ToPrimitive};
use std::ops::{Range, Sub};
use thiserror::Error;

/// The external types of the netCDF classic data model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum DataType {
    #[strum(to_string = "byte")]
    Byte,
    #[strum(to_string = "char")]
    Char,
    #[strum(to_string = "short")]
    Short,
    #[strum(to_string = "int")]
    Int,
    #[strum(to_string = "float")]
    Float,
    #[strum(to_string = "double")]
    Double,
}

impl DataType {
    /// Size in bytes of a single element.
    pub fn size(self) -> usize {
        match self {
            DataType::Byte | DataType::Char => 1,
            DataType::Short => 2,
            DataType::Int | DataType::Float => 4,
            DataType::Double => 8,
        }
    }
}

#[derive(Debug, Error)]
pub enum ValuesError {
    #[error("Axis {axis} out of bounds for array of rank {rank}")]
    AxisOutOfBounds { axis: usize, rank: usize },
    #[error("Range {start}..{end} out of bounds for axis of length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
    #[error("Cannot shift {data_type} values")]
    NotShiftable { data_type: DataType },
    #[error("Origin {origin} not representable as {data_type}")]
    OriginOutOfRange { origin: i64, data_type: DataType },
    #[error("Shifting {data_type} value {value} by {origin} overflows")]
    ShiftOverflow {
        value: i64,
        origin: i64,
        data_type: DataType,
    },
}

/// A typed n-dimensional array holding the data of a variable or attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum Values {
    Byte(ArrayD<i8>),
    Char(ArrayD<u8>),
    Short(ArrayD<i16>),
    Int(ArrayD<i32>),
    Float(ArrayD<f32>),
    Double(ArrayD<f64>),
}

/// Applies an expression to the array of every variant, producing a value of a common type.
macro_rules! with_values {
    ($values:expr, |$array:ident| $body:expr) => {
        match $values {
            Values::Byte($array) => $body,
            Values::Char($array) => $body,
            Values::Short($array) => $body,
            Values::Int($array) => $body,
            Values::Float($array) => $body,
            Values::Double($array) => $body,
        }
    };
}

/// Applies an expression to the array of every variant, preserving the variant.
macro_rules! map_values {
    ($values:expr, |$array:ident| $body:expr) => {
        match $values {
            Values::Byte($array) => Values::Byte($body),
            Values::Char($array) => Values::Char($body),
            Values::Short($array) => Values::Short($body),
            Values::Int($array) => Values::Int($body),
            Values::Float($array) => Values::Float($body),
            Values::Double($array) => Values::Double($body),
        }
    };
}

pub(crate) use with_values;

fn cast_origin<T: NumCast>(origin: i64, data_type: DataType) -> Result<T, ValuesError> {
    <T as NumCast>::from(origin).ok_or(ValuesError::OriginOutOfRange { origin, data_type })
}

fn shift_integers<T>(
    array: &ArrayD<T>,
    origin: i64,
    data_type: DataType,
) -> Result<ArrayD<T>, ValuesError>
where
    T: NumCast + ToPrimitive + CheckedSub + Copy,
{
    let delta = cast_origin::<T>(origin, data_type)?;
    if let Some(value) = array.iter().find(|value| value.checked_sub(&delta).is_none()) {
        return Err(ValuesError::ShiftOverflow {
            value: value.to_i64().unwrap_or_default(),
            origin,
            data_type,
        });
    }
    Ok(array.mapv(|value| value - delta))
}

fn shift_reals<T>(
    array: &ArrayD<T>,
    origin: i64,
    data_type: DataType,
) -> Result<ArrayD<T>, ValuesError>
where
    T: NumCast + Copy + Sub<Output = T>,
{
    let delta = cast_origin::<T>(origin, data_type)?;
    Ok(array.mapv(|value| value - delta))
}

impl Values {
    /// Creates a one-dimensional char array from a string.
    pub fn text(text: &str) -> Self {
        Values::Char(Array1::from_vec(text.as_bytes().to_vec()).into_dyn())
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Values::Byte(_) => DataType::Byte,
            Values::Char(_) => DataType::Char,
            Values::Short(_) => DataType::Short,
            Values::Int(_) => DataType::Int,
            Values::Float(_) => DataType::Float,
            Values::Double(_) => DataType::Double,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_values!(self, |array| array.shape())
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        with_values!(self, |array| array.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the elements in `range` along `axis`, all other axes kept whole.
    pub fn slice_axis(&self, axis: usize, range: Range<usize>) -> Result<Values, ValuesError> {
        let shape = self.shape();
        let len = *shape.get(axis).ok_or(ValuesError::AxisOutOfBounds {
            axis,
            rank: shape.len(),
        })?;
        if range.start > range.end || range.end > len {
            return Err(ValuesError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len,
            });
        }
        let slice = Slice::from(range);
        Ok(map_values!(self, |array| array
            .slice_axis(Axis(axis), slice)
            .to_owned()))
    }

    /// Subtracts `origin` from every element.
    pub fn shifted(&self, origin: i64) -> Result<Values, ValuesError> {
        let data_type = self.data_type();
        Ok(match self {
            Values::Byte(array) => Values::Byte(shift_integers(array, origin, data_type)?),
            Values::Short(array) => Values::Short(shift_integers(array, origin, data_type)?),
            Values::Int(array) => Values::Int(shift_integers(array, origin, data_type)?),
            Values::Float(array) => Values::Float(shift_reals(array, origin, data_type)?),
            Values::Double(array) => Values::Double(shift_reals(array, origin, data_type)?),
            Values::Char(_) => return Err(ValuesError::NotShiftable { data_type }),
        })
    }

    /// Flattens numeric values to reals, in logical order. Char values yield `None`.
    pub fn to_reals(&self) -> Option<Vec<Real>> {
        match self {
            Values::Char(_) => None,
            Values::Byte(array) => array.iter().map(ToPrimitive::to_f64).collect(),
            Values::Short(array) => array.iter().map(ToPrimitive::to_f64).collect(),
            Values::Int(array) => array.iter().map(ToPrimitive::to_f64).collect(),
            Values::Float(array) => array.iter().map(ToPrimitive::to_f64).collect(),
            Values::Double(array) => array.iter().map(ToPrimitive::to_f64).collect(),
        }
    }

    /// Flattens integer values to `i64`, in logical order.
    /// Char and floating-point values yield `None`.
    pub fn to_indices(&self) -> Option<Vec<i64>> {
        match self {
            Values::Byte(array) => {
                Some(array.iter().map(|&v| <i64 as From<i8>>::from(v)).collect())
            }
            Values::Short(array) => {
                Some(array.iter().map(|&v| <i64 as From<i16>>::from(v)).collect())
            }
            Values::Int(array) => {
                Some(array.iter().map(|&v| <i64 as From<i32>>::from(v)).collect())
            }
            Values::Char(_) | Values::Float(_) | Values::Double(_) => None,
        }
    }

    /// Interprets char values as text, lossily.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Values::Char(array) => {
                let bytes: Vec<u8> = array.iter().copied().collect();
                Some(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => None,
        }
    }
}
