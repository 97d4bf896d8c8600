//! Big-endian (XDR) encoding of values, as used by every part of a netCDF classic file.
use super::error::{ClassicError, ClassicResult};
use crate::dataset::{DataType, Values, with_values};
use ndarray::{ArrayD, IxDyn};

pub(super) const NC_BYTE: u32 = 1;
pub(super) const NC_CHAR: u32 = 2;
pub(super) const NC_SHORT: u32 = 3;
pub(super) const NC_INT: u32 = 4;
pub(super) const NC_FLOAT: u32 = 5;
pub(super) const NC_DOUBLE: u32 = 6;

/// Number of bytes needed to bring `len` up to a four byte boundary.
pub(super) fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

pub(super) fn padded(len: usize) -> usize {
    len + padding(len)
}

pub(super) fn type_code(data_type: DataType) -> u32 {
    match data_type {
        DataType::Byte => NC_BYTE,
        DataType::Char => NC_CHAR,
        DataType::Short => NC_SHORT,
        DataType::Int => NC_INT,
        DataType::Float => NC_FLOAT,
        DataType::Double => NC_DOUBLE,
    }
}

pub(super) fn data_type(code: u32) -> ClassicResult<DataType> {
    match code {
        NC_BYTE => Ok(DataType::Byte),
        NC_CHAR => Ok(DataType::Char),
        NC_SHORT => Ok(DataType::Short),
        NC_INT => Ok(DataType::Int),
        NC_FLOAT => Ok(DataType::Float),
        NC_DOUBLE => Ok(DataType::Double),
        other => Err(ClassicError::UnknownType(other)),
    }
}

fn decode<T, const N: usize>(bytes: &[u8], from_be_bytes: fn([u8; N]) -> T) -> Vec<T> {
    bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut buffer = [0u8; N];
            buffer.copy_from_slice(chunk);
            from_be_bytes(buffer)
        })
        .collect()
}

/// Decodes `bytes` into an array of the given type and shape.
/// Fails if the number of bytes does not match the shape exactly.
pub(super) fn decode_values(
    data_type: DataType,
    shape: &[usize],
    bytes: &[u8],
) -> ClassicResult<Values> {
    let shape = IxDyn(shape);
    Ok(match data_type {
        DataType::Byte => Values::Byte(ArrayD::from_shape_vec(
            shape,
            decode(bytes, i8::from_be_bytes),
        )?),
        DataType::Char => Values::Char(ArrayD::from_shape_vec(shape, bytes.to_vec())?),
        DataType::Short => Values::Short(ArrayD::from_shape_vec(
            shape,
            decode(bytes, i16::from_be_bytes),
        )?),
        DataType::Int => Values::Int(ArrayD::from_shape_vec(
            shape,
            decode(bytes, i32::from_be_bytes),
        )?),
        DataType::Float => Values::Float(ArrayD::from_shape_vec(
            shape,
            decode(bytes, f32::from_be_bytes),
        )?),
        DataType::Double => Values::Double(ArrayD::from_shape_vec(
            shape,
            decode(bytes, f64::from_be_bytes),
        )?),
    })
}

/// Appends the elements of `values` in row-major order.
pub(super) fn encode_values(values: &Values, out: &mut Vec<u8>) {
    with_values!(values, |array| out
        .extend(array.iter().flat_map(|value| value.to_be_bytes())))
}

pub(super) fn encode_padding(len: usize, out: &mut Vec<u8>) {
    out.extend(std::iter::repeat_n(0u8, padding(len)));
}
