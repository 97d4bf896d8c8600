use super::{
    error::{ClassicError, ClassicResult},
    header::{FileHeader, Version, VariableLayout},
    xdr::{encode_padding, encode_values, padded},
};
use crate::{
    dataset::{Dataset, Header},
    error::SplitResult,
    split::DatasetEncoder,
};
use tracing::{debug, instrument};

/// Encodes datasets as netCDF classic files, refusing any whose
/// encoding would exceed `max_buffer_size` bytes.
#[derive(Clone, Copy, Debug)]
pub struct ClassicEncoder {
    pub max_buffer_size: u64,
}

impl DatasetEncoder for ClassicEncoder {
    fn encode(&self, dataset: &Dataset) -> SplitResult<Vec<u8>> {
        Ok(encode(dataset, self.max_buffer_size)?)
    }
}

/// The header and data layout for a dataset, and the total size of its encoding.
struct Plan {
    file_header: FileHeader,
    total: u64,
}

fn validate(header: &Header) -> ClassicResult<()> {
    if header.dimensions.iter().filter(|d| d.unlimited).count() > 1 {
        return Err(ClassicError::MultipleUnlimited);
    }
    if let Some(dimension) = header
        .dimensions
        .iter()
        .find(|dimension| !dimension.unlimited && dimension.len == 0)
    {
        return Err(ClassicError::EmptyFixedDimension(dimension.name.clone()));
    }
    for variable in &header.variables {
        let misplaced = variable.dimensions.iter().skip(1).find(|name| {
            header
                .dimensions
                .iter()
                .any(|dimension| dimension.unlimited && &&dimension.name == name)
        });
        if let Some(dimension) = misplaced {
            return Err(ClassicError::UnlimitedNotLeading {
                dimension: dimension.clone(),
                variable: variable.name.clone(),
            });
        }
    }
    Ok(())
}

fn header_len(file_header: &FileHeader) -> u64 {
    let mut bytes = Vec::new();
    file_header.encode(&mut bytes);
    bytes.len() as u64
}

/// Assigns each variable its offset, fixed variables first then the record section.
/// Returns the total length of the file.
fn assign_offsets(file_header: &mut FileHeader) -> u64 {
    let record_size = file_header.record_size();
    let mut offset = header_len(file_header);
    let header = &file_header.header;
    for (variable, layout) in header.variables.iter().zip(&mut file_header.layouts) {
        if !layout.record {
            layout.begin = offset;
            offset += padded(layout.data_bytes(variable.data_type)) as u64;
        }
    }
    let mut record_offset = offset;
    for (variable, layout) in header.variables.iter().zip(&mut file_header.layouts) {
        if layout.record {
            layout.begin = record_offset;
            record_offset += padded(layout.data_bytes(variable.data_type)) as u64;
        }
    }
    offset + file_header.numrecs as u64 * record_size
}

fn plan(dataset: &Dataset) -> ClassicResult<Plan> {
    let header = dataset.header().clone();
    validate(&header)?;
    let numrecs = header.unlimited_dimension().map_or(0, |d| d.len);
    let layouts = dataset
        .variables()
        .map(|(variable, values)| VariableLayout {
            shape: values.shape().to_vec(),
            record: variable
                .dimensions
                .first()
                .and_then(|name| header.dimension(name).ok())
                .is_some_and(|dimension| dimension.unlimited),
            begin: 0,
        })
        .collect();
    let mut file_header = FileHeader {
        version: Version::Classic,
        numrecs,
        header,
        layouts,
    };
    let mut total = assign_offsets(&mut file_header);
    if total > i32::MAX as u64 {
        file_header.version = Version::Offset64;
        total = assign_offsets(&mut file_header);
    }
    Ok(Plan { file_header, total })
}

/// Number of bytes `dataset` occupies when encoded.
pub fn encoded_len(dataset: &Dataset) -> ClassicResult<u64> {
    Ok(plan(dataset)?.total)
}

/// Encodes `dataset` as a netCDF classic file held in memory.
/// Fails before allocating if the encoding would exceed `limit` bytes.
#[instrument(skip(dataset))]
pub fn encode(dataset: &Dataset, limit: u64) -> ClassicResult<Vec<u8>> {
    let Plan { file_header, total } = plan(dataset)?;
    if total > limit {
        return Err(ClassicError::BufferOverflow {
            required: total,
            limit,
        });
    }
    debug!("Encoding {} file of {total} bytes", file_header.version);

    let mut out = Vec::with_capacity(total as usize);
    file_header.encode(&mut out);

    let mut records = Vec::new();
    for ((_, values), layout) in dataset.variables().zip(&file_header.layouts) {
        if layout.record {
            records.push(values);
        } else {
            let start = out.len();
            encode_values(values, &mut out);
            encode_padding(out.len() - start, &mut out);
        }
    }

    let pad_records = records.len() > 1;
    for record in 0..file_header.numrecs {
        for values in &records {
            let start = out.len();
            encode_values(&values.slice_axis(0, record..record + 1)?, &mut out);
            if pad_records {
                encode_padding(out.len() - start, &mut out);
            }
        }
    }
    Ok(out)
}
