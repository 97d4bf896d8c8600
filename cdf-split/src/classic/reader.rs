use super::{
    error::{ClassicError, ClassicResult},
    header::{FileHeader, Version, VariableLayout},
    xdr::decode_values,
};
use crate::{
    dataset::{DatasetSource, Header, Values, ValuesError, Variable},
    error::{SplitError, SplitResult},
};
use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    ops::Range,
    path::Path,
};
use tracing::{debug, trace};

/// Reads a netCDF classic file. The header is decoded on construction,
/// variable data is only read when requested.
pub struct ClassicReader<R = BufReader<File>> {
    source: R,
    file_header: FileHeader,
    record_size: u64,
}

impl ClassicReader {
    pub fn open(path: &Path) -> ClassicResult<Self> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> ClassicReader<R> {
    pub fn new(mut source: R) -> ClassicResult<Self> {
        source.seek(SeekFrom::Start(0))?;
        let file_header = FileHeader::load(&mut source)?;
        let record_size = file_header.record_size();
        debug!(
            "Loaded {} header: {} dimensions, {} variables, {} records",
            file_header.version,
            file_header.header.dimensions.len(),
            file_header.header.variables.len(),
            file_header.numrecs
        );
        Ok(Self {
            source,
            file_header,
            record_size,
        })
    }

    pub fn version(&self) -> Version {
        self.file_header.version
    }

    fn locate(&self, name: &str) -> SplitResult<(Variable, VariableLayout)> {
        let header = &self.file_header.header;
        header
            .variables
            .iter()
            .position(|variable| variable.name == name)
            .and_then(|index| {
                Some((
                    header.variables.get(index)?.clone(),
                    self.file_header.layouts.get(index)?.clone(),
                ))
            })
            .ok_or_else(|| SplitError::MissingVariable(name.to_owned()))
    }

    fn load_at(&mut self, variable: &str, offset: u64, len: usize, out: &mut Vec<u8>) -> ClassicResult<()> {
        self.source.seek(SeekFrom::Start(offset))?;
        let found = (&mut self.source).take(len as u64).read_to_end(out)?;
        if found != len {
            return Err(ClassicError::DataLength {
                variable: variable.to_owned(),
                expected: len,
                found,
            });
        }
        Ok(())
    }

    fn load_leading(
        &mut self,
        variable: &Variable,
        layout: &VariableLayout,
        range: Range<usize>,
    ) -> ClassicResult<Values> {
        let slab = layout.slab_bytes(variable.data_type);
        let mut bytes = Vec::new();
        if layout.record {
            for record in range.clone() {
                let offset = layout.begin + record as u64 * self.record_size;
                self.load_at(&variable.name, offset, slab, &mut bytes)?;
            }
        } else {
            let offset = layout.begin + (range.start * slab) as u64;
            self.load_at(&variable.name, offset, range.len() * slab, &mut bytes)?;
        }
        let mut shape = layout.shape.clone();
        if let Some(leading) = shape.first_mut() {
            *leading = range.len();
        }
        decode_values(variable.data_type, &shape, &bytes)
    }
}

impl<R: Read + Seek> DatasetSource for ClassicReader<R> {
    fn header(&self) -> &Header {
        &self.file_header.header
    }

    fn read(&mut self, name: &str) -> SplitResult<Values> {
        let (variable, layout) = self.locate(name)?;
        trace!("Reading variable {name} with shape {:?}", layout.shape);
        let values = match layout.shape.first() {
            Some(&len) => self.load_leading(&variable, &layout, 0..len)?,
            None => {
                let mut bytes = Vec::new();
                let len = variable.data_type.size();
                self.load_at(name, layout.begin, len, &mut bytes)?;
                decode_values(variable.data_type, &[], &bytes)?
            }
        };
        Ok(values)
    }

    fn read_leading(&mut self, name: &str, range: Range<usize>) -> SplitResult<Values> {
        let (variable, layout) = self.locate(name)?;
        let len = *layout
            .shape
            .first()
            .ok_or_else(|| ClassicError::NoLeadingAxis(name.to_owned()))?;
        if range.start > range.end || range.end > len {
            return Err(ValuesError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len,
            }
            .into());
        }
        trace!("Reading variable {name} over leading range {range:?}");
        Ok(self.load_leading(&variable, &layout, range)?)
    }
}
