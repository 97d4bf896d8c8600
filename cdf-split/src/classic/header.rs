use super::{
    error::{ClassicError, ClassicResult},
    xdr::{self, decode_values, encode_padding, encode_values, padded, padding},
};
use crate::dataset::{Attribute, DataType, Dimension, Header, Variable};
use std::io::Read;

const ABSENT: u32 = 0x00;
const NC_DIMENSION: u32 = 0x0A;
const NC_VARIABLE: u32 = 0x0B;
const NC_ATTRIBUTE: u32 = 0x0C;
const STREAMING: u32 = 0xFFFF_FFFF;

/// The two netCDF classic variants that share a header layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum Version {
    /// CDF-1, 32-bit variable offsets.
    #[strum(to_string = "classic")]
    Classic,
    /// CDF-2, 64-bit variable offsets.
    #[strum(to_string = "64-bit offset")]
    Offset64,
}

impl Version {
    pub(super) fn magic(self) -> [u8; 4] {
        match self {
            Version::Classic => *b"CDF\x01",
            Version::Offset64 => *b"CDF\x02",
        }
    }

    fn from_magic(magic: [u8; 4]) -> ClassicResult<Self> {
        match &magic {
            b"CDF\x01" => Ok(Version::Classic),
            b"CDF\x02" => Ok(Version::Offset64),
            _ => Err(ClassicError::UnsupportedFormat(magic)),
        }
    }
}

/// Where, and how, the data of a variable is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct VariableLayout {
    /// Lengths of the variable's dimensions; the leading one is the record count for record variables.
    pub(super) shape: Vec<usize>,
    /// Whether the leading dimension is the unlimited dimension.
    pub(super) record: bool,
    pub(super) begin: u64,
}

impl VariableLayout {
    /// Bytes occupied by one index along the leading axis.
    pub(super) fn slab_bytes(&self, data_type: DataType) -> usize {
        self.shape.iter().skip(1).product::<usize>() * data_type.size()
    }

    /// Bytes of data in the file for a fixed variable, or in one record for a record variable.
    pub(super) fn data_bytes(&self, data_type: DataType) -> usize {
        if self.record {
            self.slab_bytes(data_type)
        } else {
            self.shape.iter().product::<usize>() * data_type.size()
        }
    }
}

/// The decoded header of a netCDF classic file, together with the data layout.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct FileHeader {
    pub(super) version: Version,
    pub(super) numrecs: usize,
    pub(super) header: Header,
    /// One per variable, in the order of `header.variables`.
    pub(super) layouts: Vec<VariableLayout>,
}

impl FileHeader {
    /// Distance between the starts of consecutive records.
    pub(super) fn record_size(&self) -> u64 {
        let record_vars: Vec<_> = self
            .header
            .variables
            .iter()
            .zip(&self.layouts)
            .filter(|(_, layout)| layout.record)
            .collect();
        match record_vars.as_slice() {
            // A lone record variable is stored without padding between records.
            [(variable, layout)] => layout.data_bytes(variable.data_type) as u64,
            _ => record_vars
                .iter()
                .map(|(variable, layout)| padded(layout.data_bytes(variable.data_type)) as u64)
                .sum(),
        }
    }

    pub(super) fn load<R: Read>(source: &mut R) -> ClassicResult<Self> {
        HeaderDecoder { source, offset: 0 }.load()
    }

    /// Appends the encoded header.
    pub(super) fn encode(&self, out: &mut Vec<u8>) {
        out.extend(self.version.magic());
        encode_u32(self.numrecs as u32, out);

        encode_list_tag(NC_DIMENSION, self.header.dimensions.len(), out);
        for dimension in &self.header.dimensions {
            encode_name(&dimension.name, out);
            encode_u32(if dimension.unlimited { 0 } else { dimension.len as u32 }, out);
        }

        encode_attributes(&self.header.attributes, out);

        encode_list_tag(NC_VARIABLE, self.header.variables.len(), out);
        for (variable, layout) in self.header.variables.iter().zip(&self.layouts) {
            encode_name(&variable.name, out);
            encode_u32(variable.dimensions.len() as u32, out);
            for name in &variable.dimensions {
                let id = self
                    .header
                    .dimensions
                    .iter()
                    .position(|dimension| &dimension.name == name)
                    .unwrap_or_default();
                encode_u32(id as u32, out);
            }
            encode_attributes(&variable.attributes, out);
            encode_u32(xdr::type_code(variable.data_type), out);
            let vsize = padded(layout.data_bytes(variable.data_type));
            encode_u32(u32::try_from(vsize).unwrap_or(u32::MAX), out);
            match self.version {
                Version::Classic => encode_u32(layout.begin as u32, out),
                Version::Offset64 => out.extend(layout.begin.to_be_bytes()),
            }
        }
    }
}

fn encode_u32(value: u32, out: &mut Vec<u8>) {
    out.extend(value.to_be_bytes());
}

fn encode_list_tag(tag: u32, len: usize, out: &mut Vec<u8>) {
    encode_u32(if len == 0 { ABSENT } else { tag }, out);
    encode_u32(len as u32, out);
}

fn encode_name(name: &str, out: &mut Vec<u8>) {
    encode_u32(name.len() as u32, out);
    out.extend(name.as_bytes());
    encode_padding(name.len(), out);
}

fn encode_attributes(attributes: &[Attribute], out: &mut Vec<u8>) {
    encode_list_tag(NC_ATTRIBUTE, attributes.len(), out);
    for attribute in attributes {
        encode_name(&attribute.name, out);
        encode_u32(xdr::type_code(attribute.values.data_type()), out);
        encode_u32(attribute.values.len() as u32, out);
        let start = out.len();
        encode_values(&attribute.values, out);
        encode_padding(out.len() - start, out);
    }
}

/// Reads header fields in order, keeping count of the bytes consumed
/// so that errors can report where the header went wrong.
struct HeaderDecoder<'a, R> {
    source: &'a mut R,
    offset: u64,
}

impl<R: Read> HeaderDecoder<'_, R> {
    fn malformed(&self, reason: impl Into<String>) -> ClassicError {
        ClassicError::MalformedHeader {
            offset: self.offset,
            reason: reason.into(),
        }
    }

    fn load_bytes(&mut self, len: usize) -> ClassicResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.source
            .by_ref()
            .take(len as u64)
            .read_to_end(&mut bytes)?;
        if bytes.len() != len {
            return Err(self.malformed("unexpected end of file"));
        }
        self.offset += len as u64;
        Ok(bytes)
    }

    fn load_array<const N: usize>(&mut self) -> ClassicResult<[u8; N]> {
        let mut buffer = [0u8; N];
        let bytes = self.load_bytes(N)?;
        buffer.copy_from_slice(&bytes);
        Ok(buffer)
    }

    fn load_u32(&mut self) -> ClassicResult<u32> {
        Ok(u32::from_be_bytes(self.load_array()?))
    }

    fn load_u64(&mut self) -> ClassicResult<u64> {
        Ok(u64::from_be_bytes(self.load_array()?))
    }

    /// Loads a non-negative 32-bit count.
    fn load_count(&mut self) -> ClassicResult<usize> {
        let count = self.load_u32()?;
        if count > i32::MAX as u32 {
            return Err(self.malformed(format!("negative count {}", count as i32)));
        }
        Ok(count as usize)
    }

    fn skip_padding(&mut self, len: usize) -> ClassicResult<()> {
        self.load_bytes(padding(len)).map(|_| ())
    }

    fn load_name(&mut self) -> ClassicResult<String> {
        let len = self.load_count()?;
        let bytes = self.load_bytes(len)?;
        self.skip_padding(len)?;
        String::from_utf8(bytes).map_err(|_| self.malformed("name is not valid UTF-8"))
    }

    /// Loads the tag and element count which open each header list.
    fn load_list_tag(&mut self, expected: u32) -> ClassicResult<usize> {
        let tag = self.load_u32()?;
        let count = self.load_count()?;
        match tag {
            ABSENT if count == 0 => Ok(0),
            tag if tag == expected => Ok(count),
            tag => Err(self.malformed(format!("expected list tag {expected:#x}, found {tag:#x}"))),
        }
    }

    fn load_attributes(&mut self) -> ClassicResult<Vec<Attribute>> {
        let count = self.load_list_tag(NC_ATTRIBUTE)?;
        (0..count)
            .map(|_| {
                let name = self.load_name()?;
                let data_type = xdr::data_type(self.load_u32()?)?;
                let len = self.load_count()?;
                let bytes = self.load_bytes(len * data_type.size())?;
                self.skip_padding(bytes.len())?;
                let values = decode_values(data_type, &[len], &bytes)?;
                Ok(Attribute { name, values })
            })
            .collect()
    }

    fn load_dimensions(&mut self, numrecs: usize) -> ClassicResult<Vec<Dimension>> {
        let count = self.load_list_tag(NC_DIMENSION)?;
        let dimensions = (0..count)
            .map(|_| {
                let name = self.load_name()?;
                Ok(match self.load_count()? {
                    0 => Dimension::unlimited(&name, numrecs),
                    len => Dimension::fixed(&name, len),
                })
            })
            .collect::<ClassicResult<Vec<_>>>()?;
        if dimensions.iter().filter(|dimension| dimension.unlimited).count() > 1 {
            return Err(ClassicError::MultipleUnlimited);
        }
        Ok(dimensions)
    }

    fn load_variable(
        &mut self,
        version: Version,
        dimensions: &[Dimension],
    ) -> ClassicResult<(Variable, VariableLayout)> {
        let name = self.load_name()?;
        let rank = self.load_count()?;
        let dimensions = (0..rank)
            .map(|_| {
                let id = self.load_count()?;
                dimensions
                    .get(id)
                    .ok_or_else(|| self.malformed(format!("variable {name} uses unknown dimension id {id}")))
            })
            .collect::<ClassicResult<Vec<_>>>()?;
        let attributes = self.load_attributes()?;
        let data_type = xdr::data_type(self.load_u32()?)?;
        let _vsize = self.load_u32()?;
        let begin = match version {
            Version::Classic => u64::from(self.load_u32()?),
            Version::Offset64 => self.load_u64()?,
        };

        if let Some(unlimited) = dimensions.iter().skip(1).find(|dimension| dimension.unlimited) {
            return Err(ClassicError::UnlimitedNotLeading {
                dimension: unlimited.name.clone(),
                variable: name,
            });
        }

        let layout = VariableLayout {
            shape: dimensions.iter().map(|dimension| dimension.len).collect(),
            record: dimensions.first().is_some_and(|dimension| dimension.unlimited),
            begin,
        };
        let variable = Variable {
            name,
            data_type,
            dimensions: dimensions
                .iter()
                .map(|dimension| dimension.name.clone())
                .collect(),
            attributes,
        };
        Ok((variable, layout))
    }

    fn load(mut self) -> ClassicResult<FileHeader> {
        let version = Version::from_magic(self.load_array()?)?;
        let numrecs = match self.load_u32()? {
            STREAMING => return Err(self.malformed("streaming record count is not supported")),
            numrecs => numrecs as usize,
        };
        let dimensions = self.load_dimensions(numrecs)?;
        let attributes = self.load_attributes()?;

        let count = self.load_list_tag(NC_VARIABLE)?;
        let (variables, layouts): (Vec<_>, Vec<_>) = (0..count)
            .map(|_| self.load_variable(version, &dimensions))
            .collect::<ClassicResult<Vec<_>>>()?
            .into_iter()
            .unzip();

        Ok(FileHeader {
            version,
            numrecs,
            header: Header {
                dimensions,
                attributes,
                variables,
            },
            layouts,
        })
    }
}
