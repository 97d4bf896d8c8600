//! In-memory model of a self-describing scientific dataset: named dimensions,
//! global attributes, and typed n-dimensional variables which each carry their
//! own attributes. The model follows the netCDF classic data model.
mod values;

use crate::error::{SplitError, SplitResult};
use std::ops::Range;
use tracing::trace;

pub(crate) use values::with_values;
pub use values::{DataType, Values, ValuesError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    /// Current length; for the unlimited dimension this is the number of records.
    pub len: usize,
    pub unlimited: bool,
}

impl Dimension {
    pub fn fixed(name: &str, len: usize) -> Self {
        Self {
            name: name.to_owned(),
            len,
            unlimited: false,
        }
    }

    pub fn unlimited(name: &str, len: usize) -> Self {
        Self {
            name: name.to_owned(),
            len,
            unlimited: true,
        }
    }
}

/// A named, one-dimensional typed array attached to a dataset or variable.
#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub values: Values,
}

impl Attribute {
    pub fn new(name: &str, values: Values) -> Self {
        Self {
            name: name.to_owned(),
            values,
        }
    }

    pub fn text(name: &str, text: &str) -> Self {
        Self::new(name, Values::text(text))
    }
}

/// Everything about a variable except its data.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub name: String,
    pub data_type: DataType,
    /// Names of the dimensions, outermost first.
    pub dimensions: Vec<String>,
    pub attributes: Vec<Attribute>,
}

impl Variable {
    /// Position of the named dimension among this variable's axes.
    pub fn axis_of(&self, dimension: &str) -> Option<usize> {
        self.dimensions.iter().position(|name| name == dimension)
    }

    pub fn depends_on(&self, dimension: &str) -> bool {
        self.axis_of(dimension).is_some()
    }
}

/// The schema of a dataset: dimensions, global attributes and variable descriptions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    pub dimensions: Vec<Dimension>,
    pub attributes: Vec<Attribute>,
    pub variables: Vec<Variable>,
}

impl Header {
    pub fn dimension(&self, name: &str) -> SplitResult<&Dimension> {
        self.dimensions
            .iter()
            .find(|dimension| dimension.name == name)
            .ok_or_else(|| SplitError::MissingDimension(name.to_owned()))
    }

    pub fn variable(&self, name: &str) -> SplitResult<&Variable> {
        self.variables
            .iter()
            .find(|variable| variable.name == name)
            .ok_or_else(|| SplitError::MissingVariable(name.to_owned()))
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// The unlimited dimension, if there is one.
    pub fn unlimited_dimension(&self) -> Option<&Dimension> {
        self.dimensions.iter().find(|dimension| dimension.unlimited)
    }

    /// Lengths of the variable's dimensions, outermost first.
    pub fn shape_of(&self, variable: &Variable) -> SplitResult<Vec<usize>> {
        variable
            .dimensions
            .iter()
            .map(|name| self.dimension(name).map(|dimension| dimension.len))
            .collect()
    }
}

/// Read access to a dataset. Implemented by the in-memory [Dataset] and by
/// file readers, which may load variable data lazily.
pub trait DatasetSource {
    fn header(&self) -> &Header;

    /// Reads all values of the named variable.
    fn read(&mut self, name: &str) -> SplitResult<Values>;

    /// Reads the values of the named variable whose index along the leading
    /// axis lies in `range`.
    fn read_leading(&mut self, name: &str, range: Range<usize>) -> SplitResult<Values> {
        Ok(self.read(name)?.slice_axis(0, range)?)
    }
}

/// A dataset held fully in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    header: Header,
    /// Data of each variable, in the same order as `header.variables`.
    values: Vec<Values>,
}

impl Dataset {
    pub fn add_dimension(&mut self, dimension: Dimension) -> &mut Self {
        self.header.dimensions.push(dimension);
        self
    }

    pub fn add_attribute(&mut self, attribute: Attribute) -> &mut Self {
        self.header.attributes.push(attribute);
        self
    }

    /// Adds a variable, checking its values against the dimensions it names.
    pub fn add_variable(
        &mut self,
        name: &str,
        dimensions: &[&str],
        attributes: Vec<Attribute>,
        values: Values,
    ) -> SplitResult<&mut Self> {
        let variable = Variable {
            name: name.to_owned(),
            data_type: values.data_type(),
            dimensions: dimensions.iter().map(ToString::to_string).collect(),
            attributes,
        };
        self.push_variable(variable, values)?;
        Ok(self)
    }

    pub(crate) fn push_variable(&mut self, variable: Variable, values: Values) -> SplitResult<()> {
        let expected = self.header.shape_of(&variable)?;
        if expected != values.shape() || variable.data_type != values.data_type() {
            return Err(SplitError::ShapeMismatch {
                name: variable.name,
                expected,
                found: values.shape().to_vec(),
            });
        }
        trace!("Adding variable {} with shape {expected:?}", variable.name);
        self.header.variables.push(variable);
        self.values.push(values);
        Ok(())
    }

    pub fn values(&self, name: &str) -> SplitResult<&Values> {
        self.header
            .variables
            .iter()
            .position(|variable| variable.name == name)
            .and_then(|index| self.values.get(index))
            .ok_or_else(|| SplitError::MissingVariable(name.to_owned()))
    }

    /// Iterates over each variable description paired with its data.
    pub fn variables(&self) -> impl Iterator<Item = (&Variable, &Values)> {
        self.header.variables.iter().zip(self.values.iter())
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
}

impl DatasetSource for Dataset {
    fn header(&self) -> &Header {
        &self.header
    }

    fn read(&mut self, name: &str) -> SplitResult<Values> {
        self.values(name).cloned()
    }
}
