use super::{Rebase, ScanPointMap, SliceSchema};
use crate::{
    dataset::{Dataset, DatasetSource, Dimension, Values},
    error::{SplitError, SplitResult},
    signal::CrossingRange,
};
use cdf_split_common::{PointIndex, ScanIndex};
use std::ops::Range;
use tracing::{debug, instrument, trace};

/// The scans of a crossing range together with the points holding their payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceWindow {
    pub scans: Range<ScanIndex>,
    pub points: Range<PointIndex>,
}

impl SliceWindow {
    pub fn new(range: &CrossingRange, map: &ScanPointMap) -> SplitResult<Self> {
        let scans = range.start..range.end;
        let points = map.point_span(scans.clone())?;
        Ok(Self { scans, points })
    }

    fn rebase(&self, name: &str, values: Values, rebase: Rebase) -> SplitResult<Values> {
        let origin = match rebase {
            Rebase::Identity => return Ok(values),
            Rebase::ByStartPoint => self.points.start,
            Rebase::ByStartScan => self.scans.start,
        };
        values
            .shifted(origin as i64)
            .map_err(|error| SplitError::Rebase {
                name: name.to_owned(),
                error,
            })
    }
}

/// Reads `range` along `axis` of the named variable, reading only the
/// requested part when the axis is the leading one.
fn read_axis<S: DatasetSource>(
    source: &mut S,
    name: &str,
    axis: usize,
    range: Range<usize>,
) -> SplitResult<Values> {
    if axis == 0 {
        source.read_leading(name, range)
    } else {
        Ok(source.read(name)?.slice_axis(axis, range)?)
    }
}

/// Builds the sub-dataset of `source` covering the scans and points of `window`.
///
/// Global attributes and dimensions are copied, with the scan and point
/// dimensions resized to the window. Variables keep their type, dimensions
/// and attributes; their data is cut to the window along the scan and point
/// axes, and scan-indexed variables are re-based as the schema declares.
#[instrument(skip_all, fields(scans = ?window.scans, points = ?window.points))]
pub fn slice_dataset<S: DatasetSource>(
    source: &mut S,
    schema: &SliceSchema,
    window: &SliceWindow,
) -> SplitResult<Dataset> {
    let header = source.header().clone();
    let mut dataset = Dataset::default();

    for attribute in header.attributes {
        dataset.add_attribute(attribute);
    }

    for dimension in header.dimensions {
        let len = if dimension.name == schema.scan_dimension {
            window.scans.len()
        } else if dimension.name == schema.point_dimension {
            window.points.len()
        } else {
            dimension.len
        };
        dataset.add_dimension(Dimension { len, ..dimension });
    }

    for variable in header.variables {
        let name = variable.name.as_str();
        let scan_axis = variable.axis_of(&schema.scan_dimension);
        let point_axis = variable.axis_of(&schema.point_dimension);

        let mut values = match (scan_axis, point_axis) {
            (Some(axis), _) => read_axis(source, name, axis, window.scans.clone())?,
            (None, Some(axis)) => read_axis(source, name, axis, window.points.clone())?,
            (None, None) => source.read(name)?,
        };
        if let (Some(_), Some(axis)) = (scan_axis, point_axis) {
            values = values.slice_axis(axis, window.points.clone())?;
        }
        if scan_axis.is_some() {
            values = window.rebase(name, values, schema.rebase_of(name))?;
        }
        trace!("Sliced {name} to shape {:?}", values.shape());
        dataset.push_variable(variable, values)?;
    }

    debug!(
        "Built sub-dataset with {} variables",
        dataset.variables().count()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Attribute, DataType};
    use ndarray::{arr1, arr2};

    /// Five scans of two points each, with a per-scan char label and a mass axis.
    fn source() -> Dataset {
        let mut dataset = Dataset::default();
        dataset
            .add_dimension(Dimension::fixed("scan_number", 5))
            .add_dimension(Dimension::fixed("point_number", 10))
            .add_dimension(Dimension::fixed("_2_byte_string", 2))
            .add_dimension(Dimension::fixed("instrument_number", 1))
            .add_attribute(Attribute::text("dataset_origin", "bench"))
            .add_attribute(Attribute::new(
                "netcdf_revision",
                Values::Int(arr1(&[2]).into_dyn()),
            ));
        dataset
            .add_variable(
                "scan_index",
                &["scan_number"],
                vec![],
                Values::Int(arr1(&[0, 2, 4, 6, 8]).into_dyn()),
            )
            .unwrap()
            .add_variable(
                "actual_scan_number",
                &["scan_number"],
                vec![],
                Values::Int(arr1(&[0, 1, 2, 3, 4]).into_dyn()),
            )
            .unwrap()
            .add_variable(
                "total_intensity",
                &["scan_number"],
                vec![Attribute::text("units", "Total Counts")],
                Values::Double(arr1(&[1.0, 9.0, 9.0, 1.0, 1.0]).into_dyn()),
            )
            .unwrap()
            .add_variable(
                "scan_label",
                &["scan_number", "_2_byte_string"],
                vec![],
                Values::Char(
                    arr2(&[*b"s0", *b"s1", *b"s2", *b"s3", *b"s4"]).into_dyn(),
                ),
            )
            .unwrap()
            .add_variable(
                "mass_values",
                &["point_number"],
                vec![],
                Values::Float(
                    arr1(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]).into_dyn(),
                ),
            )
            .unwrap()
            .add_variable(
                "instrument_name",
                &["instrument_number"],
                vec![],
                Values::Short(arr1(&[42]).into_dyn()),
            )
            .unwrap();
        dataset
    }

    fn window(dataset: &mut Dataset, start: usize, end: usize) -> SliceWindow {
        let schema = SliceSchema::default();
        let map = ScanPointMap::from_source(dataset, &schema).unwrap();
        SliceWindow::new(&CrossingRange { start, end }, &map).unwrap()
    }

    #[test]
    fn slice_interior_range() {
        let mut source = source();
        let window = window(&mut source, 1, 3);
        assert_eq!(window.points, 2..6);

        let sliced = slice_dataset(&mut source, &SliceSchema::default(), &window).unwrap();
        let header = sliced.header();
        assert_eq!(header.attributes, source.header().attributes);
        assert_eq!(header.dimension("scan_number").unwrap().len, 2);
        assert_eq!(header.dimension("point_number").unwrap().len, 4);
        assert_eq!(header.dimension("_2_byte_string").unwrap().len, 2);

        assert_eq!(
            sliced.values("scan_index").unwrap().to_indices(),
            Some(vec![0, 2])
        );
        assert_eq!(
            sliced.values("actual_scan_number").unwrap().to_indices(),
            Some(vec![0, 1])
        );
        assert_eq!(
            sliced.values("total_intensity").unwrap().to_reals(),
            Some(vec![9.0, 9.0])
        );
        assert_eq!(
            sliced.values("scan_label").unwrap(),
            &Values::Char(arr2(&[*b"s1", *b"s2"]).into_dyn())
        );
        assert_eq!(
            sliced.values("mass_values").unwrap().to_reals(),
            Some(vec![2.0, 3.0, 4.0, 5.0])
        );
        assert_eq!(
            sliced.values("instrument_name").unwrap(),
            source.values("instrument_name").unwrap()
        );
        assert_eq!(
            header.variable("total_intensity").unwrap().attributes,
            vec![Attribute::text("units", "Total Counts")]
        );
    }

    #[test]
    fn slice_to_last_scan() {
        let mut source = source();
        let window = window(&mut source, 3, 5);
        assert_eq!(window.points, 6..10);
        let sliced = slice_dataset(&mut source, &SliceSchema::default(), &window).unwrap();
        assert_eq!(sliced.header().dimension("point_number").unwrap().len, 4);
        assert_eq!(
            sliced.values("mass_values").unwrap().to_reals(),
            Some(vec![6.0, 7.0, 8.0, 9.0])
        );
    }

    #[test]
    fn unlimited_scan_dimension_stays_unlimited() {
        let mut source = Dataset::default();
        source
            .add_dimension(Dimension::unlimited("scan_number", 4))
            .add_dimension(Dimension::fixed("point_number", 4));
        source
            .add_variable(
                "scan_index",
                &["scan_number"],
                vec![],
                Values::Short(arr1(&[0, 1, 2, 3]).into_dyn()),
            )
            .unwrap();
        let window = window(&mut source, 1, 3);
        let sliced = slice_dataset(&mut source, &SliceSchema::default(), &window).unwrap();
        let scans = sliced.header().dimension("scan_number").unwrap();
        assert!(scans.unlimited);
        assert_eq!(scans.len, 2);
        assert_eq!(
            sliced.values("scan_index").unwrap().to_indices(),
            Some(vec![0, 1])
        );
    }

    #[test]
    fn rebasing_char_variable_fails() {
        let mut source = source();
        let window = window(&mut source, 1, 3);
        let schema = SliceSchema {
            rebase: vec![("scan_label".to_owned(), Rebase::ByStartScan)],
            ..SliceSchema::default()
        };
        let result = slice_dataset(&mut source, &schema, &window);
        assert!(matches!(
            result,
            Err(SplitError::Rebase { name, .. }) if name == "scan_label"
        ));
    }

    #[test]
    fn variable_on_both_axes() {
        let mut source = Dataset::default();
        source
            .add_dimension(Dimension::fixed("scan_number", 2))
            .add_dimension(Dimension::fixed("point_number", 3));
        source
            .add_variable(
                "scan_index",
                &["scan_number"],
                vec![],
                Values::Int(arr1(&[0, 1]).into_dyn()),
            )
            .unwrap()
            .add_variable(
                "grid",
                &["scan_number", "point_number"],
                vec![],
                Values::Int(arr2(&[[1, 2, 3], [4, 5, 6]]).into_dyn()),
            )
            .unwrap();
        let window = window(&mut source, 0, 1);
        let sliced = slice_dataset(&mut source, &SliceSchema::default(), &window).unwrap();
        let grid = sliced.values("grid").unwrap();
        assert_eq!(grid.data_type(), DataType::Int);
        assert_eq!(grid.shape(), &[1, 1]);
        assert_eq!(grid.to_indices(), Some(vec![1]));
    }
}
