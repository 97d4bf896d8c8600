use super::SliceSchema;
use crate::{
    dataset::DatasetSource,
    error::{SplitError, SplitResult},
};
use cdf_split_common::{PointIndex, ScanIndex};
use std::ops::Range;
use tracing::trace;

/// Maps scan ranges to the ranges of the point axis holding their payload.
///
/// The payload of scan `i` spans `offsets[i]..offsets[i + 1]`, with the
/// payload of the last scan running to the end of the point axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanPointMap {
    offsets: Vec<i64>,
    point_count: usize,
}

impl ScanPointMap {
    pub fn new(offsets: Vec<i64>, point_count: usize) -> Self {
        Self {
            offsets,
            point_count,
        }
    }

    /// Loads the offset variable and point axis length named by `schema`.
    pub fn from_source<S: DatasetSource>(source: &mut S, schema: &SliceSchema) -> SplitResult<Self> {
        let point_count = source.header().dimension(&schema.point_dimension)?.len;
        let values = source.read(&schema.offset_variable)?;
        let offsets = values
            .to_indices()
            .ok_or_else(|| SplitError::UnsupportedVariableType {
                name: schema.offset_variable.clone(),
                data_type: values.data_type(),
            })?;
        Ok(Self::new(offsets, point_count))
    }

    pub fn scan_count(&self) -> usize {
        self.offsets.len()
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    /// Start of the payload of `scan`, where `scan` may be one past the last scan.
    fn boundary(&self, scan: ScanIndex) -> SplitResult<PointIndex> {
        let offset = match self.offsets.get(scan) {
            Some(&offset) => offset,
            None => return Ok(self.point_count),
        };
        usize::try_from(offset)
            .ok()
            .filter(|&point| point <= self.point_count)
            .ok_or(SplitError::InconsistentPointOffsets {
                scan,
                offset,
                point_count: self.point_count,
            })
    }

    /// The range of points holding the payload of the given scans.
    /// Fails if the offsets within the range are out of bounds or decreasing.
    pub fn point_span(&self, scans: Range<ScanIndex>) -> SplitResult<Range<PointIndex>> {
        if scans.start > scans.end || scans.end > self.scan_count() {
            return Err(SplitError::ScanRangeOutOfBounds {
                start: scans.start,
                end: scans.end,
                scan_count: self.scan_count(),
            });
        }
        let start = self.boundary(scans.start)?;
        let mut previous = start;
        for scan in scans.start + 1..=scans.end {
            let point = self.boundary(scan)?;
            if point < previous {
                return Err(SplitError::InconsistentPointOffsets {
                    scan,
                    offset: point as i64,
                    point_count: self.point_count,
                });
            }
            previous = point;
        }
        let span = start..previous;
        trace!("Scans {scans:?} map to points {span:?}");
        Ok(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> ScanPointMap {
        ScanPointMap::new(vec![0, 2, 4, 4, 7], 10)
    }

    #[test]
    fn interior_span() {
        assert_eq!(map().point_span(1..3).unwrap(), 2..4);
    }

    #[test]
    fn span_to_end_of_point_axis() {
        assert_eq!(map().point_span(3..5).unwrap(), 4..10);
    }

    #[test]
    fn empty_scan_payload() {
        assert_eq!(map().point_span(2..3).unwrap(), 4..4);
    }

    #[test]
    fn scan_range_out_of_bounds() {
        assert!(matches!(
            map().point_span(2..6),
            Err(SplitError::ScanRangeOutOfBounds { scan_count: 5, .. })
        ));
    }

    #[test]
    fn decreasing_offsets() {
        let map = ScanPointMap::new(vec![0, 5, 3, 8], 10);
        assert!(matches!(
            map.point_span(0..3),
            Err(SplitError::InconsistentPointOffsets { scan: 2, offset: 3, .. })
        ));
        assert_eq!(map.point_span(2..4).unwrap(), 3..10);
    }

    #[test]
    fn negative_offset() {
        let map = ScanPointMap::new(vec![-1, 5], 10);
        assert!(matches!(
            map.point_span(0..1),
            Err(SplitError::InconsistentPointOffsets { scan: 0, offset: -1, .. })
        ));
    }

    #[test]
    fn offset_beyond_point_axis() {
        let map = ScanPointMap::new(vec![0, 11], 10);
        assert!(matches!(
            map.point_span(0..1),
            Err(SplitError::InconsistentPointOffsets {
                scan: 1,
                offset: 11,
                point_count: 10
            })
        ));
    }
}
