use cdf_split_common::{Real, ScanIndex};
use std::fmt::Display;

/// Half-open interval `[start, end)` of scan indices over which the
/// smoothed trace rose above the noise threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CrossingRange {
    pub start: ScanIndex,
    pub end: ScanIndex,
}

impl CrossingRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Display for CrossingRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

fn above(value: Option<Real>, threshold: Real) -> Option<bool> {
    value.map(|value| value > threshold)
}

/// Iterates over the crossing ranges of a smoothed trace, in increasing order.
///
/// A range opens at an index whose value is at or below the threshold and
/// whose successor is above it, and closes at the next index whose value
/// is at or below the threshold while its predecessor is above it.
/// Undefined samples never take part in a crossing. A range still open at
/// the end of the trace is not reported.
#[derive(Clone, Debug)]
pub struct CrossingRanges<'a> {
    trace: &'a [Option<Real>],
    threshold: Real,
    position: usize,
}

impl<'a> CrossingRanges<'a> {
    pub fn new(trace: &'a [Option<Real>], threshold: Real) -> Self {
        Self {
            trace,
            threshold,
            position: 0,
        }
    }

    /// Whether the samples at `index` and `index + 1` are both defined and
    /// the first is above the threshold exactly when `rising` is false.
    fn crosses(&self, index: usize, rising: bool) -> bool {
        let pair = self.trace.get(index..index + 2);
        match pair {
            Some(&[before, after]) => {
                above(before, self.threshold) == Some(!rising)
                    && above(after, self.threshold) == Some(rising)
            }
            _ => false,
        }
    }
}

impl Iterator for CrossingRanges<'_> {
    type Item = CrossingRange;

    fn next(&mut self) -> Option<CrossingRange> {
        let len = self.trace.len();
        let start = (self.position..len).find(|&i| self.crosses(i, true));
        let Some(start) = start else {
            self.position = len;
            return None;
        };
        let end = (start + 1..len).find(|&j| self.crosses(j - 1, false));
        let Some(end) = end else {
            self.position = len;
            return None;
        };
        self.position = end + 1;
        Some(CrossingRange { start, end })
    }
}

/// Finds the crossing ranges of a smoothed trace.
pub trait CrossingRangeFilter {
    fn crossing_ranges(&self, threshold: Real) -> CrossingRanges<'_>;
}

impl CrossingRangeFilter for [Option<Real>] {
    fn crossing_ranges(&self, threshold: Real) -> CrossingRanges<'_> {
        CrossingRanges::new(self, threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn defined(data: &[Real]) -> Vec<Option<Real>> {
        data.iter().copied().map(Some).collect()
    }

    fn range(start: usize, end: usize) -> CrossingRange {
        CrossingRange { start, end }
    }

    #[test]
    fn zero_data() {
        let data: [Option<Real>; 0] = [];
        assert_eq!(data.crossing_ranges(1.0).next(), None);
    }

    #[test]
    fn all_below() {
        let data = defined(&[1.0, 2.0, 1.0, 2.0]);
        assert_eq!(data.crossing_ranges(2.0).count(), 0);
    }

    #[test]
    fn two_ranges() {
        let data = defined(&[1.0, 5.0, 6.0, 1.0, 1.0, 7.0, 1.0, 1.0]);
        let ranges: Vec<_> = data.crossing_ranges(2.0).collect();
        assert_eq!(ranges, vec![range(0, 3), range(4, 6)]);
    }

    #[test]
    fn trailing_range_is_dropped() {
        let data = defined(&[1.0, 5.0, 1.0, 1.0, 5.0, 5.0]);
        let ranges: Vec<_> = data.crossing_ranges(2.0).collect();
        assert_eq!(ranges, vec![range(0, 2)]);
    }

    #[test]
    fn range_may_end_on_last_sample() {
        let data = defined(&[1.0, 5.0, 1.0]);
        let ranges: Vec<_> = data.crossing_ranges(2.0).collect();
        assert_eq!(ranges, vec![range(0, 2)]);
    }

    #[test]
    fn leading_high_values_do_not_open_a_range() {
        let data = defined(&[5.0, 5.0, 1.0, 5.0, 1.0]);
        let ranges: Vec<_> = data.crossing_ranges(2.0).collect();
        assert_eq!(ranges, vec![range(2, 4)]);
    }

    #[test]
    fn scanning_resumes_after_end() {
        // The fall at index 2 is immediately followed by a rise, which is skipped.
        let data = defined(&[1.0, 5.0, 1.0, 5.0, 1.0, 1.0, 5.0, 1.0]);
        let ranges: Vec<_> = data.crossing_ranges(2.0).collect();
        assert_eq!(ranges, vec![range(0, 2), range(5, 7)]);
    }

    #[test]
    fn undefined_samples_never_cross() {
        let data = vec![None, Some(5.0), Some(1.0), Some(5.0), None, Some(1.0)];
        assert_eq!(data.crossing_ranges(2.0).count(), 0);
    }

    #[test]
    fn restartable() {
        let data = defined(&[1.0, 5.0, 1.0, 1.0, 5.0, 1.0]);
        let ranges = data.crossing_ranges(2.0);
        let first: Vec<_> = ranges.clone().collect();
        let second: Vec<_> = ranges.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn random_traces_satisfy_range_properties() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let len = rng.random_range(0..60);
            let data: Vec<Option<Real>> = (0..len)
                .map(|_| rng.random_bool(0.9).then(|| rng.random_range(0.0..10.0)))
                .collect();
            let threshold = 5.0;
            let mut previous_end = None;
            for CrossingRange { start, end } in data.crossing_ranges(threshold) {
                assert!(start < end && end < data.len());
                if let Some(previous_end) = previous_end {
                    assert!(start > previous_end);
                }
                assert!(data[start].unwrap() <= threshold);
                assert!(data[start + 1].unwrap() > threshold);
                assert!(data[end - 1].unwrap() > threshold);
                assert!(data[end].unwrap() <= threshold);
                previous_end = Some(end);
            }
        }
    }
}
