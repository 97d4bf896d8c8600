use cdf_split_common::Real;

/// A trace in which each sample is either a value or undefined.
pub type SmoothedTrace = Vec<Option<Real>>;

/// Centred rolling mean. Samples near either end of the trace are averaged
/// over the part of the window which lies within the trace, and non-finite
/// samples are ignored.
#[derive(Default, Clone, Debug)]
pub struct SmoothingWindow {
    half_width: usize,
}

impl SmoothingWindow {
    /// Even sizes are rounded up to the next odd size, a size of zero behaves as one.
    pub fn new(size: usize) -> Self {
        SmoothingWindow {
            half_width: size / 2,
        }
    }

    pub fn size(&self) -> usize {
        2 * self.half_width + 1
    }

    fn mean(window: &[Real]) -> Option<Real> {
        let (sum, count) = window
            .iter()
            .filter(|value| value.is_finite())
            .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
        (count > 0).then(|| sum / count as Real)
    }

    pub fn apply(&self, trace: &[Real]) -> SmoothedTrace {
        (0..trace.len())
            .map(|i| {
                let start = i.saturating_sub(self.half_width);
                let end = (i + self.half_width + 1).min(trace.len());
                trace.get(start..end).and_then(Self::mean)
            })
            .collect()
    }
}
