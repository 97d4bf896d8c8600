use crate::{
    error::{SplitError, SplitResult},
    split::TraceAnalysis,
};
use cdf_split_common::Real;
use itertools::{Itertools, MinMaxResult};
use plotters::{
    chart::ChartBuilder,
    element::{Circle, Rectangle},
    prelude::{BitMapBackend, IntoDrawingArea},
    series::{LineSeries, PointSeries},
    style::{BLACK, BLUE, Color, GREEN, RED, RGBColor, ShapeStyle, WHITE},
};
use std::{fmt::Display, ops::Range, path::Path};
use tracing::{debug, instrument};

const GREY: RGBColor = RGBColor(128, 128, 128);

/// Renders an analysed trace to an image file.
pub trait TracePlotter {
    fn plot(&self, analysis: &TraceAnalysis, path: &Path) -> SplitResult<()>;
}

/// Draws the raw trace, the smoothed trace, the threshold and the
/// range boundaries to a PNG. No text is drawn.
#[derive(Clone, Debug)]
pub struct PngPlotter {
    pub size: (u32, u32),
}

impl Default for PngPlotter {
    fn default() -> Self {
        Self { size: (1500, 900) }
    }
}

fn plot_error<E: Display>(error: E) -> SplitError {
    SplitError::Plot(error.to_string())
}

/// Range spanned by the finite values, widened when it would be empty.
fn bounds(values: impl Iterator<Item = Real>) -> Range<Real> {
    match values.filter(|value| value.is_finite()).minmax_by(Real::total_cmp) {
        MinMaxResult::NoElements => 0.0..1.0,
        MinMaxResult::OneElement(value) => value - 1.0..value + 1.0,
        MinMaxResult::MinMax(min, max) if min == max => min - 1.0..max + 1.0,
        MinMaxResult::MinMax(min, max) => min..max,
    }
}

impl TracePlotter for PngPlotter {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn plot(&self, analysis: &TraceAnalysis, path: &Path) -> SplitResult<()> {
        let times = &analysis.times;
        let time_bounds = bounds(times.iter().copied());
        let intensity_bounds = bounds(
            analysis
                .intensity
                .iter()
                .copied()
                .chain(std::iter::once(analysis.threshold)),
        );

        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .build_cartesian_2d(time_bounds.clone(), intensity_bounds.clone())
            .map_err(plot_error)?;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [
                    (time_bounds.start, intensity_bounds.start),
                    (time_bounds.end, intensity_bounds.end),
                ],
                BLACK,
            )))
            .map_err(plot_error)?;

        let raw = || times.iter().copied().zip(analysis.intensity.iter().copied());
        chart
            .draw_series(LineSeries::new(raw(), GREY))
            .map_err(plot_error)?;
        let points: PointSeries<_, _, Circle<_, _>, _> =
            PointSeries::new(raw(), 1, ShapeStyle::from(GREY.mix(0.5)).filled());
        chart.draw_series(points).map_err(plot_error)?;

        let smoothed = times
            .iter()
            .zip(&analysis.smoothed)
            .filter_map(|(&time, value)| value.map(|value| (time, value)));
        chart
            .draw_series(LineSeries::new(smoothed, BLUE.mix(0.5)))
            .map_err(plot_error)?;

        chart
            .draw_series(LineSeries::new(
                [
                    (time_bounds.start, analysis.threshold),
                    (time_bounds.end, analysis.threshold),
                ],
                BLACK,
            ))
            .map_err(plot_error)?;

        let vertical = |scan: usize| {
            times.get(scan).map(|&time| {
                [
                    (time, intensity_bounds.start),
                    (time, intensity_bounds.end),
                ]
            })
        };
        for range in &analysis.ranges {
            if let Some(line) = vertical(range.start) {
                chart
                    .draw_series(LineSeries::new(line, GREEN.mix(0.5)))
                    .map_err(plot_error)?;
            }
            if let Some(line) = vertical(range.end) {
                chart
                    .draw_series(LineSeries::new(line, RED.mix(0.5)))
                    .map_err(plot_error)?;
            }
        }

        root.present().map_err(plot_error)?;
        debug!("Plotted {} samples", times.len());
        Ok(())
    }
}
