//! Runs the whole split: analyses the intensity trace of a source dataset,
//! then slices, encodes and archives one sub-dataset per crossing range.
use crate::{
    archive::{ArchiveSink, ZipArchive},
    classic::{ClassicEncoder, ClassicReader},
    dataset::{Dataset, DatasetSource},
    error::{SplitError, SplitResult},
    parameters::SplitParameters,
    plot::TracePlotter,
    signal::{CrossingRange, CrossingRangeFilter, SmoothedTrace},
    slicing::{ScanPointMap, SliceSchema, SliceWindow, slice_dataset},
};
use cdf_split_common::Real;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

pub const PLOT_FILE_NAME: &str = "plot_intensity.png";

/// Turns a dataset into the bytes of one archive entry.
pub trait DatasetEncoder {
    fn encode(&self, dataset: &Dataset) -> SplitResult<Vec<u8>>;
}

/// The segmentation of an intensity trace.
#[derive(Clone, Debug)]
pub struct TraceAnalysis {
    pub times: Vec<Real>,
    pub intensity: Vec<Real>,
    pub smoothed: SmoothedTrace,
    pub threshold: Real,
    pub ranges: Vec<CrossingRange>,
}

fn read_reals<S: DatasetSource>(source: &mut S, name: &str) -> SplitResult<Vec<Real>> {
    let values = source.read(name)?;
    values
        .to_reals()
        .ok_or_else(|| SplitError::UnsupportedVariableType {
            name: name.to_owned(),
            data_type: values.data_type(),
        })
}

impl TraceAnalysis {
    /// Reads the intensity trace and time axis of `source`, and finds its crossing ranges.
    #[instrument(skip_all)]
    pub fn from_source<S: DatasetSource>(
        source: &mut S,
        schema: &SliceSchema,
        parameters: &SplitParameters,
    ) -> SplitResult<Self> {
        let intensity = read_reals(source, &schema.intensity_variable)?;
        let times = read_reals(source, &schema.time_variable)?;
        Self::new(times, intensity, parameters)
    }

    pub fn new(
        times: Vec<Real>,
        intensity: Vec<Real>,
        parameters: &SplitParameters,
    ) -> SplitResult<Self> {
        let smoothed = parameters.smoothing_window().apply(&intensity);
        let threshold = parameters.noise_estimator().threshold(&intensity, &times)?;
        let ranges: Vec<_> = smoothed.crossing_ranges(threshold).collect();
        info!(
            "Found {} ranges over {} scans above threshold {threshold}",
            ranges.len(),
            intensity.len()
        );
        Ok(Self {
            times,
            intensity,
            smoothed,
            threshold,
            ranges,
        })
    }
}

/// What was written for one crossing range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeReport {
    /// One-based position of the range in the trace.
    pub number: usize,
    pub entry_name: String,
    pub window: SliceWindow,
    pub encoded_size: usize,
}

#[derive(Clone, Debug)]
pub struct SplitReport {
    pub archive: PathBuf,
    pub plot: Option<PathBuf>,
    pub threshold: Real,
    pub ranges: Vec<RangeReport>,
}

pub fn entry_name(base_name: &str, number: usize) -> String {
    format!("{base_name}_range_{number}.cdf")
}

pub fn archive_name(base_name: &str) -> String {
    format!("{base_name}_split.zip")
}

/// The input file name up to its first `.`.
pub fn base_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split('.').next() {
        Some(base) if !base.is_empty() => base.to_owned(),
        _ => "dataset".to_owned(),
    }
}

/// Slices, encodes and archives the sub-dataset of every range found by `analysis`.
#[instrument(skip_all, fields(base_name = base_name))]
pub fn export_ranges<S, E, A>(
    source: &mut S,
    schema: &SliceSchema,
    analysis: &TraceAnalysis,
    base_name: &str,
    encoder: &E,
    archive: &mut A,
) -> SplitResult<Vec<RangeReport>>
where
    S: DatasetSource,
    E: DatasetEncoder,
    A: ArchiveSink,
{
    let map = ScanPointMap::from_source(source, schema)?;
    analysis
        .ranges
        .iter()
        .enumerate()
        .map(|(index, range)| {
            let number = index + 1;
            let window = SliceWindow::new(range, &map)?;
            let dataset = slice_dataset(source, schema, &window)?;
            let bytes = encoder.encode(&dataset)?;
            let entry_name = entry_name(base_name, number);
            archive.add_entry(&entry_name, &bytes)?;
            info!(
                "Exported range {number}: scans {:?}, points {:?} to {entry_name}",
                window.scans, window.points
            );
            Ok(RangeReport {
                number,
                entry_name,
                window,
                encoded_size: bytes.len(),
            })
        })
        .collect()
}

/// Splits the netCDF classic file at `input` into the archive in `output`,
/// rendering the trace with `plotter` when one is given.
#[instrument(skip(parameters, plotter))]
pub fn run(
    input: &Path,
    output: &Path,
    parameters: &SplitParameters,
    plotter: Option<&dyn TracePlotter>,
) -> SplitResult<SplitReport> {
    if output.exists() && !output.is_dir() {
        return Err(SplitError::InvalidOutputTarget(output.to_owned()));
    }

    let mut source = ClassicReader::open(input)?;
    let schema = SliceSchema::default();
    let analysis = TraceAnalysis::from_source(&mut source, &schema, parameters)?;

    fs::create_dir_all(output)?;
    let base_name = base_name(input);
    let max_buffer_size = match parameters.max_buffer_size {
        Some(size) => size,
        None => fs::metadata(input)?.len(),
    };
    let encoder = ClassicEncoder { max_buffer_size };

    let archive_path = output.join(archive_name(&base_name));
    let mut archive = ZipArchive::create(&archive_path)?;
    let ranges = export_ranges(
        &mut source,
        &schema,
        &analysis,
        &base_name,
        &encoder,
        &mut archive,
    )?;
    archive.finish()?;

    let plot = match plotter {
        Some(plotter) => {
            let path = output.join(PLOT_FILE_NAME);
            plotter.plot(&analysis, &path)?;
            Some(path)
        }
        None => None,
    };

    Ok(SplitReport {
        archive: archive_path,
        plot,
        threshold: analysis.threshold,
        ranges,
    })
}
