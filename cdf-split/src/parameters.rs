use crate::signal::{NoiseEstimator, NoiseMethod, SmoothingWindow};
use cdf_split_common::Real;
use clap::Args;

/// Parameters controlling how the trace is segmented and how slices are encoded.
#[derive(Debug, Clone, Args)]
pub struct SplitParameters {
    /// Duration, in seconds from the start of acquisition, of the noise-only baseline.
    #[clap(short = 's', long, env, default_value = "50.0")]
    pub noise_sec: Real,

    /// Statistic used to derive the noise threshold from the baseline.
    #[clap(short = 'm', long, env, default_value_t = NoiseMethod::Max)]
    pub noise_method: NoiseMethod,

    /// Multiple of the baseline standard deviation added to its mean, for the `sd` method.
    #[clap(short = 'f', long, env, default_value = "2.0")]
    pub noise_sd_factor: Real,

    /// Width, in scans, of the rolling mean applied before range detection.
    #[clap(short = 'n', long, env, default_value = "15")]
    pub noise_rollmean_n: usize,

    /// Largest encoded size, in bytes, of any one slice. Defaults to the size of the input file.
    #[clap(long, env)]
    pub max_buffer_size: Option<u64>,
}

impl Default for SplitParameters {
    fn default() -> Self {
        Self {
            noise_sec: 50.0,
            noise_method: NoiseMethod::Max,
            noise_sd_factor: 2.0,
            noise_rollmean_n: 15,
            max_buffer_size: None,
        }
    }
}

impl SplitParameters {
    pub fn smoothing_window(&self) -> SmoothingWindow {
        SmoothingWindow::new(self.noise_rollmean_n)
    }

    pub fn noise_estimator(&self) -> NoiseEstimator {
        NoiseEstimator {
            noise_sec: self.noise_sec,
            method: self.noise_method,
            sd_factor: self.noise_sd_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[clap(flatten)]
        parameters: SplitParameters,
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["cdf-split"]).unwrap();
        assert_eq!(cli.parameters.noise_sec, 50.0);
        assert_eq!(cli.parameters.noise_method, NoiseMethod::Max);
        assert_eq!(cli.parameters.noise_sd_factor, 2.0);
        assert_eq!(cli.parameters.noise_rollmean_n, 15);
        assert_eq!(cli.parameters.max_buffer_size, None);
    }

    #[test]
    fn short_flags() {
        let cli =
            Cli::try_parse_from(["cdf-split", "-s", "12.5", "-m", "sd", "-f", "3", "-n", "4"])
                .unwrap();
        assert_eq!(cli.parameters.noise_sec, 12.5);
        assert_eq!(cli.parameters.noise_method, NoiseMethod::Sd);
        assert_eq!(cli.parameters.noise_sd_factor, 3.0);
        assert_eq!(cli.parameters.smoothing_window().size(), 5);
    }
}
