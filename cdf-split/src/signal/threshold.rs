use crate::error::{SplitError, SplitResult};
use cdf_split_common::Real;
use clap::ValueEnum;
use tracing::debug;

/// Statistic used to derive the noise threshold from the baseline samples.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, ValueEnum, strum::Display)]
pub enum NoiseMethod {
    /// The largest baseline sample.
    #[default]
    #[strum(to_string = "max")]
    Max,
    /// Mean plus a multiple of the population standard deviation.
    #[strum(to_string = "sd")]
    Sd,
}

/// Estimates the noise threshold of a trace from the samples recorded
/// during the first `noise_sec` seconds.
#[derive(Clone, Debug)]
pub struct NoiseEstimator {
    pub noise_sec: Real,
    pub method: NoiseMethod,
    pub sd_factor: Real,
}

impl NoiseEstimator {
    pub fn threshold(&self, intensity: &[Real], times: &[Real]) -> SplitResult<Real> {
        if intensity.len() != times.len() {
            return Err(SplitError::TraceLengthMismatch {
                intensity: intensity.len(),
                times: times.len(),
            });
        }
        let baseline: Vec<Real> = intensity
            .iter()
            .zip(times)
            .filter(|&(_, &time)| time <= self.noise_sec)
            .map(|(&value, _)| value)
            .collect();
        if baseline.is_empty() {
            return Err(SplitError::EmptyBaselineWindow {
                noise_sec: self.noise_sec,
            });
        }

        let threshold = match self.method {
            NoiseMethod::Max => baseline.iter().copied().fold(Real::NEG_INFINITY, Real::max),
            NoiseMethod::Sd => {
                let n = baseline.len() as Real;
                let mean = baseline.iter().sum::<Real>() / n;
                let variance = baseline.iter().map(|x| (x - mean).powi(2)).sum::<Real>() / n;
                mean + self.sd_factor * variance.sqrt()
            }
        };
        debug!(
            "Noise threshold {threshold} from {} baseline samples by {}",
            baseline.len(),
            self.method
        );
        Ok(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const TIMES: [Real; 6] = [0.0, 10.0, 20.0, 30.0, 40.0, 50.0];
    const INTENSITY: [Real; 6] = [2.0, 4.0, 4.0, 4.0, 5.0, 100.0];

    fn estimator(noise_sec: Real, method: NoiseMethod) -> NoiseEstimator {
        NoiseEstimator {
            noise_sec,
            method,
            sd_factor: 2.0,
        }
    }

    #[test]
    fn max_of_baseline() {
        let threshold = estimator(40.0, NoiseMethod::Max)
            .threshold(&INTENSITY, &TIMES)
            .unwrap();
        assert_approx_eq!(threshold, 5.0);
    }

    #[test]
    fn max_ignores_later_samples() {
        let threshold = estimator(30.0, NoiseMethod::Max)
            .threshold(&INTENSITY, &TIMES)
            .unwrap();
        assert_approx_eq!(threshold, 4.0);
    }

    #[test]
    fn mean_plus_population_sd() {
        // Baseline [2, 4, 4, 4, 5]: mean 3.8, population variance 0.96.
        let threshold = estimator(40.0, NoiseMethod::Sd)
            .threshold(&INTENSITY, &TIMES)
            .unwrap();
        assert_approx_eq!(threshold, 3.8 + 2.0 * 0.96_f64.sqrt());
    }

    #[test]
    fn empty_baseline() {
        let result = estimator(-1.0, NoiseMethod::Max).threshold(&INTENSITY, &TIMES);
        assert!(matches!(
            result,
            Err(SplitError::EmptyBaselineWindow { noise_sec }) if noise_sec == -1.0
        ));
    }

    #[test]
    fn length_mismatch() {
        let result = estimator(40.0, NoiseMethod::Sd).threshold(&INTENSITY, &TIMES[..3]);
        assert!(matches!(
            result,
            Err(SplitError::TraceLengthMismatch {
                intensity: 6,
                times: 3
            })
        ));
    }

    #[test]
    fn method_names() {
        assert_eq!(NoiseMethod::Max.to_string(), "max");
        assert_eq!(NoiseMethod::Sd.to_string(), "sd");
    }
}
