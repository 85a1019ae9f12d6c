//! Harvesting timing samples from benchmark output.

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ExtractError;

/// Matches lines like `C++             реализация: 0.123456 секунд`.
pub const DEFAULT_PATTERN: &str = r"реализация:\s*(\d+\.\d+)\s*секунд";

/// Turns raw process output into timing samples, in seconds.
pub trait SampleExtractor {
    fn samples(&self, output: &str) -> Vec<f64>;
}

/// Regex-driven extractor. The first capture group holds the seconds value.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    pattern: Regex,
}

impl PatternExtractor {
    pub fn new(pattern: &str) -> Result<Self, ExtractError> {
        let pattern = Regex::new(pattern).map_err(|e| ExtractError::InvalidPattern(e.to_string()))?;
        if pattern.captures_len() < 2 {
            return Err(ExtractError::InvalidPattern(format!(
                "`{}` has no capture group for the seconds value",
                pattern.as_str()
            )));
        }
        Ok(Self { pattern })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_PATTERN).expect("default timing pattern is valid"),
        }
    }
}

impl SampleExtractor for PatternExtractor {
    fn samples(&self, output: &str) -> Vec<f64> {
        self.pattern
            .captures_iter(output)
            .filter_map(|c| c.get(1))
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .filter(|t| t.is_finite() && *t >= 0.0)
            .collect()
    }
}

/// What to do when an invocation reports fewer samples than the trimming needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ShortSamples {
    /// Plain mean of whatever was reported
    #[default]
    Mean,
    /// Treat as a failed invocation
    Reject,
}

/// Sort, drop `trim` samples from each end, then average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimmedMean {
    pub trim: usize,
    pub min_samples: usize,
    pub short: ShortSamples,
}

impl Default for TrimmedMean {
    fn default() -> Self {
        Self {
            trim: 2,
            min_samples: 5,
            short: ShortSamples::Mean,
        }
    }
}

impl TrimmedMean {
    /// Sample count from which trimming applies. Always leaves at least one sample.
    pub fn required(&self) -> usize {
        self.min_samples.max(2 * self.trim + 1)
    }

    pub fn reduce(&self, mut samples: Vec<f64>) -> Result<f64, ExtractError> {
        if samples.is_empty() {
            return Err(ExtractError::NoSamples);
        }
        samples.sort_by(|a, b| a.total_cmp(b));
        let required = self.required();
        let kept = if samples.len() >= required {
            &samples[self.trim..samples.len() - self.trim]
        } else {
            match self.short {
                ShortSamples::Mean => {
                    warn!(
                        "Only {} timing samples (trimming needs {}), averaging all of them",
                        samples.len(),
                        required
                    );
                    &samples[..]
                }
                ShortSamples::Reject => {
                    return Err(ExtractError::InsufficientSamples {
                        found: samples.len(),
                        required,
                    })
                }
            }
        };
        Ok(kept.iter().sum::<f64>() / kept.len() as f64)
    }
}

/// An extraction strategy paired with the reduction applied to its samples.
pub struct Extractor {
    strategy: Box<dyn SampleExtractor>,
    reducer: TrimmedMean,
}

impl Extractor {
    pub fn new(strategy: impl SampleExtractor + 'static, reducer: TrimmedMean) -> Self {
        Self {
            strategy: Box::new(strategy),
            reducer,
        }
    }

    /// The robust average of all samples in `output`.
    pub fn extract(&self, output: &str) -> Result<f64, ExtractError> {
        self.reducer.reduce(self.strategy.samples(output))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(PatternExtractor::default(), TrimmedMean::default())
    }
}
