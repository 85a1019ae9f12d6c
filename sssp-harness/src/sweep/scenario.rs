use std::fmt;

use serde::{Deserialize, Serialize};

/// One benchmarking configuration swept across vertex counts.
///
/// `delta` is only set for the delta-stepping family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub prob: f64,
    pub delta: Option<u32>,
}

impl Scenario {
    pub fn new(prob: f64, delta: Option<u32>) -> Self {
        Self { prob, delta }
    }

    /// The result-cache key, e.g. `prob_0.9` or `prob_0.9_delta_60`.
    pub fn key(&self) -> String {
        let mut key = format!("prob_{}", format_prob(self.prob));
        if let Some(delta) = self.delta {
            key += &format!("_delta_{}", delta);
        }
        key
    }

    /// Inverse of [`Scenario::key`].
    pub fn from_key(key: &str) -> Option<Self> {
        let rest = key.strip_prefix("prob_")?;
        let (prob, delta) = match rest.split_once("_delta_") {
            Some((prob, delta)) => (prob, Some(delta.parse().ok()?)),
            None => (rest, None),
        };
        Some(Self {
            prob: prob.parse().ok()?,
            delta,
        })
    }

    /// Human readable chart title suffix.
    pub fn title(&self) -> String {
        match self.delta {
            Some(delta) => format!(
                "edge probability = {}, delta = {}",
                format_prob(self.prob),
                delta
            ),
            None => format!("edge probability = {}", format_prob(self.prob)),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Shortest round-trip representation with at least one fractional digit,
/// so `1.0` stays `1.0` and `0.9` stays `0.9`.
pub fn format_prob(prob: f64) -> String {
    let s = prob.to_string();
    if s.contains('.') || !prob.is_finite() {
        s
    } else {
        format!("{}.0", s)
    }
}

/// All scenarios of a sweep, probability-major.
pub fn scenarios(probs: &[f64], deltas: Option<&[u32]>) -> Vec<Scenario> {
    let mut out = Vec::new();
    for &prob in probs {
        match deltas {
            Some(deltas) => out.extend(deltas.iter().map(|&d| Scenario::new(prob, Some(d)))),
            None => out.push(Scenario::new(prob, None)),
        }
    }
    out
}
