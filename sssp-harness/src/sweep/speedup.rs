use super::error::SpeedupError;

/// Marks a size whose variant timing was zero or unusable. It means "undefined",
/// not "no speedup".
pub const UNDEFINED_SPEEDUP: f64 = 0.0;

/// Per-size `baseline / variant` ratios.
pub fn speedup(baseline: &[f64], variant: &[f64]) -> Result<Vec<f64>, SpeedupError> {
    if baseline.len() != variant.len() {
        return Err(SpeedupError::LengthMismatch {
            baseline: baseline.len(),
            variant: variant.len(),
        });
    }
    Ok(baseline
        .iter()
        .zip(variant)
        .map(|(&b, &v)| {
            if v > 0.0 && v.is_finite() {
                b / v
            } else {
                UNDEFINED_SPEEDUP
            }
        })
        .collect())
}
