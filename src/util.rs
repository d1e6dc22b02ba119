/// Average of a set of per-round misses, `None` before any round is played
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let centre = mean(data)?;
    let variance = data
        .iter()
        .map(|value| (value - centre).powi(2))
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

/// Decimal places past which an `f64` has no digits left to round
const MAX_ROUNDING_PLACES: i32 = 15;

/// Round `value` to `places` decimal digits, halves away from zero.
///
/// Precisions an `f64` cannot represent leave `value` untouched.
pub fn round_to(value: f64, places: i32) -> f64 {
    if places >= MAX_ROUNDING_PLACES {
        return value;
    }
    let multiplier = 10_f64.powi(places);
    let scaled = value * multiplier;
    if !multiplier.is_finite() || !scaled.is_finite() {
        return value;
    }
    scaled.round() / multiplier
}
