//! Guarded division
//!
//! Every ratio in the budget engines goes through these helpers. A zero or
//! non-finite denominator yields 0 instead of NaN or infinity.

/// `numerator / denominator`, or 0 when the denominator is zero or not finite
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

/// `numerator / denominator * 100`, with the same zero guard as [`safe_ratio`]
pub fn safe_percent(numerator: f64, denominator: f64) -> f64 {
    safe_ratio(numerator, denominator) * 100.0
}
