use chrono::{DateTime, Utc};

/// `numerator / denominator`, or `0.0` when the denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean_of<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0_f64, 0_usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Whole days from `earlier` to `later`, never negative.
pub fn whole_days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later - earlier).num_days().max(0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
