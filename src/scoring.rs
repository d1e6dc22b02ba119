use itertools::Itertools;

/// Exponent applied by [`calculate_score`]
pub const DEFAULT_SCORING_EXPONENT: f64 = 2.0;

/// Points for stopping at `elapsed_time` when aiming for `target_time`.
///
/// Overshooting always scores zero. Undershooting scores
/// `max_points * (1 - undershoot / target)^2`, so being close pays
/// disproportionately more than being moderately close.
pub fn calculate_score(target_time: f64, elapsed_time: f64, max_points: f64) -> u64 {
    calculate_score_with_exponent(
        target_time,
        elapsed_time,
        max_points,
        DEFAULT_SCORING_EXPONENT,
    )
}

/// Same as [`calculate_score`] with a caller-chosen exponent.
pub fn calculate_score_with_exponent(
    target_time: f64,
    elapsed_time: f64,
    max_points: f64,
    exponent: f64,
) -> u64 {
    if elapsed_time > target_time {
        return 0;
    }
    let ratio = (target_time - elapsed_time) / target_time;
    (max_points * (1.0 - ratio).powf(exponent)).round() as u64
}

pub fn calculate_total_score(round_scores: &[u64]) -> u64 {
    round_scores
        .iter()
        .fold(0u64, |total, &score| total.saturating_add(score))
}

pub fn format_time(seconds: f64) -> String {
    format!("{seconds:.1}")
}

/// Render with `,` thousands separators, e.g. `12,345`.
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut groups = digits
        .as_bytes()
        .rchunks(3)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<&str>>();
    groups.reverse();
    groups.into_iter().join(",")
}

/// Derived view of one finished round, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub target_time: f64,
    pub elapsed_time: f64,
    pub score: u64,
    pub difference: f64,
    pub is_over: bool,
    pub formatted_target: String,
    pub formatted_elapsed: String,
    pub formatted_difference: String,
    pub formatted_score: String,
}

impl RoundSummary {
    pub fn new(target_time: f64, elapsed_time: f64, score: u64) -> Self {
        let delta = elapsed_time - target_time;
        let difference = delta.abs();

        Self {
            target_time,
            elapsed_time,
            score,
            difference,
            is_over: delta > 0.0,
            formatted_target: format_time(target_time),
            formatted_elapsed: format_time(elapsed_time),
            formatted_difference: format_time(difference),
            formatted_score: format_score(score),
        }
    }

    /// Difference with a `+` (late) or `-` (early) prefix.
    pub fn signed_difference(&self) -> String {
        let prefix = if self.is_over { '+' } else { '-' };
        format!("{prefix}{}", self.formatted_difference)
    }
}

pub fn get_round_summary(target_time: f64, elapsed_time: f64, score: u64) -> RoundSummary {
    RoundSummary::new(target_time, elapsed_time, score)
}
