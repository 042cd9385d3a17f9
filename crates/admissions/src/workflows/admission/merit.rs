//! Merit scoring: a pure mapping from (academic percentage, category) to a
//! bounded ranking value. Scores are computed once, when an application is
//! submitted, and frozen onto the application record.

use super::domain::Category;

/// Upper bound for any merit score; the category bonus never pushes past it.
pub const MAX_MERIT_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeritError {
    #[error("academic percentage {0} is outside the 0-100 range")]
    InvalidPercentage(f64),
}

pub(crate) fn validate_percentage(percentage: f64) -> Result<(), MeritError> {
    if !(0.0..=100.0).contains(&percentage) {
        return Err(MeritError::InvalidPercentage(percentage));
    }
    Ok(())
}

/// Fixed reservation bonus added on top of the academic percentage.
pub fn category_bonus(category: &Category) -> f64 {
    match category {
        Category::Sc | Category::St => 5.0,
        Category::Obc => 2.5,
        Category::General | Category::Unclassified(_) => 0.0,
    }
}

/// Compute the merit score for a valid academic percentage.
///
/// `base = percentage`, plus the category bonus, clamped to 100.0. No lower
/// clamp is needed: the percentage is non-negative and so are the bonuses.
pub fn merit_score(percentage: f64, category: &Category) -> Result<f64, MeritError> {
    validate_percentage(percentage)?;
    Ok((percentage + category_bonus(category)).min(MAX_MERIT_SCORE))
}
