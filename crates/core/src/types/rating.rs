//! Review ratings.

use serde::{Deserialize, Serialize};

/// Error returned for a rating outside `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct RatingError(pub i64);

/// A star rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i16")]
pub struct Rating(i16);

impl Rating {
    pub const MIN: i16 = 1;
    pub const MAX: i16 = 5;

    /// # Errors
    ///
    /// Returns [`RatingError`] when `value` is outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        i16::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError(value))
    }

    #[must_use]
    pub const fn get(self) -> i16 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i16 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Arithmetic mean of `ratings`, rounded to two decimals. Zero when empty.
///
/// ```
/// use bazaar_core::average_rating;
///
/// assert!((average_rating(&[5, 4, 4]) - 4.33).abs() < f64::EPSILON);
/// assert!(average_rating(&[]).abs() < f64::EPSILON);
/// ```
#[must_use]
pub fn average_rating(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }

    let sum: f64 = ratings.iter().map(|&r| f64::from(r)).sum();
    #[allow(clippy::cast_precision_loss)] // review counts never approach 2^52
    let mean = sum / ratings.len() as f64;
    (mean * 100.0).round() / 100.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert_eq!(Rating::new(1).unwrap().get(), 1);
        assert_eq!(Rating::new(5).unwrap().get(), 5);
        assert_eq!(Rating::new(0), Err(RatingError(0)));
        assert_eq!(Rating::new(6), Err(RatingError(6)));
        assert!(Rating::new(i64::from(i16::MAX) + 1).is_err());
    }

    #[test]
    fn test_rating_deserialize() {
        let rating: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(rating.get(), 4);
        assert!(serde_json::from_str::<Rating>("9").is_err());
        assert!(serde_json::from_str::<Rating>("2.5").is_err());
    }

    #[test]
    fn test_average_rating() {
        assert!((average_rating(&[5]) - 5.0).abs() < f64::EPSILON);
        assert!((average_rating(&[1, 2]) - 1.5).abs() < f64::EPSILON);
        assert!((average_rating(&[2, 2, 3]) - 2.33).abs() < f64::EPSILON);
        assert!((average_rating(&[1, 2, 2]) - 1.67).abs() < f64::EPSILON);
    }
}
