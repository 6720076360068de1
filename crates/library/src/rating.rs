use common::MediaRecord;
use serde_json::Value;

pub const NO_RATING: &str = "no rating given";

/// Folds one sample into a running mean without keeping the history.
pub fn incremental_mean(prior: Option<(f64, u32)>, sample: f64) -> (f64, u32) {
    match prior {
        None => (sample, 1),
        Some((mean, count)) => {
            let next = count.saturating_add(1);
            let weight = f64::from(next);
            // Stays within the range of the inputs, so finite samples never overflow.
            (mean - mean / weight + sample / weight, next)
        }
    }
}

pub fn apply_rating(record: &mut MediaRecord, sample: f64) {
    let prior = record.rating.map(|mean| (mean, record.num_ratings));
    let (mean, count) = incremental_mean(prior, sample);
    record.rating = Some(mean);
    record.num_ratings = count;
}

/// The `rating` field of a request body, if it is a number.
pub fn rating_from_body(body: &Value) -> Option<f64> {
    body.get("rating").and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::{apply_rating, incremental_mean, rating_from_body};
    use common::MediaRecord;
    use serde_json::json;

    #[test]
    fn first_sample_becomes_the_mean() {
        assert_eq!(incremental_mean(None, 7.0), (7.0, 1));
    }

    #[test]
    fn later_samples_are_weighted_by_count() {
        assert_eq!(incremental_mean(Some((5.0, 1)), 3.0), (4.0, 2));
        let (mean, count) = incremental_mean(Some((4.0, 2)), 6.0);
        assert!((mean - 14.0 / 3.0).abs() < 1e-9);
        assert_eq!(count, 3);
    }

    #[test]
    fn large_samples_stay_finite() {
        let (mean, count) = incremental_mean(Some((1e308, 1)), 1e308);
        assert_eq!(mean, 1e308);
        assert_eq!(count, 2);
        let (mean, _) = incremental_mean(Some((f64::MAX, 3)), -f64::MAX);
        assert!(mean.is_finite());
    }

    #[test]
    fn zero_is_a_prior_rating() {
        let mut record = MediaRecord {
            rating: Some(0.0),
            num_ratings: 1,
            tags: None,
        };
        apply_rating(&mut record, 4.0);
        assert_eq!(record.rating, Some(2.0));
        assert_eq!(record.num_ratings, 2);
    }

    #[test]
    fn body_rating_must_be_numeric() {
        assert_eq!(rating_from_body(&json!({"rating": 3})), Some(3.0));
        assert_eq!(rating_from_body(&json!({"rating": 2.5})), Some(2.5));
        assert_eq!(rating_from_body(&json!({"rating": "3"})), None);
        assert_eq!(rating_from_body(&json!({"rating": null})), None);
        assert_eq!(rating_from_body(&json!({})), None);
        assert_eq!(rating_from_body(&json!([1])), None);
    }
}
