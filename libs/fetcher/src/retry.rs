use std::time::Duration;

pub const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_FACTOR: f64 = 1.5;

pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Exponential backoff delay for the given (1-indexed) attempt, honoring an
/// upstream `Retry-After` header when present.
pub fn backoff_delay(attempt: u32, retry_after: Option<Duration>) -> Duration {
    if let Some(d) = retry_after {
        return d;
    }
    let secs = BACKOFF_FACTOR.powi(attempt as i32 - 1);
    Duration::from_secs_f64(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses_match_spec() {
        for s in [429, 500, 502, 503, 504] {
            assert!(is_retryable_status(s));
        }
        for s in [400, 401, 403, 404, 418] {
            assert!(!is_retryable_status(s));
        }
    }

    #[test]
    fn backoff_grows_exponentially() {
        let d1 = backoff_delay(1, None);
        let d2 = backoff_delay(2, None);
        let d3 = backoff_delay(3, None);
        assert!(d1 < d2);
        assert!(d2 < d3);
    }

    #[test]
    fn retry_after_overrides_backoff() {
        let d = backoff_delay(1, Some(Duration::from_secs(30)));
        assert_eq!(d, Duration::from_secs(30));
    }
}
