use crate::model::{Span, NIGHT_MS};

use super::EngineError;

/// Exact night count for a stay. The span must cover a whole, positive
/// number of 24-hour periods.
pub(crate) fn nights(span: &Span) -> Result<i64, EngineError> {
    let dur = span.duration_ms();
    if dur < NIGHT_MS {
        return Err(EngineError::Validation("stay must be at least one night"));
    }
    if dur % NIGHT_MS != 0 {
        return Err(EngineError::Validation("stay must be a whole number of nights"));
    }
    Ok(dur / NIGHT_MS)
}

/// Derived amount: flat nightly rate times night count.
pub(crate) fn price_cents(rate_cents: i64, span: &Span) -> Result<i64, EngineError> {
    if rate_cents < 0 {
        return Err(EngineError::Validation("nightly rate must be non-negative"));
    }
    let n = nights(span)?;
    rate_cents
        .checked_mul(n)
        .ok_or(EngineError::Validation("amount overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_nights_at_100() {
        // [2024-01-01, 2024-01-03) at rate 100 => 200
        let span = Span::new(0, 2 * NIGHT_MS);
        assert_eq!(price_cents(100, &span).unwrap(), 200);
    }

    #[test]
    fn single_night() {
        let span = Span::new(5 * NIGHT_MS, 6 * NIGHT_MS);
        assert_eq!(nights(&span).unwrap(), 1);
        assert_eq!(price_cents(12_345, &span).unwrap(), 12_345);
    }

    #[test]
    fn fractional_span_rejected() {
        let span = Span::new(0, NIGHT_MS + 1);
        assert!(matches!(nights(&span), Err(EngineError::Validation(_))));
        let half = Span::new(0, NIGHT_MS / 2);
        assert!(matches!(nights(&half), Err(EngineError::Validation(_))));
    }

    #[test]
    fn zero_rate_is_fine() {
        let span = Span::new(0, 3 * NIGHT_MS);
        assert_eq!(price_cents(0, &span).unwrap(), 0);
    }

    #[test]
    fn negative_rate_rejected() {
        let span = Span::new(0, NIGHT_MS);
        assert!(matches!(
            price_cents(-1, &span),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn overflow_rejected() {
        let span = Span::new(0, 300 * NIGHT_MS);
        assert!(matches!(
            price_cents(i64::MAX / 2, &span),
            Err(EngineError::Validation(_))
        ));
    }
}
