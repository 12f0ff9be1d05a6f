//! Input validation helpers.
//!
//! Uses `!is_finite()` to reject NaN, +Inf, and -Inf uniformly. Market and
//! configuration inputs fail with [`IvSurfError::InvalidInput`]; pricing
//! inputs fail with [`IvSurfError::InvalidParameters`].

use crate::error::IvSurfError;

/// Validate that a value is strictly positive and finite (rejects NaN, Inf, zero, negatives).
pub(crate) fn validate_positive(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate that a value is finite (rejects NaN and Inf; allows zero and negatives).
pub(crate) fn validate_finite(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() {
        return Err(IvSurfError::InvalidInput {
            message: format!("{name} must be finite, got {value}"),
        });
    }
    Ok(value)
}

/// Validate a pricing-model argument: strictly positive and finite.
pub(crate) fn require_positive(value: f64, name: &str) -> crate::error::Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(IvSurfError::InvalidParameters {
            message: format!("{name} must be positive and finite, got {value}"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_nan_inf() {
        assert!(validate_positive(1.0, "x").is_ok());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_positive(bad, "x"),
                Err(IvSurfError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn finite_allows_negative() {
        assert_eq!(validate_finite(-0.01, "rate").unwrap(), -0.01);
        assert!(validate_finite(f64::NEG_INFINITY, "rate").is_err());
    }

    #[test]
    fn require_positive_is_invalid_parameters() {
        let err = require_positive(-5.0, "strike").unwrap_err();
        match err {
            IvSurfError::InvalidParameters { message } => assert!(message.contains("strike")),
            other => panic!("wrong variant: {other:?}"),
        }
    }
}
