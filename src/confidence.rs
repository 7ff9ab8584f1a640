//! Certainty factor algebra.
//!
//! A certainty factor (cf) is a real number in [-1.0, 1.0]: `1.0` means the
//! assertion is certainly true, `-1.0` certainly false and `0.0` unknown.
//! The truth thresholds are asymmetric around zero: a cf is *true* above
//! [`CF_CUTOFF`] and *false* below [`FALSE_CUTOFF`] (`CF_CUTOFF - 1.0`).

use crate::error::{ExecutionError, ValidationError};

/// Certainly true.
pub const TRUE: f64 = 1.0;

/// Certainly false.
pub const FALSE: f64 = -1.0;

/// No evidence either way.
pub const UNKNOWN: f64 = 0.0;

/// Threshold above which a cf counts as true.
pub const CF_CUTOFF: f64 = 0.2;

/// Threshold below which a cf counts as false (`CF_CUTOFF - 1.0`).
pub const FALSE_CUTOFF: f64 = -0.8;

/// Combines evidence for A with evidence for B ("A or B").
///
/// # Errors
///
/// Returns `ExecutionError::UndefinedCombination` when the values are
/// certain and contradictory (e.g. `1.0` and `-1.0`).
///
/// # Examples
///
/// ```
/// use emycin::confidence::combine_or;
///
/// let cf = combine_or(0.8, 0.6).unwrap();
/// assert!((cf - 0.92).abs() < 1e-9);
/// assert!(combine_or(1.0, -1.0).is_err());
/// ```
pub fn combine_or(a: f64, b: f64) -> Result<f64, ExecutionError> {
    if a > 0.0 && b > 0.0 {
        return Ok(a + b - a * b);
    }
    if a < 0.0 && b < 0.0 {
        return Ok(a + b + a * b);
    }
    let denominator = 1.0 - a.abs().min(b.abs());
    if denominator == 0.0 {
        return Err(ExecutionError::UndefinedCombination { a, b });
    }
    Ok((a + b) / denominator)
}

/// Combines the cfs of two conjuncts ("A and B").
#[must_use]
pub fn combine_and(a: f64, b: f64) -> f64 {
    a.min(b)
}

/// True when the cf is above the cutoff.
#[must_use]
pub fn is_true(cf: f64) -> bool {
    cf > CF_CUTOFF
}

/// False when the cf is below [`FALSE_CUTOFF`].
#[must_use]
pub fn is_false(cf: f64) -> bool {
    cf < FALSE_CUTOFF
}

/// Returns true if `cf` is a number in [-1.0, 1.0].
#[must_use]
pub fn is_valid_cf(cf: f64) -> bool {
    (FALSE..=TRUE).contains(&cf)
}

/// Validates a cf, returning it unchanged.
///
/// # Errors
///
/// Returns `ValidationError::ConfidenceOutOfRange` for NaN or out-of-range values.
pub fn validate_cf(cf: f64) -> Result<f64, ValidationError> {
    if is_valid_cf(cf) {
        Ok(cf)
    } else {
        Err(ValidationError::ConfidenceOutOfRange { value: cf })
    }
}

/// Describes the strength of evidence a cf carries, in English.
#[must_use]
pub fn describe(cf: f64) -> String {
    if cf >= TRUE {
        "there is certain evidence".to_string()
    } else if cf > 0.8 {
        "there is strongly suggestive evidence".to_string()
    } else if cf > 0.5 {
        "there is suggestive evidence".to_string()
    } else if cf > 0.0 {
        "there is weakly suggestive evidence".to_string()
    } else if cf == 0.0 {
        "there is NO evidence either way".to_string()
    } else {
        format!("{} AGAINST the conclusion", describe(-cf))
    }
}
