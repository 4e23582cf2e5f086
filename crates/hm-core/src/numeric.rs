use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and `>= 0`.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(CoreError::Negative { what, value: v });
    }
    Ok(v)
}

/// Closed range `[min, max]` with finite bounds and `min <= max`.
pub fn ensure_range(min: Real, max: Real, what: &'static str) -> Result<(Real, Real), CoreError> {
    ensure_finite(min, what)?;
    ensure_finite(max, what)?;
    if min > max {
        return Err(CoreError::InvalidRange { what, min, max });
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_non_negative_rejects_negative() {
        assert!(ensure_non_negative(0.0, "zero").is_ok());
        assert!(matches!(
            ensure_non_negative(-0.1, "speed"),
            Err(CoreError::Negative { what: "speed", .. })
        ));
    }

    #[test]
    fn ensure_range_requires_ordered_bounds() {
        assert_eq!(ensure_range(0.5, 0.5, "band").unwrap(), (0.5, 0.5));
        assert!(matches!(
            ensure_range(3.0, 1.0, "band"),
            Err(CoreError::InvalidRange { .. })
        ));
        assert!(ensure_range(f64::INFINITY, 1.0, "band").is_err());
    }
}
