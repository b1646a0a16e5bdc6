//! Null- and NaN-aware value equality.
//!
//! Properties suppress change notifications when the old and new values are
//! "equal". Plain `PartialEq` is not enough: `NaN != NaN` would make every
//! `set_value(NaN)` look like a change. The rule used everywhere:
//!
//! 1. both values are "null" (`None == None`), or
//! 2. both values are floating-point NaN, whether `f32` or `f64`, bare or
//!    wrapped in `Option`, or
//! 3. `a == b`.

use std::any::Any;

/// Compare two values with the null/NaN-aware rule.
#[must_use]
pub fn values_equal<T: PartialEq + 'static>(a: &T, b: &T) -> bool {
    a == b || (is_nan_value(a) && is_nan_value(b))
}

/// Whether `value` is a floating-point NaN.
///
/// Recognises `f32`, `f64`, `Option<f32>` and `Option<f64>`; single and
/// double precision NaN are treated alike.
#[must_use]
pub fn is_nan_value(value: &dyn Any) -> bool {
    if let Some(v) = value.downcast_ref::<f64>() {
        return v.is_nan();
    }
    if let Some(v) = value.downcast_ref::<f32>() {
        return v.is_nan();
    }
    if let Some(v) = value.downcast_ref::<Option<f64>>() {
        return v.is_some_and(f64::is_nan);
    }
    if let Some(v) = value.downcast_ref::<Option<f32>>() {
        return v.is_some_and(f32::is_nan);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nones_are_equal() {
        assert!(values_equal::<Option<String>>(&None, &None));
        assert!(!values_equal(&None, &Some(1)));
    }

    #[test]
    fn nan_equals_nan() {
        assert!(values_equal(&f64::NAN, &f64::NAN));
        assert!(values_equal(&f32::NAN, &f32::NAN));
        assert!(values_equal(&Some(f64::NAN), &Some(f64::NAN)));
        assert!(!values_equal(&f64::NAN, &1.0));
    }

    #[test]
    fn single_and_double_nan_both_count() {
        assert!(is_nan_value(&f32::NAN) && is_nan_value(&f64::NAN));
        assert!(!is_nan_value(&"NaN"));
    }

    #[test]
    fn falls_back_to_partial_eq() {
        assert!(values_equal(&"a".to_string(), &"a".to_string()));
        assert!(!values_equal(&1, &2));
        assert!(values_equal(&0.0_f64, &-0.0_f64));
    }
}
