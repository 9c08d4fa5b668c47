//! The [`Scalar`] storage type and clamping helpers.

/// Element type of every virtual buffer.
pub type Scalar = f64;

/// Magnitude limit applied by [`bounded`].
pub const SCALAR_BOUND: Scalar = 1.0e20;

/// Clamp `value` into `[lower, upper]`.
///
/// Only requires `PartialOrd`, so it works for both the signed indices used
/// by view slicing and for scalars. Incomparable values (NaN) pass through.
pub fn clamp<T: PartialOrd>(value: T, lower: T, upper: T) -> T {
    if value < lower {
        lower
    } else if upper < value {
        upper
    } else {
        value
    }
}

/// Clamp a scalar into `[-SCALAR_BOUND, SCALAR_BOUND]`.
pub fn bounded(value: Scalar) -> Scalar {
    clamp(value, -SCALAR_BOUND, SCALAR_BOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clamp_picks_nearest_bound() {
        assert_eq!(clamp(-3isize, 0, 5), 0);
        assert_eq!(clamp(9isize, 0, 5), 5);
        assert_eq!(clamp(2isize, 0, 5), 2);
    }

    #[test]
    fn bounded_limits_magnitude() {
        assert_eq!(bounded(1.0e30), SCALAR_BOUND);
        assert_eq!(bounded(-1.0e30), -SCALAR_BOUND);
        assert_eq!(bounded(Scalar::INFINITY), SCALAR_BOUND);
        assert_eq!(bounded(12.5), 12.5);
    }

    #[test]
    fn bounded_passes_nan_through() {
        assert!(bounded(Scalar::NAN).is_nan());
    }

    proptest! {
        #[test]
        fn clamp_stays_in_range(value in any::<i64>(), a in -1000i64..1000, b in -1000i64..1000) {
            let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
            let c = clamp(value, lower, upper);
            prop_assert!(lower <= c && c <= upper);
        }

        #[test]
        fn bounded_is_idempotent(value in -1.0e40f64..1.0e40) {
            prop_assert_eq!(bounded(bounded(value)), bounded(value));
        }
    }
}
