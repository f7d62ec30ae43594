/// Minimum and maximum over the finite entries of `values`.
///
/// NaN and infinities are ignored. Returns `None` if nothing finite remains.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_non_finite() {
        assert_eq!(
            finite_range(&[f64::NAN, 2.0, f64::INFINITY, -3.0, f64::NEG_INFINITY]),
            Some((-3.0, 2.0))
        );
    }

    #[test]
    fn empty_or_all_nan_is_none() {
        assert_eq!(finite_range(&[]), None);
        assert_eq!(finite_range(&[f64::NAN]), None);
    }
}
