//! Distance between grid vectors.

use cpde_core::Real;

/// Sum of squared differences `Σ (a[j] - b[j])²` over the common prefix of
/// the two slices.
///
/// This is the convergence measure of the penalty iteration; it is compared
/// against `tol²` rather than taking a square root.
#[inline]
pub fn squared_distance(a: &[Real], b: &[Real]) -> Real {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_distance_sums_componentwise() {
        let a = [1.0, 2.0, 3.0];
        let b = [1.0, 4.0, 0.0];
        assert_eq!(squared_distance(&a, &b), 13.0);
        assert_eq!(squared_distance(&a, &a), 0.0);
    }

    #[test]
    fn squared_distance_uses_common_prefix() {
        assert_eq!(squared_distance(&[1.0, 1.0], &[0.0]), 1.0);
        assert_eq!(squared_distance(&[], &[5.0]), 0.0);
    }
}
