//! Empirical CDF over the unique values of a sample.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

/// Build the empirical CDF of `data`.
///
/// Every unique value becomes one bin, and the returned points are `(value, cumulative share)`
/// sorted by value. The last point is always `1.0`. Non-finite values are ignored; an input
/// without any finite value yields an empty CDF.
pub fn build(data: &[f64]) -> Vec<(f64, f64)> {
    let mut counts: BTreeMap<OrderedFloat<f64>, usize> = BTreeMap::new();
    for &x in data.iter().filter(|x| x.is_finite()) {
        *counts.entry(OrderedFloat(x)).or_default() += 1;
    }
    let total: usize = counts.values().sum();

    let mut cumulative = 0;
    counts
        .into_iter()
        .map(|(x, count)| {
            cumulative += count;
            (x.into_inner(), cumulative as f64 / total as f64)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unique_bins() {
        let cdf = build(&[3.0, 1.0, 2.0, 2.0]);
        assert_eq!(cdf, vec![(1.0, 0.25), (2.0, 0.75), (3.0, 1.0)]);
    }

    #[test]
    fn ends_at_one_and_monotone() {
        let data: Vec<f64> = (0..1000).map(|i| ((i * 7919) % 113) as f64 / 3.0 - 10.0).collect();
        let cdf = build(&data);
        assert!((cdf.last().unwrap().1 - 1.0).abs() < 1e-12);
        for pair in cdf.windows(2) {
            assert!(pair[0].0 < pair[1].0);
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn ignores_nan() {
        let cdf = build(&[f64::NAN, 1.0, 1.0]);
        assert_eq!(cdf, vec![(1.0, 1.0)]);
        assert!(build(&[]).is_empty());
        assert!(build(&[f64::NAN]).is_empty());
    }
}
