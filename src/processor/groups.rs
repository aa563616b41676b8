use std::collections::HashMap;
use std::hash::Hash;

use super::median::round_to;

/// Per-partition average of valid (non-null, non-zero) raw values, rounded to
/// the field's precision at build time. The cascade's zero test must see the
/// rounded value, so rounding cannot be deferred to lookup. Keys with no
/// valid values are absent from the map.
pub fn group_averages<R, K, FK, FV>(
    rows: &[R],
    key_fn: FK,
    value_fn: FV,
    decimals: u32,
) -> HashMap<K, f64>
where
    K: Eq + Hash,
    FK: Fn(&R) -> K,
    FV: Fn(&R) -> Option<f64>,
{
    let mut sums: HashMap<K, (f64, u32)> = HashMap::new();

    for row in rows {
        if let Some(value) = value_fn(row) {
            if value != 0.0 {
                let entry = sums.entry(key_fn(row)).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }
    }

    sums.into_iter()
        .map(|(key, (sum, count))| (key, round_to(sum / count as f64, decimals)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        product_id: i64,
        price: Option<f64>,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { product_id: 1, price: Some(10.0) },
            Row { product_id: 1, price: Some(0.0) },
            Row { product_id: 1, price: Some(20.0) },
            Row { product_id: 2, price: None },
            Row { product_id: 2, price: Some(0.0) },
        ]
    }

    #[test]
    fn test_average_skips_null_and_zero() {
        let averages = group_averages(&rows(), |r| r.product_id, |r| r.price, 2);
        assert_eq!(averages.get(&1), Some(&15.0));
    }

    #[test]
    fn test_group_without_valid_values_is_absent() {
        let averages = group_averages(&rows(), |r| r.product_id, |r| r.price, 2);
        assert_eq!(averages.get(&2), None);
    }

    #[test]
    fn test_average_is_rounded_at_build_time() {
        let rows = vec![
            Row { product_id: 7, price: Some(0.001) },
            Row { product_id: 7, price: Some(0.002) },
        ];
        // The true average 0.0015 rounds to 0.00; the map stores the rounded
        // value so the cascade sees it as degenerate.
        let averages = group_averages(&rows, |r| r.product_id, |r| r.price, 2);
        assert_eq!(averages.get(&7), Some(&0.0));
    }
}
