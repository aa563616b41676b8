/// Rounds half away from zero to `decimals` places. Prices use 2 decimals,
/// quantities 0.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Table-wide robust statistic used as the cascade's terminal fallback.
///
/// Qualifying values are non-null and non-zero. Sorted ascending, the first
/// ⌈n/2⌉ values form a lower half that includes the middle rank for odd
/// counts; the result is the average of the 2 largest values in that half,
/// a fixed window at the median rank. Returns None below 2 qualifying
/// values.
pub fn clipped_median<I>(values: I, decimals: u32) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut qualifying: Vec<f64> = values
        .into_iter()
        .flatten()
        .filter(|v| *v != 0.0)
        .collect();

    if qualifying.len() < 2 {
        return None;
    }

    qualifying.sort_by(|a, b| a.total_cmp(b));
    let lower_half = &qualifying[..qualifying.len().div_ceil(2)];
    let window = &lower_half[lower_half.len().saturating_sub(2)..];
    let avg = window.iter().sum::<f64>() / window.len() as f64;

    Some(round_to(avg, decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_count_window() {
        // Lower half of [1..7] is {1,2,3,4}; top 2 are {3,4}; average 3.5.
        let values = (1..=7).map(|v| Some(v as f64));
        assert_eq!(clipped_median(values, 2), Some(3.5));
    }

    #[test]
    fn test_even_count_window() {
        // Lower half of [1,2,3,4] is {1,2}; average 1.5.
        let values = [1.0, 2.0, 3.0, 4.0].into_iter().map(Some);
        assert_eq!(clipped_median(values, 2), Some(1.5));
    }

    #[test]
    fn test_order_invariance() {
        let shuffled = [6.0, 1.0, 7.0, 3.0, 5.0, 2.0, 4.0].into_iter().map(Some);
        assert_eq!(clipped_median(shuffled, 2), Some(3.5));
    }

    #[test]
    fn test_null_and_zero_values_ignored() {
        let values = vec![Some(0.0), None, Some(10.0), Some(0.0), Some(20.0), None];
        // Only {10, 20} qualify; lower half is {10}.
        assert_eq!(clipped_median(values, 2), Some(10.0));
    }

    #[test]
    fn test_insufficient_data_is_none() {
        assert_eq!(clipped_median(vec![Some(5.0)], 2), None);
        assert_eq!(clipped_median(vec![Some(0.0), None], 2), None);
        assert_eq!(clipped_median(Vec::<Option<f64>>::new(), 2), None);
    }

    #[test]
    fn test_quantity_precision() {
        // {2,3,5}: lower half {2,3}; average 2.5 rounds half away to 3.
        let values = [2.0, 3.0, 5.0].into_iter().map(Some);
        assert_eq!(clipped_median(values, 0), Some(3.0));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(7.499, 2), 7.5);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(0.004, 2), 0.0);
    }
}
