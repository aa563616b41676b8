/// Fallback levels in the order the cascade consults them. Items walk
/// Product → CategoryPair → RetailerBrand → TableStatistic; receipts walk
/// CustomerRetailer → Retailer → TableStatistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackLevel {
    Product,
    CategoryPair,
    RetailerBrand,
    CustomerRetailer,
    Retailer,
    TableStatistic,
}

impl FallbackLevel {
    pub fn label(&self) -> &'static str {
        match self {
            FallbackLevel::Product => "product",
            FallbackLevel::CategoryPair => "category_pair",
            FallbackLevel::RetailerBrand => "retailer_brand",
            FallbackLevel::CustomerRetailer => "customer_retailer",
            FallbackLevel::Retailer => "retailer",
            FallbackLevel::TableStatistic => "table_statistic",
        }
    }
}

/// Outcome of resolving one field of one row, tagged with the winning level
/// so logs and tests can see where a value came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Raw value was non-null and non-zero; used as-is.
    Kept(f64),
    Imputed { value: f64, level: FallbackLevel },
    /// Every level including the terminal statistic was unusable. The field
    /// stays null; it is never coerced to zero.
    Unresolved,
}

impl Resolution {
    pub fn value(&self) -> Option<f64> {
        match self {
            Resolution::Kept(v) => Some(*v),
            Resolution::Imputed { value, .. } => Some(*value),
            Resolution::Unresolved => None,
        }
    }

    pub fn imputed(&self) -> bool {
        !matches!(self, Resolution::Kept(_))
    }
}

/// Walks the fallback candidates in priority order and short-circuits on the
/// first usable one. Candidates are the row's precomputed group averages,
/// already rounded to the field's precision: the null/zero usability test
/// runs on the rounded value, so an average that rounds to zero sends the
/// walk to the next level.
pub fn resolve(
    raw: Option<f64>,
    candidates: &[(FallbackLevel, Option<f64>)],
    terminal: Option<f64>,
) -> Resolution {
    if let Some(v) = raw {
        if v != 0.0 {
            return Resolution::Kept(v);
        }
    }

    for (level, candidate) in candidates {
        if let Some(avg) = candidate {
            if *avg != 0.0 {
                return Resolution::Imputed { value: *avg, level: *level };
            }
        }
    }

    match terminal {
        Some(statistic) => Resolution::Imputed {
            value: statistic,
            level: FallbackLevel::TableStatistic,
        },
        None => Resolution::Unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_raw_value_short_circuits() {
        let res = resolve(
            Some(9.99),
            &[(FallbackLevel::Product, Some(15.0))],
            Some(3.5),
        );
        assert_eq!(res, Resolution::Kept(9.99));
        assert!(!res.imputed());
    }

    #[test]
    fn test_zero_raw_value_is_missing() {
        let res = resolve(
            Some(0.0),
            &[(FallbackLevel::Product, Some(15.0))],
            Some(3.5),
        );
        assert_eq!(
            res,
            Resolution::Imputed { value: 15.0, level: FallbackLevel::Product }
        );
        assert!(res.imputed());
    }

    #[test]
    fn test_levels_walked_in_priority_order() {
        let res = resolve(
            None,
            &[
                (FallbackLevel::Product, None),
                (FallbackLevel::CategoryPair, Some(7.5)),
                (FallbackLevel::RetailerBrand, Some(11.0)),
            ],
            Some(3.5),
        );
        assert_eq!(
            res,
            Resolution::Imputed { value: 7.5, level: FallbackLevel::CategoryPair }
        );
    }

    #[test]
    fn test_rounded_zero_average_is_unusable() {
        // A group average that rounded to 0.00 must not win the cascade.
        let res = resolve(
            None,
            &[
                (FallbackLevel::Product, Some(0.0)),
                (FallbackLevel::CategoryPair, Some(4.25)),
            ],
            Some(3.5),
        );
        assert_eq!(
            res,
            Resolution::Imputed { value: 4.25, level: FallbackLevel::CategoryPair }
        );
    }

    #[test]
    fn test_terminal_statistic_is_last_resort() {
        let res = resolve(
            None,
            &[
                (FallbackLevel::Product, None),
                (FallbackLevel::CategoryPair, None),
                (FallbackLevel::RetailerBrand, Some(0.0)),
            ],
            Some(3.5),
        );
        assert_eq!(
            res,
            Resolution::Imputed { value: 3.5, level: FallbackLevel::TableStatistic }
        );
    }

    #[test]
    fn test_all_levels_unusable_stays_unresolved() {
        let res = resolve(None, &[(FallbackLevel::Product, None)], None);
        assert_eq!(res, Resolution::Unresolved);
        assert_eq!(res.value(), None);
        assert!(res.imputed());
    }
}
