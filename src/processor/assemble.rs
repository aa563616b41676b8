use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use tracing::{info, warn};

use crate::models::{Brand, Customer, FinalRecord, ImputedItem, ImputedReceipt, Retailer};

// MST observes no DST, so a fixed UTC-7 offset is exact year-round.
const MST_OFFSET_SECONDS: i32 = 7 * 3600;

/// Joins the imputed item rows with their receipt and the reference
/// dimensions into one flat record per receipt item. All joins are left
/// joins: a dangling reference nulls that dimension's columns and the row is
/// still emitted.
pub struct Assembler {
    receipts: HashMap<i64, ImputedReceipt>,
    customers: HashMap<i64, Customer>,
    retailers: HashMap<i64, Retailer>,
    brands: HashMap<i64, Brand>,
    as_of: NaiveDate,
}

impl Assembler {
    pub fn new(
        receipts: Vec<ImputedReceipt>,
        customers: Vec<Customer>,
        retailers: Vec<Retailer>,
        brands: Vec<Brand>,
        as_of: NaiveDate,
    ) -> Self {
        Assembler {
            receipts: receipts.into_iter().map(|r| (r.id, r)).collect(),
            customers: customers.into_iter().map(|c| (c.id, c)).collect(),
            retailers: retailers.into_iter().map(|r| (r.id, r)).collect(),
            brands: brands.into_iter().map(|b| (b.id, b)).collect(),
            as_of,
        }
    }

    pub fn assemble(&self, items: &[ImputedItem]) -> Vec<FinalRecord> {
        let mut out = Vec::with_capacity(items.len());
        let mut gaps = ReferentialGaps::default();

        for item in items {
            let receipt = self.receipts.get(&item.receipt_id);
            if receipt.is_none() {
                gaps.receipts += 1;
            }

            let customer = receipt.and_then(|r| {
                let found = self.customers.get(&r.customer_id);
                if found.is_none() {
                    gaps.customers += 1;
                }
                found
            });
            let retailer = receipt.and_then(|r| {
                let found = self.retailers.get(&r.retailer_id);
                if found.is_none() {
                    gaps.retailers += 1;
                }
                found
            });
            let brand = self.brands.get(&item.brand_id);
            if brand.is_none() {
                gaps.brands += 1;
            }

            out.push(FinalRecord {
                customer_id: customer.map(|c| c.id),
                gender: customer.and_then(|c| c.gender.clone()),
                age: customer.map(|c| age_in_years(c.birth_date, self.as_of)),
                education: customer.map(|c| c.education.clone()),
                state: customer.map(|c| c.state.clone()),
                retailer_id: receipt.map(|r| r.retailer_id),
                retailer_type: retailer.map(|r| r.retailer_type.clone()),
                receipt_id: item.receipt_id,
                total_price: receipt.and_then(|r| r.total_price.value),
                created_at_mst: receipt.map(|r| format_mst(r.created_at)),
                receipt_item_id: item.receipt_item_id,
                primary_category_id: item.primary_category_id,
                secondary_category_id: item.secondary_category_id,
                tertiary_category_id: item.tertiary_category_id,
                brand_name: brand.map(|b| b.name.clone()),
                global_product_id: item.global_product_id,
                price: item.price.value,
                quantity: item.quantity.value,
                flag_price_imputed: item.price.imputed,
                flag_qty_imputed: item.quantity.imputed,
            });
        }

        info!("Assembled {} final_output records", out.len());
        gaps.log();
        out
    }
}

/// Whole years between `birth` and `as_of`, not yet counting the current
/// year if the birthday hasn't come around.
fn age_in_years(birth: NaiveDate, as_of: NaiveDate) -> i32 {
    let mut age = as_of.year() - birth.year();
    if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

fn format_mst(created_at: DateTime<Utc>) -> String {
    let mst = FixedOffset::west_opt(MST_OFFSET_SECONDS).expect("offset in range");
    created_at
        .with_timezone(&mst)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[derive(Default)]
struct ReferentialGaps {
    receipts: usize,
    customers: usize,
    retailers: usize,
    brands: usize,
}

impl ReferentialGaps {
    fn log(&self) {
        if self.receipts > 0 {
            warn!("{} items reference a missing receipt", self.receipts);
        }
        if self.customers > 0 {
            warn!("{} receipts reference a missing customer", self.customers);
        }
        if self.retailers > 0 {
            warn!("{} receipts reference a missing retailer", self.retailers);
        }
        if self.brands > 0 {
            warn!("{} items reference a missing brand", self.brands);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImputedField;
    use chrono::TimeZone;

    fn imputed_item(receipt_item_id: i64, receipt_id: i64, brand_id: i64) -> ImputedItem {
        ImputedItem {
            receipt_item_id,
            receipt_id,
            global_product_id: 100,
            primary_category_id: 1,
            secondary_category_id: 2,
            tertiary_category_id: 3,
            brand_id,
            retailer_id: 10,
            price: ImputedField { raw: Some(9.99), value: Some(9.99), imputed: false },
            quantity: ImputedField { raw: None, value: Some(2), imputed: true },
        }
    }

    fn imputed_receipt(id: i64, customer_id: i64, retailer_id: i64) -> ImputedReceipt {
        ImputedReceipt {
            id,
            customer_id,
            retailer_id,
            total_price: ImputedField { raw: Some(45.5), value: Some(45.5), imputed: false },
            created_at: Utc.with_ymd_and_hms(2017, 9, 15, 1, 30, 0).unwrap(),
        }
    }

    fn customer(id: i64) -> Customer {
        Customer {
            id,
            gender: Some("F".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1985, 10, 2).unwrap(),
            education: "bachelors".to_string(),
            state: "CO".to_string(),
        }
    }

    fn assembler(as_of: NaiveDate) -> Assembler {
        Assembler::new(
            vec![imputed_receipt(1, 50, 10)],
            vec![customer(50)],
            vec![Retailer { id: 10, retailer_type: "grocery".to_string() }],
            vec![Brand { id: 20, name: "Acme".to_string() }],
            as_of,
        )
    }

    #[test]
    fn test_full_join_populates_all_dimensions() {
        let as_of = NaiveDate::from_ymd_opt(2017, 9, 15).unwrap();
        let records = assembler(as_of).assemble(&[imputed_item(1, 1, 20)]);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.customer_id, Some(50));
        assert_eq!(record.gender.as_deref(), Some("F"));
        assert_eq!(record.age, Some(31));
        assert_eq!(record.state.as_deref(), Some("CO"));
        assert_eq!(record.retailer_type.as_deref(), Some("grocery"));
        assert_eq!(record.brand_name.as_deref(), Some("Acme"));
        assert_eq!(record.total_price, Some(45.5));
        assert!(record.flag_qty_imputed);
        assert!(!record.flag_price_imputed);
    }

    #[test]
    fn test_missing_receipt_keeps_row_with_null_dimensions() {
        let as_of = NaiveDate::from_ymd_opt(2017, 9, 15).unwrap();
        let records = assembler(as_of).assemble(&[imputed_item(1, 999, 20)]);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.customer_id, None);
        assert_eq!(record.age, None);
        assert_eq!(record.retailer_id, None);
        assert_eq!(record.total_price, None);
        assert_eq!(record.created_at_mst, None);
        // Item-level fields survive untouched.
        assert_eq!(record.receipt_item_id, 1);
        assert_eq!(record.price, Some(9.99));
        assert_eq!(record.brand_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_missing_customer_nulls_customer_columns_only() {
        let as_of = NaiveDate::from_ymd_opt(2017, 9, 15).unwrap();
        let assembler = Assembler::new(
            vec![imputed_receipt(1, 999, 10)],
            vec![customer(50)],
            vec![Retailer { id: 10, retailer_type: "grocery".to_string() }],
            vec![Brand { id: 20, name: "Acme".to_string() }],
            as_of,
        );
        let records = assembler.assemble(&[imputed_item(1, 1, 20)]);

        let record = &records[0];
        assert_eq!(record.customer_id, None);
        assert_eq!(record.gender, None);
        assert_eq!(record.age, None);
        assert_eq!(record.education, None);
        assert_eq!(record.state, None);
        assert_eq!(record.retailer_id, Some(10));
        assert_eq!(record.total_price, Some(45.5));
    }

    #[test]
    fn test_age_counts_whole_years_only() {
        let birth = NaiveDate::from_ymd_opt(1985, 10, 2).unwrap();
        let day_before = NaiveDate::from_ymd_opt(2017, 10, 1).unwrap();
        let birthday = NaiveDate::from_ymd_opt(2017, 10, 2).unwrap();
        assert_eq!(age_in_years(birth, day_before), 31);
        assert_eq!(age_in_years(birth, birthday), 32);
    }

    #[test]
    fn test_created_at_rendered_in_mst() {
        // 01:30 UTC is 18:30 the previous day in UTC-7.
        let created_at = Utc.with_ymd_and_hms(2017, 9, 15, 1, 30, 0).unwrap();
        assert_eq!(format_mst(created_at), "2017-09-14 18:30:00");
    }
}
