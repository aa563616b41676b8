use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use receipt_pipeline::models::{Brand, Customer, Receipt, ReceiptItem, Retailer};
use receipt_pipeline::processor::{Assembler, ItemImputer, ReceiptImputer};
use receipt_pipeline::storage::final_output_frame;

fn main() -> Result<()> {
    println!("=== TESTING IMPUTATION PIPELINE ===\n");

    // Item 2 has a zero price (product-level fallback), item 4 has no valid
    // product or category siblings (retailer+brand fallback), item 5's
    // receipt is missing entirely (referential gap in the join).
    let items = vec![
        item(1, 1, 100, (1, 2), 20, Some(10.0), Some(2)),
        item(2, 1, 100, (1, 2), 20, Some(0.0), Some(1)),
        item(3, 2, 100, (1, 2), 20, Some(20.0), None),
        item(4, 2, 200, (5, 6), 21, None, Some(3)),
        item(5, 99, 300, (1, 2), 21, Some(4.5), Some(1)),
    ];

    let receipts = vec![
        receipt(1, 50, 10, Some(45.5), "2017-09-15T01:30:00Z"),
        receipt(2, 51, 10, None, "2017-10-02T18:00:00Z"),
    ];

    let customers = vec![
        Customer {
            id: 50,
            gender: Some("F".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1985, 10, 2).unwrap(),
            education: "bachelors".to_string(),
            state: "CO".to_string(),
        },
        Customer {
            id: 51,
            gender: None,
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
            education: "masters".to_string(),
            state: "WA".to_string(),
        },
    ];

    let retailers = vec![
        Retailer { id: 10, retailer_type: "grocery".to_string() },
    ];

    let brands = vec![
        Brand { id: 20, name: "Acme".to_string() },
        Brand { id: 21, name: "Globex".to_string() },
    ];

    println!("1. Imputing item prices and quantities...");
    let item_imputer = ItemImputer::from_items(&items);
    for item in &items {
        println!(
            "   item {}: price {:?} -> {:?}, quantity {:?} -> {:?}",
            item.receipt_item_id,
            item.price,
            item_imputer.resolve_price(item),
            item.quantity,
            item_imputer.resolve_quantity(item),
        );
    }
    let imputed_items = item_imputer.impute_all(&items);

    println!("\n2. Imputing receipt totals...");
    let receipt_imputer = ReceiptImputer::from_receipts(&receipts);
    for receipt in &receipts {
        println!(
            "   receipt {}: total {:?} -> {:?}",
            receipt.id,
            receipt.total_price,
            receipt_imputer.resolve_total(receipt),
        );
    }
    let imputed_receipts = receipt_imputer.impute_all(&receipts);

    println!("\n3. Assembling final_output...");
    let as_of = NaiveDate::from_ymd_opt(2017, 12, 31).unwrap();
    let assembler = Assembler::new(imputed_receipts, customers, retailers, brands, as_of);
    let records = assembler.assemble(&imputed_items);

    let df = final_output_frame(&records)?;
    println!("{}", df);

    println!("\n✅ {} items in, {} final_output rows out", items.len(), df.height());

    Ok(())
}

fn item(
    receipt_item_id: i64,
    receipt_id: i64,
    global_product_id: i64,
    categories: (i64, i64),
    brand_id: i64,
    price: Option<f64>,
    quantity: Option<i64>,
) -> ReceiptItem {
    ReceiptItem {
        receipt_item_id,
        receipt_id,
        global_product_id,
        primary_category_id: categories.0,
        secondary_category_id: categories.1,
        tertiary_category_id: 0,
        brand_id,
        retailer_id: 10,
        price,
        quantity,
    }
}

fn receipt(
    id: i64,
    customer_id: i64,
    retailer_id: i64,
    total_price: Option<f64>,
    created_at: &str,
) -> Receipt {
    Receipt {
        id,
        customer_id,
        retailer_id,
        total_price,
        created_at: created_at
            .parse::<DateTime<Utc>>()
            .expect("valid timestamp"),
    }
}
