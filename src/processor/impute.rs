use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::cascade::{FallbackLevel, Resolution, resolve};
use super::groups::group_averages;
use super::median::clipped_median;
use crate::models::{ImputedField, ImputedItem, ImputedReceipt, Receipt, ReceiptItem};

pub const PRICE_DECIMALS: u32 = 2;
pub const QUANTITY_DECIMALS: u32 = 0;

/// Resolves missing item prices and quantities. Group averages and table
/// statistics are snapshots over the raw rows passed to `from_items`, so
/// per-row resolution is independent of processing order and re-running the
/// stage over its own output changes nothing.
pub struct ItemImputer {
    price_by_product: HashMap<i64, f64>,
    price_by_category: HashMap<(i64, i64), f64>,
    price_by_retailer_brand: HashMap<(i64, i64), f64>,
    quantity_by_product: HashMap<i64, f64>,
    quantity_by_category: HashMap<(i64, i64), f64>,
    quantity_by_retailer_brand: HashMap<(i64, i64), f64>,
    median_price: Option<f64>,
    median_quantity: Option<f64>,
}

impl ItemImputer {
    pub fn from_items(items: &[ReceiptItem]) -> Self {
        let price = |item: &ReceiptItem| item.price;
        let quantity = |item: &ReceiptItem| item.quantity.map(|q| q as f64);

        let median_price = clipped_median(items.iter().map(price), PRICE_DECIMALS);
        let median_quantity = clipped_median(items.iter().map(quantity), QUANTITY_DECIMALS);

        if median_price.is_none() {
            warn!("Fewer than 2 usable item prices; no terminal price statistic");
        }
        if median_quantity.is_none() {
            warn!("Fewer than 2 usable item quantities; no terminal quantity statistic");
        }

        ItemImputer {
            price_by_product: group_averages(
                items,
                |i| i.global_product_id,
                price,
                PRICE_DECIMALS,
            ),
            price_by_category: group_averages(
                items,
                |i| (i.primary_category_id, i.secondary_category_id),
                price,
                PRICE_DECIMALS,
            ),
            price_by_retailer_brand: group_averages(
                items,
                |i| (i.retailer_id, i.brand_id),
                price,
                PRICE_DECIMALS,
            ),
            quantity_by_product: group_averages(
                items,
                |i| i.global_product_id,
                quantity,
                QUANTITY_DECIMALS,
            ),
            quantity_by_category: group_averages(
                items,
                |i| (i.primary_category_id, i.secondary_category_id),
                quantity,
                QUANTITY_DECIMALS,
            ),
            quantity_by_retailer_brand: group_averages(
                items,
                |i| (i.retailer_id, i.brand_id),
                quantity,
                QUANTITY_DECIMALS,
            ),
            median_price,
            median_quantity,
        }
    }

    pub fn resolve_price(&self, item: &ReceiptItem) -> Resolution {
        resolve(
            item.price,
            &[
                (
                    FallbackLevel::Product,
                    self.price_by_product.get(&item.global_product_id).copied(),
                ),
                (
                    FallbackLevel::CategoryPair,
                    self.price_by_category
                        .get(&(item.primary_category_id, item.secondary_category_id))
                        .copied(),
                ),
                (
                    FallbackLevel::RetailerBrand,
                    self.price_by_retailer_brand
                        .get(&(item.retailer_id, item.brand_id))
                        .copied(),
                ),
            ],
            self.median_price,
        )
    }

    pub fn resolve_quantity(&self, item: &ReceiptItem) -> Resolution {
        resolve(
            item.quantity.map(|q| q as f64),
            &[
                (
                    FallbackLevel::Product,
                    self.quantity_by_product
                        .get(&item.global_product_id)
                        .copied(),
                ),
                (
                    FallbackLevel::CategoryPair,
                    self.quantity_by_category
                        .get(&(item.primary_category_id, item.secondary_category_id))
                        .copied(),
                ),
                (
                    FallbackLevel::RetailerBrand,
                    self.quantity_by_retailer_brand
                        .get(&(item.retailer_id, item.brand_id))
                        .copied(),
                ),
            ],
            self.median_quantity,
        )
    }

    pub fn impute_all(&self, items: &[ReceiptItem]) -> Vec<ImputedItem> {
        let mut out = Vec::with_capacity(items.len());
        let mut price_summary = ResolutionSummary::new("item price");
        let mut quantity_summary = ResolutionSummary::new("item quantity");

        for item in items {
            let price = self.resolve_price(item);
            let quantity = self.resolve_quantity(item);
            price_summary.record(&price);
            quantity_summary.record(&quantity);

            out.push(ImputedItem {
                receipt_item_id: item.receipt_item_id,
                receipt_id: item.receipt_id,
                global_product_id: item.global_product_id,
                primary_category_id: item.primary_category_id,
                secondary_category_id: item.secondary_category_id,
                tertiary_category_id: item.tertiary_category_id,
                brand_id: item.brand_id,
                retailer_id: item.retailer_id,
                price: ImputedField {
                    raw: item.price,
                    value: price.value(),
                    imputed: price.imputed(),
                },
                // Quantity averages were rounded to whole numbers, so the
                // cast back to integer is exact.
                quantity: ImputedField {
                    raw: item.quantity,
                    value: quantity.value().map(|v| v as i64),
                    imputed: quantity.imputed(),
                },
            });
        }

        price_summary.log();
        quantity_summary.log();
        out
    }
}

/// Resolves missing receipt total prices. Same snapshot construction as
/// `ItemImputer`, with the receipt-side level order: (customer, retailer) →
/// retailer → terminal statistic.
pub struct ReceiptImputer {
    total_by_customer_retailer: HashMap<(i64, i64), f64>,
    total_by_retailer: HashMap<i64, f64>,
    median_total: Option<f64>,
}

impl ReceiptImputer {
    pub fn from_receipts(receipts: &[Receipt]) -> Self {
        let total = |receipt: &Receipt| receipt.total_price;

        let median_total = clipped_median(receipts.iter().map(total), PRICE_DECIMALS);
        if median_total.is_none() {
            warn!("Fewer than 2 usable receipt totals; no terminal total-price statistic");
        }

        ReceiptImputer {
            total_by_customer_retailer: group_averages(
                receipts,
                |r| (r.customer_id, r.retailer_id),
                total,
                PRICE_DECIMALS,
            ),
            total_by_retailer: group_averages(receipts, |r| r.retailer_id, total, PRICE_DECIMALS),
            median_total,
        }
    }

    pub fn resolve_total(&self, receipt: &Receipt) -> Resolution {
        resolve(
            receipt.total_price,
            &[
                (
                    FallbackLevel::CustomerRetailer,
                    self.total_by_customer_retailer
                        .get(&(receipt.customer_id, receipt.retailer_id))
                        .copied(),
                ),
                (
                    FallbackLevel::Retailer,
                    self.total_by_retailer.get(&receipt.retailer_id).copied(),
                ),
            ],
            self.median_total,
        )
    }

    pub fn impute_all(&self, receipts: &[Receipt]) -> Vec<ImputedReceipt> {
        let mut out = Vec::with_capacity(receipts.len());
        let mut summary = ResolutionSummary::new("receipt total price");

        for receipt in receipts {
            let total = self.resolve_total(receipt);
            summary.record(&total);

            out.push(ImputedReceipt {
                id: receipt.id,
                customer_id: receipt.customer_id,
                retailer_id: receipt.retailer_id,
                total_price: ImputedField {
                    raw: receipt.total_price,
                    value: total.value(),
                    imputed: total.imputed(),
                },
                created_at: receipt.created_at,
            });
        }

        summary.log();
        out
    }
}

struct ResolutionSummary {
    field: &'static str,
    kept: usize,
    imputed_by_level: HashMap<&'static str, usize>,
    unresolved: usize,
}

impl ResolutionSummary {
    fn new(field: &'static str) -> Self {
        ResolutionSummary {
            field,
            kept: 0,
            imputed_by_level: HashMap::new(),
            unresolved: 0,
        }
    }

    fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Kept(_) => self.kept += 1,
            Resolution::Imputed { level, .. } => {
                *self.imputed_by_level.entry(level.label()).or_insert(0) += 1;
            }
            Resolution::Unresolved => self.unresolved += 1,
        }
    }

    fn log(&self) {
        let imputed: usize = self.imputed_by_level.values().sum();
        info!(
            "{} resolution: {} kept, {} imputed, {} unresolved",
            self.field, self.kept, imputed, self.unresolved
        );
        for (level, count) in &self.imputed_by_level {
            debug!("{} imputed from {}: {}", self.field, level, count);
        }
        if self.unresolved > 0 {
            warn!(
                "{} rows left {} unresolved after all fallback levels",
                self.unresolved, self.field
            );
        }
    }
}
