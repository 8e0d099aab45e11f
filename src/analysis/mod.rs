//! Analysis passes over enriched sales records.
//!
//! Each pass is a pure function from `&[SalesRecord]` to a typed result. The
//! result knows how to render itself as report tables and, where relevant, a
//! chart description. Nothing here touches the filesystem.

pub mod calendar;
pub mod channel_share;
pub mod discount;
pub mod group;
pub mod loyalty;
pub mod monthly_trend;
pub mod product_share;
pub mod seasonal;

pub use calendar::{enrich, years_present};
pub use channel_share::{ChannelShare, channel_share};
pub use discount::{DiscountImpact, discount_impact};
pub use loyalty::{LoyaltySegmentation, loyalty_segmentation};
pub use monthly_trend::{MonthlyTrend, monthly_trend};
pub use product_share::{ProductShare, yearly_product_share};
pub use seasonal::{SeasonalSales, seasonal_sales};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::domain::{DiscountLevel, SalesRecord, Transaction};

    /// A single-line order for customer `C1`, priced at 2.0 per unit.
    pub fn tx(order_id: &str, year: i32, month: u32, quantity: i64) -> Transaction {
        Transaction {
            order_id: order_id.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
            product: "Cola".to_string(),
            category: "Soft Drinks".to_string(),
            customer_id: "C1".to_string(),
            customer_type: "B2C".to_string(),
            region: "North".to_string(),
            quantity,
            unit_price: Some(2.0),
            total_price: quantity as f64 * 2.0,
            discount: DiscountLevel::NONE,
        }
    }

    pub fn records(transactions: Vec<Transaction>) -> Vec<SalesRecord> {
        crate::analysis::enrich(transactions).unwrap()
    }
}
