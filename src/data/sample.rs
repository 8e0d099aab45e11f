//! Synthetic beverage-sales generator.
//!
//! Produces transactions in the ingest schema for demos and end-to-end tests.
//! Output is a pure function of `SampleConfig` (seeded `StdRng`).
//!
//! Shape of the data:
//! - orders of 1–4 line items, one customer each
//! - B2B customers buy in bulk, B2C customers in small quantities
//! - summer lifts volume, winter dampens it
//! - deeper discounts lift volume slightly
//! - the first lines cycle through every (product, discount) pair, so the
//!   discount t-tests always have complete pairing

use chrono::NaiveDate;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DiscountLevel, Season, Transaction};
use crate::error::AppError;

/// `(product, category, unit price)`.
const PRODUCTS: [(&str, &str, f64); 8] = [
    ("Coca-Cola", "Soft Drinks", 1.20),
    ("Fanta", "Soft Drinks", 1.10),
    ("Red Bull", "Soft Drinks", 1.95),
    ("Orange Juice", "Juices", 2.40),
    ("Apple Juice", "Juices", 2.20),
    ("Mineral Water", "Water", 0.65),
    ("Beer", "Alcoholic Beverages", 1.45),
    ("Wine", "Alcoholic Beverages", 7.90),
];

const REGIONS: [&str; 5] = ["Berlin", "Bayern", "Hamburg", "Hessen", "Sachsen"];

const DISCOUNT_BASIS_POINTS: [u32; 4] = [0, 500, 1000, 1500];

/// Log-scale standard deviation of line quantities.
const QUANTITY_NOISE: f64 = 0.35;

const MAX_LINES_PER_ORDER: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub rows: usize,
    pub seed: u64,
    pub years: Vec<i32>,
    pub customers: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            rows: 5_000,
            seed: 42,
            years: vec![2021, 2022, 2023],
            customers: 400,
        }
    }
}

/// Minimum row count that still covers every (product, discount) pair.
pub fn min_rows() -> usize {
    PRODUCTS.len() * DISCOUNT_BASIS_POINTS.len()
}

pub fn generate_transactions(config: &SampleConfig) -> Result<Vec<Transaction>, AppError> {
    if config.rows < min_rows() {
        return Err(AppError::new(
            2,
            format!("Sample row count must be at least {} (got {}).", min_rows(), config.rows),
        ));
    }
    if config.years.is_empty() {
        return Err(AppError::new(2, "Sample generation needs at least one year."));
    }
    if config.customers == 0 {
        return Err(AppError::new(2, "Sample customer count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, QUANTITY_NOISE)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut transactions = Vec::with_capacity(config.rows);
    let mut order_no = 0usize;

    while transactions.len() < config.rows {
        order_no += 1;
        let order_id = format!("ORD{order_no:06}");

        let year = config.years[rng.gen_range(0..config.years.len())];
        let month = rng.gen_range(1..=12);
        let day = rng.gen_range(1..=28);
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| AppError::new(2, format!("Invalid sample date {year}-{month}-{day}.")))?;

        let customer = rng.gen_range(0..config.customers);
        let b2b = customer % 3 == 0;
        let region = REGIONS[customer % REGIONS.len()];

        let remaining = config.rows - transactions.len();
        let lines = rng.gen_range(1..=MAX_LINES_PER_ORDER).min(remaining);

        for _ in 0..lines {
            let idx = transactions.len();
            let (product_idx, tier_idx) = if idx < min_rows() {
                (idx / DISCOUNT_BASIS_POINTS.len(), idx % DISCOUNT_BASIS_POINTS.len())
            } else {
                (
                    rng.gen_range(0..PRODUCTS.len()),
                    rng.gen_range(0..DISCOUNT_BASIS_POINTS.len()),
                )
            };
            let (product, category, unit_price) = PRODUCTS[product_idx];
            let discount = DiscountLevel::from_basis_points(DISCOUNT_BASIS_POINTS[tier_idx]);

            let base = if b2b { 24.0 } else { 3.0 };
            let lift = season_multiplier(month) * (1.0 + 2.0 * discount.rate());
            let quantity = (base * lift * noise.sample(&mut rng).exp()).round().max(1.0) as i64;
            let total_price = (quantity as f64 * unit_price * (1.0 - discount.rate()) * 100.0).round() / 100.0;

            transactions.push(Transaction {
                order_id: order_id.clone(),
                date,
                product: product.to_string(),
                category: category.to_string(),
                customer_id: format!("C{:04}", customer + 1),
                customer_type: if b2b { "B2B" } else { "B2C" }.to_string(),
                region: region.to_string(),
                quantity,
                unit_price: Some(unit_price),
                total_price,
                discount,
            });
        }
    }

    Ok(transactions)
}

fn season_multiplier(month: u32) -> f64 {
    match Season::for_month(month) {
        Some(Season::Summer) => 1.3,
        Some(Season::Winter) => 0.8,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::collections::BTreeSet;

    fn small() -> SampleConfig {
        SampleConfig {
            rows: 300,
            seed: 7,
            years: vec![2022, 2023],
            customers: 40,
        }
    }

    #[test]
    fn same_seed_same_data() {
        let a = generate_transactions(&small()).unwrap();
        let b = generate_transactions(&small()).unwrap();
        assert_eq!(a, b);

        let c = generate_transactions(&SampleConfig { seed: 8, ..small() }).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn covers_every_product_at_every_discount() {
        let txs = generate_transactions(&small()).unwrap();
        assert_eq!(txs.len(), 300);

        let pairs: BTreeSet<(String, u32)> = txs
            .iter()
            .map(|t| (t.product.clone(), t.discount.basis_points()))
            .collect();
        assert_eq!(pairs.len(), PRODUCTS.len() * DISCOUNT_BASIS_POINTS.len());

        let years: BTreeSet<i32> = txs.iter().map(|t| t.date.year()).collect();
        assert!(years.iter().all(|y| [2022, 2023].contains(y)));
        assert!(txs.iter().all(|t| t.quantity >= 1));
    }

    #[test]
    fn orders_stay_within_one_customer() {
        let txs = generate_transactions(&small()).unwrap();
        for pair in txs.windows(2) {
            if pair[0].order_id == pair[1].order_id {
                assert_eq!(pair[0].customer_id, pair[1].customer_id);
                assert_eq!(pair[0].date, pair[1].date);
            }
        }
    }

    #[test]
    fn rejects_too_few_rows() {
        let err = generate_transactions(&SampleConfig { rows: 3, ..small() }).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
