//! Customer loyalty segmentation for one target year.
//!
//! 1. Line items are rolled up per order (line count, order value).
//! 2. Orders are rolled up per customer (order count = "repetition", value).
//! 3. Q1/Q3 of repetition split customers into three behavior classes.
//!
//! Both rollups are driven by a grouping-key list, so the same code serves the
//! primary `(customer, region)` pass and the `(customer, discount)` pass that
//! feeds the behavior-by-discount cross-tabulation.

use std::collections::BTreeMap;

use tracing::debug;

use crate::analysis::group::{GroupKey, KeyValue, aggregate_by};
use crate::domain::{CustomerBehavior, DiscountLevel, SalesRecord};
use crate::error::AppError;
use crate::plot::{Chart, ChartSpec, ScatterChart};
use crate::report::{Cell, Table};
use crate::stats::{quantile, round_to};

pub const ORDERS_TABLE_NAME: &str = "loyal_customers";
pub const CUSTOMERS_TABLE_NAME: &str = "customer_invoice_analysis";
pub const CLASSIFIED_TABLE_NAME: &str = "customer_behavior_classification";
pub const BY_DISCOUNT_TABLE_NAME: &str = "customer_behavior_per_discount";
pub const FREQUENCY_CHART_NAME: &str = "purchase_frequency_distribution";

/// Keys of the primary customer rollup.
pub const CUSTOMER_KEYS: [GroupKey; 2] = [GroupKey::Customer, GroupKey::Region];

/// Keys of the discount-level customer rollup.
pub const CUSTOMER_DISCOUNT_KEYS: [GroupKey; 2] = [GroupKey::Customer, GroupKey::Discount];

/// One order: `key` holds the rollup keys followed by the order id.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub key: Vec<KeyValue>,
    /// Number of line items on the order.
    pub lines: usize,
    pub value: f64,
}

/// One customer group: `key` holds the rollup keys.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRow {
    pub key: Vec<KeyValue>,
    /// Number of distinct orders.
    pub repetition: usize,
    pub value: f64,
}

/// Result of the two-step rollup for one key list.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollup {
    pub keys: Vec<GroupKey>,
    pub orders: Vec<OrderRow>,
    pub customers: Vec<CustomerRow>,
}

/// Roll line items of `year` up per order, then per customer, grouped by `keys`.
pub fn rollup(records: &[SalesRecord], year: i32, keys: &[GroupKey]) -> Rollup {
    let mut order_keys = keys.to_vec();
    order_keys.push(GroupKey::Order);

    let in_year = records.iter().filter(|r| r.year == year);
    let orders: Vec<OrderRow> = aggregate_by(in_year, |r| GroupKey::extract_all(&order_keys, r), |r| r.tx.total_price)
        .into_iter()
        .map(|(key, agg)| OrderRow {
            key,
            lines: agg.count,
            value: agg.sum,
        })
        .collect();

    let customers = aggregate_by(&orders, |o| o.key[..keys.len()].to_vec(), |o| o.value)
        .into_iter()
        .map(|(key, agg)| CustomerRow {
            key,
            repetition: agg.count,
            value: agg.sum,
        })
        .collect();

    Rollup {
        keys: keys.to_vec(),
        orders,
        customers,
    }
}

/// Repetition quartiles used as behavior thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub q1: f64,
    pub q3: f64,
}

impl Thresholds {
    pub fn from_customers(customers: &[CustomerRow]) -> Result<Self, AppError> {
        let repetitions: Vec<f64> = customers.iter().map(|c| c.repetition as f64).collect();
        Ok(Self {
            q1: quantile(&repetitions, 0.25)?,
            q3: quantile(&repetitions, 0.75)?,
        })
    }

    /// `< Q1` low, `Q1..=Q3` loyal, `> Q3` high.
    pub fn classify(&self, repetition: usize) -> CustomerBehavior {
        let r = repetition as f64;
        if r < self.q1 {
            CustomerBehavior::LowActivity
        } else if r <= self.q3 {
            CustomerBehavior::LoyalCustomer
        } else {
            CustomerBehavior::HighActivity
        }
    }
}

/// Customer counts per (behavior, discount level).
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorByDiscount {
    pub levels: Vec<DiscountLevel>,
    pub counts: BTreeMap<(CustomerBehavior, DiscountLevel), usize>,
}

impl BehaviorByDiscount {
    pub fn count(&self, behavior: CustomerBehavior, level: DiscountLevel) -> usize {
        self.counts.get(&(behavior, level)).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoyaltySegmentation {
    pub year: i32,
    pub primary: Rollup,
    pub thresholds: Thresholds,
    /// Behavior per entry of `primary.customers`.
    pub behaviors: Vec<CustomerBehavior>,
    /// `(repetition, number of customers)`, ascending by repetition.
    pub frequency: Vec<(usize, usize)>,
    pub by_discount: BehaviorByDiscount,
}

pub fn loyalty_segmentation(records: &[SalesRecord], year: i32) -> Result<LoyaltySegmentation, AppError> {
    let primary = rollup(records, year, &CUSTOMER_KEYS);
    if primary.customers.is_empty() {
        return Err(AppError::new(3, format!("No sales in target year {year}.")));
    }
    debug!(
        year,
        orders = primary.orders.len(),
        customers = primary.customers.len(),
        "loyalty rollup"
    );

    let thresholds = Thresholds::from_customers(&primary.customers)?;
    let behaviors = primary
        .customers
        .iter()
        .map(|c| thresholds.classify(c.repetition))
        .collect();

    let mut frequency: BTreeMap<usize, usize> = BTreeMap::new();
    for c in &primary.customers {
        *frequency.entry(c.repetition).or_default() += 1;
    }

    let by_discount = behavior_by_discount(records, year, &thresholds)?;

    Ok(LoyaltySegmentation {
        year,
        primary,
        thresholds,
        behaviors,
        frequency: frequency.into_iter().collect(),
        by_discount,
    })
}

fn behavior_by_discount(
    records: &[SalesRecord],
    year: i32,
    thresholds: &Thresholds,
) -> Result<BehaviorByDiscount, AppError> {
    let discount_idx = CUSTOMER_DISCOUNT_KEYS
        .iter()
        .position(|k| *k == GroupKey::Discount)
        .ok_or_else(|| AppError::new(4, "Discount rollup is missing its discount key."))?;
    let discount_rollup = rollup(records, year, &CUSTOMER_DISCOUNT_KEYS);

    let mut counts = BTreeMap::new();
    for customer in &discount_rollup.customers {
        let KeyValue::Discount(level) = &customer.key[discount_idx] else {
            return Err(AppError::new(4, "Discount rollup produced a non-discount key."));
        };
        *counts
            .entry((thresholds.classify(customer.repetition), *level))
            .or_default() += 1;
    }

    let mut levels: Vec<DiscountLevel> = counts.keys().map(|(_, l)| *l).collect();
    levels.sort();
    levels.dedup();

    Ok(BehaviorByDiscount { levels, counts })
}

impl LoyaltySegmentation {
    pub fn orders_table(&self) -> Result<Table, AppError> {
        let mut table = Table::new(ORDERS_TABLE_NAME, key_columns(&self.primary.keys, true));
        table.columns.extend(["Row of Invoice".to_string(), "Sum Value of Order".to_string()]);
        for order in &self.primary.orders {
            let mut cells: Vec<Cell> = order.key.iter().map(KeyValue::to_cell).collect();
            cells.push(Cell::Int(order.lines as i64));
            cells.push(Cell::Float(round_to(order.value, 2)));
            table.push_row(cells)?;
        }
        Ok(table)
    }

    pub fn customers_table(&self) -> Result<Table, AppError> {
        self.customer_table(CUSTOMERS_TABLE_NAME, false)
    }

    pub fn classified_table(&self) -> Result<Table, AppError> {
        self.customer_table(CLASSIFIED_TABLE_NAME, true)
    }

    fn customer_table(&self, name: &str, with_behavior: bool) -> Result<Table, AppError> {
        let mut table = Table::new(name, key_columns(&self.primary.keys, false));
        table.columns.extend(["Sales Repetition".to_string(), "Sum Value of Order".to_string()]);
        if with_behavior {
            table.columns.push("Customer Behavior".to_string());
        }
        for (customer, behavior) in self.primary.customers.iter().zip(&self.behaviors) {
            let mut cells: Vec<Cell> = customer.key.iter().map(KeyValue::to_cell).collect();
            cells.push(Cell::Int(customer.repetition as i64));
            cells.push(Cell::Float(round_to(customer.value, 2)));
            if with_behavior {
                cells.push(Cell::text(behavior.label()));
            }
            table.push_row(cells)?;
        }
        Ok(table)
    }

    /// Rows: every behavior class. Columns: discount levels present in the target year.
    pub fn by_discount_table(&self) -> Result<Table, AppError> {
        let mut columns = vec!["Customer Behavior".to_string()];
        columns.extend(self.by_discount.levels.iter().map(|l| l.to_string()));

        let mut table = Table::new(BY_DISCOUNT_TABLE_NAME, columns);
        for behavior in CustomerBehavior::ALL {
            let mut cells = vec![Cell::text(behavior.label())];
            cells.extend(
                self.by_discount
                    .levels
                    .iter()
                    .map(|&l| Cell::Int(self.by_discount.count(behavior, l) as i64)),
            );
            table.push_row(cells)?;
        }
        Ok(table)
    }

    pub fn frequency_chart(&self) -> Chart {
        Chart {
            name: FREQUENCY_CHART_NAME.to_string(),
            title: "Customer Purchase Frequency Distribution".to_string(),
            spec: ChartSpec::Scatter(ScatterChart {
                x_label: format!("Number of Purchases in {}", self.year),
                y_label: "Number of Customers".to_string(),
                points: self
                    .frequency
                    .iter()
                    .map(|&(repetition, customers)| (repetition as f64, customers as f64))
                    .collect(),
            }),
        }
    }
}

fn key_columns(keys: &[GroupKey], with_order: bool) -> Vec<String> {
    let mut columns: Vec<String> = keys.iter().map(|k| k.column_name().to_string()).collect();
    if with_order {
        columns.push(GroupKey::Order.column_name().to_string());
    }
    columns
}
