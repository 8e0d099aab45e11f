//! Shared analysis pipeline used by the CLI and by tests.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> calendar enrichment -> seasonal -> product share -> monthly trend
//! -> discount impact -> channel share -> loyalty
//!
//! Every finished table and chart goes to the injected `ReportSink`, so the
//! front-end decides where output lands.

use tracing::{info, warn};

use crate::analysis::{
    ChannelShare, DiscountImpact, LoyaltySegmentation, MonthlyTrend, ProductShare, SeasonalSales, channel_share,
    discount_impact, enrich, loyalty_segmentation, monthly_trend, seasonal_sales, years_present,
    yearly_product_share,
};
use crate::domain::{AnalysisConfig, Transaction};
use crate::error::AppError;
use crate::io::ingest::load_transactions;
use crate::io::sink::ReportSink;

/// All computed outputs of a single `sales run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub rows: usize,
    pub years: Vec<i32>,
    pub target_year: i32,
    pub seasonal: SeasonalSales,
    pub product_share: ProductShare,
    pub monthly: MonthlyTrend,
    pub discount: DiscountImpact,
    pub channel: ChannelShare,
    pub loyalty: LoyaltySegmentation,
}

/// Load the configured input CSV and run every pass.
pub fn run_from_file(config: &AnalysisConfig, sink: &mut dyn ReportSink) -> Result<RunOutput, AppError> {
    let transactions = load_transactions(&config.input_path)?;
    info!(rows = transactions.len(), path = %config.input_path.display(), "loaded transactions");
    run_analysis(transactions, config, sink)
}

/// Run every analysis pass in order, emitting each report as soon as it is ready.
pub fn run_analysis(
    transactions: Vec<Transaction>,
    config: &AnalysisConfig,
    sink: &mut dyn ReportSink,
) -> Result<RunOutput, AppError> {
    config.validate()?;

    let records = enrich(transactions)?;
    let years = years_present(&records);
    let Some(&latest) = years.last() else {
        return Err(AppError::new(3, "No transactions to analyze."));
    };
    if years.len() == 1 {
        warn!(year = latest, "only one year present; year-over-year reports have a single column");
    }
    let target_year = config.target_year.unwrap_or(latest);

    let seasonal = seasonal_sales(&records)?;
    sink.table(&seasonal.to_table()?)?;
    if config.charts {
        sink.chart(&seasonal.chart())?;
    }
    info!(seasons = seasonal.seasons.len(), "seasonal sales done");

    let product_share = yearly_product_share(&records)?;
    sink.table(&product_share.to_table()?)?;
    info!(products = product_share.rows.len(), "yearly product share done");

    let monthly = monthly_trend(&records, config.trend_scale)?;
    sink.table(&monthly.to_table()?)?;
    if config.charts {
        sink.chart(&monthly.chart())?;
    }
    info!(months = monthly.months.len(), "monthly trend done");

    let discount = discount_impact(&records, config.alpha)?;
    sink.table(&discount.to_table()?)?;
    sink.table(&discount.ttest_table()?)?;
    for v in &discount.verdicts {
        info!(
            discount = %v.level,
            t_stat = v.test.t_stat,
            p_value = v.test.p_value,
            verdict = v.label(),
            "discount t-test"
        );
    }

    let channel = channel_share(&records)?;
    sink.table(&channel.to_table()?)?;
    if config.charts {
        sink.chart(&channel.chart())?;
    }
    info!(customer_types = channel.customer_types.len(), "channel share done");

    let loyalty = loyalty_segmentation(&records, target_year)?;
    sink.table(&loyalty.orders_table()?)?;
    sink.table(&loyalty.customers_table()?)?;
    sink.table(&loyalty.classified_table()?)?;
    sink.table(&loyalty.by_discount_table()?)?;
    if config.charts {
        sink.chart(&loyalty.frequency_chart())?;
    }
    info!(
        year = target_year,
        customers = loyalty.primary.customers.len(),
        q1 = loyalty.thresholds.q1,
        q3 = loyalty.thresholds.q3,
        "loyalty segmentation done"
    );

    Ok(RunOutput {
        rows: records.len(),
        years,
        target_year,
        seasonal,
        product_share,
        monthly,
        discount,
        channel,
        loyalty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleConfig, generate_transactions};
    use crate::io::sink::MemorySink;

    fn sample() -> Vec<Transaction> {
        generate_transactions(&SampleConfig {
            rows: 800,
            seed: 11,
            years: vec![2021, 2022, 2023],
            customers: 60,
        })
        .unwrap()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig::new("unused.csv", "unused")
    }

    #[test]
    fn emits_every_table_and_chart() {
        let mut sink = MemorySink::default();
        let run = run_analysis(sample(), &config(), &mut sink).unwrap();

        let names: Vec<&str> = sink.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "seasonal_sales_analysis",
                "yearly_product_sales",
                "monthly_sales_trend",
                "sales_per_discount",
                "discount_ttest_results",
                "customer_type_category_share",
                "loyal_customers",
                "customer_invoice_analysis",
                "customer_behavior_classification",
                "customer_behavior_per_discount",
            ]
        );
        assert_eq!(sink.charts.len(), 4);
        assert_eq!(run.rows, 800);
        assert_eq!(run.target_year, 2023);
        assert_eq!(run.discount.verdicts.len(), 3);

        let channel = sink.table_named("customer_type_category_share").unwrap();
        for customer_type in &run.channel.customer_types {
            let sum: f64 = channel.numeric_column(customer_type).unwrap().iter().sum();
            assert!((sum - 100.0).abs() < 0.05, "{customer_type} sums to {sum}");
        }
    }

    #[test]
    fn reruns_are_byte_identical() {
        let mut first = MemorySink::default();
        let mut second = MemorySink::default();
        run_analysis(sample(), &config(), &mut first).unwrap();
        run_analysis(sample(), &config(), &mut second).unwrap();

        for (a, b) in first.tables.iter().zip(&second.tables) {
            assert_eq!(a.to_csv().unwrap(), b.to_csv().unwrap(), "table {} differs", a.name);
        }
        assert_eq!(first.charts, second.charts);
    }

    #[test]
    fn charts_can_be_disabled() {
        let mut sink = MemorySink::default();
        let config = AnalysisConfig { charts: false, ..config() };
        run_analysis(sample(), &config, &mut sink).unwrap();
        assert!(sink.charts.is_empty());
        assert_eq!(sink.tables.len(), 10);
    }

    #[test]
    fn explicit_target_year_drives_loyalty() {
        let mut sink = MemorySink::default();
        let earliest = AnalysisConfig { target_year: Some(2021), ..config() };
        let run = run_analysis(sample(), &earliest, &mut sink).unwrap();
        assert_eq!(run.loyalty.year, 2021);

        let missing = AnalysisConfig { target_year: Some(1999), ..config() };
        let err = run_analysis(sample(), &missing, &mut MemorySink::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn classification_partitions_customers() {
        let run = run_analysis(sample(), &config(), &mut MemorySink::default()).unwrap();
        let loyalty = &run.loyalty;
        assert_eq!(loyalty.behaviors.len(), loyalty.primary.customers.len());
        for (c, b) in loyalty.primary.customers.iter().zip(&loyalty.behaviors) {
            assert_eq!(*b, loyalty.thresholds.classify(c.repetition));
        }
    }

    #[test]
    fn run_from_file_reads_generated_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sales.csv");
        crate::io::export::write_transactions_csv(&input, &sample()).unwrap();

        let config = AnalysisConfig::new(&input, dir.path().join("reports"));
        let mut sink = MemorySink::default();
        let run = run_from_file(&config, &mut sink).unwrap();
        assert_eq!(run.rows, 800);
        assert_eq!(run.years, vec![2021, 2022, 2023]);
    }
}
