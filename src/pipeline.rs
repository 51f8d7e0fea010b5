//! Import orchestration.
//!
//! Phases run in a fixed order and are never re-entered:
//!
//! ```text
//! LoadSource -> LoadCustomers -> LoadProducts -> LoadOrders -> LoadShipping -> Summarize
//! ```
//!
//! Connecting to the sink happens before the pipeline is constructed. Any
//! error escaping a phase aborts the run after a rollback of the open
//! transaction scope; work committed by earlier batches stays committed.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::loader::{load_customers, load_orders, load_products, load_shipping};
use crate::sink::Sink;
use crate::source::SourceReader;
use crate::summary::{PhaseSummary, RunReport};
use chrono::Utc;
use std::fmt;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    LoadSource,
    LoadCustomers,
    LoadProducts,
    LoadOrders,
    LoadShipping,
    Summarize,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::LoadSource => "load_source",
            Phase::LoadCustomers => "load_customers",
            Phase::LoadProducts => "load_products",
            Phase::LoadOrders => "load_orders",
            Phase::LoadShipping => "load_shipping",
            Phase::Summarize => "summarize",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the phases against a source and a sink.
#[derive(Debug, Clone)]
pub struct ImportPipeline {
    batch_size: usize,
}

impl ImportPipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            batch_size: config.batch_size,
        }
    }

    /// Run every phase once.
    ///
    /// Per-row failures are reported in the returned [`RunReport`]; only
    /// errors that abort the run are returned as `Err`.
    pub fn run<R, S>(&self, source: &R, sink: &mut S) -> Result<RunReport>
    where
        R: SourceReader + ?Sized,
        S: Sink + ?Sized,
    {
        let mut phase = Phase::LoadSource;
        match self.execute(source, sink, &mut phase) {
            Ok(report) => Ok(report),
            Err(e) => {
                error!(phase = %phase, error = %e, "Import aborted");
                if let Err(rollback) = sink.rollback() {
                    warn!(error = %rollback, "Rollback after abort failed");
                }
                Err(e)
            }
        }
    }

    fn execute<R, S>(&self, source: &R, sink: &mut S, phase: &mut Phase) -> Result<RunReport>
    where
        R: SourceReader + ?Sized,
        S: Sink + ?Sized,
    {
        let started_at = Utc::now();
        let timer = Instant::now();

        *phase = Phase::LoadSource;
        info!(phase = %phase, source = %source.describe(), "Phase started");
        let table = source.read()?;
        let rows = &table.rows;

        *phase = Phase::LoadCustomers;
        let customers = load_customers(rows, sink, self.batch_size)?;

        *phase = Phase::LoadProducts;
        let products = load_products(rows, sink, self.batch_size)?;

        *phase = Phase::LoadOrders;
        let orders = load_orders(rows, &customers.inserted, &products.inserted, sink, self.batch_size)?;

        *phase = Phase::LoadShipping;
        let shipping = load_shipping(rows, &orders.inserted, sink, self.batch_size)?;

        *phase = Phase::Summarize;
        let tables = sink.summarize()?;

        let elapsed = timer.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "Import finished");

        Ok(RunReport {
            started_at,
            elapsed_secs: elapsed.as_secs_f64(),
            source: source.describe(),
            source_rows: rows.len(),
            customers: PhaseSummary::from(&customers),
            products: PhaseSummary::from(&products),
            orders: PhaseSummary::from(&orders),
            shipping: PhaseSummary::from(&shipping),
            tables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewCustomer, NewOrder, NewProduct, NewShipping};
    use crate::entity::FieldValue;
    use crate::error::{PipelineError, SinkError, SourceError};
    use crate::sink::{GeneratedKey, MemorySink};
    use crate::source::{SourceRow, SourceTable};
    use crate::summary::TableSummary;

    struct MissingSource;

    impl SourceReader for MissingSource {
        fn read(&self) -> std::result::Result<SourceTable, SourceError> {
            Err(SourceError::NotFound("missing.csv".into()))
        }

        fn describe(&self) -> String {
            "missing.csv".to_string()
        }
    }

    /// Delegates to a [`MemorySink`] but fails every commit after the first `ok_commits`.
    struct FailingCommits {
        inner: MemorySink,
        ok_commits: usize,
        rollbacks: usize,
    }

    impl Sink for FailingCommits {
        fn insert_customer(&mut self, c: &NewCustomer) -> std::result::Result<GeneratedKey, SinkError> {
            self.inner.insert_customer(c)
        }

        fn insert_product(&mut self, p: &NewProduct) -> std::result::Result<GeneratedKey, SinkError> {
            self.inner.insert_product(p)
        }

        fn insert_order(&mut self, o: &NewOrder) -> std::result::Result<GeneratedKey, SinkError> {
            self.inner.insert_order(o)
        }

        fn insert_shipping(&mut self, s: &NewShipping) -> std::result::Result<(), SinkError> {
            self.inner.insert_shipping(s)
        }

        fn commit(&mut self) -> std::result::Result<(), SinkError> {
            if self.inner.commit_count() >= self.ok_commits {
                return Err(SinkError::Rejected("commit refused".to_string()));
            }
            self.inner.commit()
        }

        fn rollback(&mut self) -> std::result::Result<(), SinkError> {
            self.rollbacks += 1;
            self.inner.rollback()
        }

        fn summarize(&mut self) -> std::result::Result<TableSummary, SinkError> {
            self.inner.summarize()
        }
    }

    fn row(customer: &str, product: &str) -> SourceRow {
        SourceRow {
            customer_id: FieldValue::from_raw(customer),
            product_name: FieldValue::from_raw(product),
            late_delivery_risk: FieldValue::from_raw("0"),
            ..Default::default()
        }
    }

    #[test]
    fn test_phase_order_and_report() {
        let source = SourceTable::from_rows(vec![row("1", "Widget"), row("1", "Widget"), row("2", "")]);
        let mut sink = MemorySink::new();
        let report = ImportPipeline::new(&PipelineConfig::default())
            .run(&source, &mut sink)
            .unwrap();

        assert_eq!(report.source_rows, 3);
        assert_eq!(report.customers.imported, 2);
        assert_eq!(report.products.imported, 1);
        assert_eq!(report.orders.imported, 2);
        assert_eq!(report.orders.skipped.no_product, 1);
        assert_eq!(report.shipping.imported, 2);
        assert_eq!(report.shipping.skipped.no_order, 1);
        assert_eq!(report.tables.shipping_details, 2);
        assert_eq!(report.tables.delivery.as_ref().unwrap().on_time_rate, 100.0);
    }

    #[test]
    fn test_source_failure_aborts_with_rollback() {
        let mut sink = MemorySink::new();
        let err = ImportPipeline::new(&PipelineConfig::default())
            .run(&MissingSource, &mut sink)
            .unwrap_err();

        assert!(matches!(err, PipelineError::Source(SourceError::NotFound(_))));
        assert_eq!(sink.rollback_count(), 1);
    }

    #[test]
    fn test_commit_failure_aborts_run() {
        let source = SourceTable::from_rows(vec![row("1", "Widget"), row("2", "Widget")]);
        let mut sink = FailingCommits {
            inner: MemorySink::new(),
            ok_commits: 1,
            rollbacks: 0,
        };
        let err = ImportPipeline::new(&PipelineConfig::default())
            .run(&source, &mut sink)
            .unwrap_err();

        assert!(matches!(err, PipelineError::Sink(SinkError::Rejected(_))));
        assert_eq!(sink.rollbacks, 1);
        // customers committed before the failure stay committed
        assert_eq!(sink.inner.customers().len(), 2);
        assert!(sink.inner.products().is_empty());
    }
}
