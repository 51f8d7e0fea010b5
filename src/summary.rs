//! Post-run reporting.
//!
//! [`TableSummary`] is computed by the sink from final table state only.
//! [`RunReport`] adds the per-phase outcomes and timing of one run.

use crate::loader::{LoadOutcome, ShippingOutcome, SkipTally};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::hash::Hash;

/// Row counts and business metrics over the normalized tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub customers: i64,
    pub products: i64,
    pub orders: i64,
    pub shipping_details: i64,
    pub order_metrics: Option<OrderMetrics>,
    pub delivery: Option<DeliveryPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderMetrics {
    pub orders: i64,
    /// Sum of sales.
    pub revenue: f64,
    pub average_sale: f64,
    /// Sum of ordered quantities.
    pub units: i64,
}

impl OrderMetrics {
    /// `None` when there are no orders.
    pub fn from_totals(
        orders: i64,
        revenue: Option<f64>,
        average_sale: Option<f64>,
        units: Option<i64>,
    ) -> Option<Self> {
        if orders == 0 {
            return None;
        }
        Some(Self {
            orders,
            revenue: revenue.unwrap_or(0.0),
            average_sale: average_sale.unwrap_or(0.0),
            units: units.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryPerformance {
    pub late: i64,
    pub on_time: i64,
    /// Percentage of all shipping rows delivered on time, two decimals.
    pub on_time_rate: f64,
}

impl DeliveryPerformance {
    /// `None` when there are no shipping rows.
    ///
    /// Rows with an absent flag count toward `total` but neither bucket.
    pub fn from_counts(late: i64, on_time: i64, total: i64) -> Option<Self> {
        if total <= 0 {
            return None;
        }
        let rate = on_time as f64 * 100.0 / total as f64;
        Some(Self {
            late,
            on_time,
            on_time_rate: (rate * 100.0).round() / 100.0,
        })
    }
}

/// Outcome of one entity phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseSummary {
    pub candidates: usize,
    pub imported: usize,
    pub skipped: SkipTally,
}

impl<K: Hash + Eq> From<&LoadOutcome<K>> for PhaseSummary {
    fn from(outcome: &LoadOutcome<K>) -> Self {
        Self {
            candidates: outcome.candidates,
            imported: outcome.imported(),
            skipped: outcome.skipped.clone(),
        }
    }
}

impl From<&ShippingOutcome> for PhaseSummary {
    fn from(outcome: &ShippingOutcome) -> Self {
        Self {
            candidates: outcome.candidates,
            imported: outcome.imported,
            skipped: outcome.skipped.clone(),
        }
    }
}

/// Everything a completed run reports.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub source: String,
    pub source_rows: usize,
    pub customers: PhaseSummary,
    pub products: PhaseSummary,
    pub orders: PhaseSummary,
    pub shipping: PhaseSummary,
    pub tables: TableSummary,
}

const RULE_WIDTH: usize = 60;

/// `1234567` as `1,234,567`.
fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

/// Currency amount with two decimals and grouped thousands.
fn money(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{}{}.{:02}", sign, thousands(cents / 100), cents % 100)
}

fn write_phase(f: &mut fmt::Formatter<'_>, label: &str, phase: &PhaseSummary) -> fmt::Result {
    write!(
        f,
        "  {:20} {:>12} of {}",
        label,
        thousands(phase.imported as i64),
        thousands(phase.candidates as i64)
    )?;
    if phase.skipped.total() > 0 {
        write!(f, "  (skipped: {})", phase.skipped)?;
    }
    writeln!(f)
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Table Counts:")?;
        for (table, count) in [
            ("customers", self.customers),
            ("products", self.products),
            ("orders", self.orders),
            ("shipping_details", self.shipping_details),
        ] {
            writeln!(f, "  {:20} {:>12}", table, thousands(count))?;
        }

        writeln!(f, "\nBusiness Metrics:")?;
        match &self.order_metrics {
            Some(m) => {
                writeln!(f, "  {:20} {:>12}", "Orders", thousands(m.orders))?;
                writeln!(f, "  {:17} ${:>13}", "Revenue", money(m.revenue))?;
                writeln!(f, "  {:17} ${:>13}", "Avg Order", money(m.average_sale))?;
                writeln!(f, "  {:20} {:>12}", "Units", thousands(m.units))?;
            }
            None => writeln!(f, "  (no orders)")?,
        }

        writeln!(f, "\nDelivery Performance:")?;
        match &self.delivery {
            Some(d) => {
                writeln!(f, "  {:20} {:>12}", "Late", thousands(d.late))?;
                writeln!(f, "  {:20} {:>12}", "On-Time", thousands(d.on_time))?;
                writeln!(f, "  {:20} {:>11.2}%", "On-Time Rate", d.on_time_rate)?;
            }
            None => writeln!(f, "  (no shipping records)")?,
        }
        Ok(())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "Import Summary")?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(
            f,
            "Source: {} ({} rows)",
            self.source,
            thousands(self.source_rows as i64)
        )?;

        writeln!(f, "\nImported:")?;
        write_phase(f, "Customers", &self.customers)?;
        write_phase(f, "Products", &self.products)?;
        write_phase(f, "Orders", &self.orders)?;
        write_phase(f, "Shipping", &self.shipping)?;

        writeln!(f)?;
        write!(f, "{}", self.tables)?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        write!(f, "✓ Completed in {:.1}s", self.elapsed_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_rate_rounding() {
        let d = DeliveryPerformance::from_counts(1, 2, 3).unwrap();
        assert_eq!(d.on_time_rate, 66.67);
    }

    #[test]
    fn test_delivery_rate_counts_unflagged_rows() {
        let d = DeliveryPerformance::from_counts(1, 1, 4).unwrap();
        assert_eq!(d.on_time_rate, 25.0);
    }

    #[test]
    fn test_no_shipping_rows() {
        assert!(DeliveryPerformance::from_counts(0, 0, 0).is_none());
    }

    #[test]
    fn test_order_metrics_absent_without_orders() {
        assert!(OrderMetrics::from_totals(0, None, None, None).is_none());
        let m = OrderMetrics::from_totals(2, Some(30.0), Some(15.0), None).unwrap();
        assert_eq!(m.units, 0);
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(-1234567), "-1,234,567");
    }

    #[test]
    fn test_money() {
        assert_eq!(money(1234.5), "1,234.50");
        assert_eq!(money(0.004), "0.00");
    }

    #[test]
    fn test_table_summary_display() {
        let summary = TableSummary {
            customers: 1200,
            products: 3,
            orders: 0,
            shipping_details: 0,
            order_metrics: None,
            delivery: None,
        };
        let text = summary.to_string();
        assert!(text.contains("customers"));
        assert!(text.contains("1,200"));
        assert!(text.contains("(no orders)"));
    }
}
