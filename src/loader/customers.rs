//! Customer phase: dedup by source customer id, insert canonical rows.

use super::{BatchCommitter, LoadOutcome, SkipReason};
use crate::coerce::{coerce_numeric, coerce_text};
use crate::db::models::NewCustomer;
use crate::dedup::{customer_key, dedup_first_by, SourceCustomerId};
use crate::error::SinkError;
use crate::sink::Sink;
use crate::source::SourceRow;
use tracing::{debug, info};

/// Email used when the source has none for a customer.
pub fn placeholder_email(id: SourceCustomerId) -> String {
    format!("customer_{}@placeholder.com", id)
}

/// Map a canonical source row to an insertable customer.
pub fn build_customer(id: SourceCustomerId, row: &SourceRow) -> NewCustomer {
    NewCustomer {
        customer_email: coerce_text(&row.customer_email).unwrap_or_else(|| placeholder_email(id)),
        customer_fname: coerce_text(&row.customer_fname).unwrap_or_default(),
        customer_lname: coerce_text(&row.customer_lname).unwrap_or_default(),
        customer_segment: coerce_text(&row.customer_segment),
        customer_city: coerce_text(&row.customer_city),
        customer_state: coerce_text(&row.customer_state),
        customer_country: coerce_text(&row.customer_country),
        customer_zipcode: coerce_text(&row.customer_zipcode),
        customer_street: coerce_text(&row.customer_street),
        latitude: coerce_numeric(&row.latitude),
        longitude: coerce_numeric(&row.longitude),
    }
}

/// Insert one customer per distinct source id, first occurrence wins.
pub fn load_customers<S: Sink + ?Sized>(
    rows: &[SourceRow],
    sink: &mut S,
    batch_size: usize,
) -> Result<LoadOutcome<SourceCustomerId>, SinkError> {
    let unique = dedup_first_by(rows, customer_key);
    info!(
        unique = unique.len(),
        excluded = unique.excluded,
        duplicates = unique.duplicates,
        "Importing customers"
    );

    let mut outcome = LoadOutcome {
        candidates: unique.len(),
        ..Default::default()
    };
    let mut committer = BatchCommitter::new("customers", batch_size);

    for (&id, row) in unique.iter() {
        match sink.insert_customer(&build_customer(id, row)) {
            Ok(key) => {
                outcome.inserted.insert(id, key);
                committer.record(sink)?;
            }
            Err(e) => {
                debug!(customer_id = id, error = %e, "Customer insert failed");
                outcome.skipped.record(SkipReason::Error);
            }
        }
    }

    committer.finish(sink)?;
    info!(
        imported = outcome.imported(),
        skipped = %outcome.skipped,
        "Imported customers"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldValue;
    use crate::sink::{MemorySink, SinkRecord};

    fn row(id: &str, email: &str, fname: &str) -> SourceRow {
        SourceRow {
            customer_id: FieldValue::from_raw(id),
            customer_email: FieldValue::from_raw(email),
            customer_fname: FieldValue::from_raw(fname),
            latitude: FieldValue::from_raw("18.25"),
            longitude: FieldValue::from_raw("not a number"),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_customer_defaults() {
        let customer = build_customer(42, &row("42", "", ""));

        assert_eq!(customer.customer_email, "customer_42@placeholder.com");
        assert_eq!(customer.customer_fname, "");
        assert_eq!(customer.customer_lname, "");
        assert_eq!(customer.customer_segment, None);
        assert_eq!(customer.latitude, Some(18.25));
        assert_eq!(customer.longitude, None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let rows = vec![
            row("1", "first@example.com", "Ann"),
            row("2", "two@example.com", "Bob"),
            row("1.0", "second@example.com", "Ann-Marie"),
        ];
        let mut sink = MemorySink::new();
        let outcome = load_customers(&rows, &mut sink, 1000).unwrap();

        assert_eq!(outcome.candidates, 2);
        assert_eq!(outcome.imported(), 2);
        let stored = &sink.customers()[0].1;
        assert_eq!(stored.customer_email, "first@example.com");
        assert_eq!(stored.customer_fname, "Ann");
    }

    #[test]
    fn test_rows_without_id_are_excluded() {
        let rows = vec![row("", "a@example.com", "A"), row("abc", "b@example.com", "B")];
        let mut sink = MemorySink::new();
        let outcome = load_customers(&rows, &mut sink, 1000).unwrap();

        assert_eq!(outcome.candidates, 0);
        assert!(outcome.inserted.is_empty());
        assert!(sink.customers().is_empty());
    }

    #[test]
    fn test_insert_failure_is_tallied_and_skipped() {
        let rows = vec![
            row("1", "ok@example.com", "A"),
            row("2", "reject@example.com", "B"),
            row("3", "ok3@example.com", "C"),
        ];
        let mut sink = MemorySink::new().with_rejection(|record| {
            matches!(record, SinkRecord::Customer(c) if c.customer_email.starts_with("reject"))
        });
        let outcome = load_customers(&rows, &mut sink, 1).unwrap();

        assert_eq!(outcome.imported(), 2);
        assert_eq!(outcome.skipped.error, 1);
        assert!(!outcome.inserted.contains_key(&2));
        assert_eq!(sink.customers().len(), 2);
    }

    #[test]
    fn test_commits_in_batches() {
        let rows: Vec<SourceRow> = (1..=5)
            .map(|i| row(&i.to_string(), "x@example.com", "X"))
            .collect();
        let mut sink = MemorySink::new();
        load_customers(&rows, &mut sink, 2).unwrap();

        // two full batches plus the final commit
        assert_eq!(sink.commit_count(), 3);
        assert_eq!(sink.pending_rows(), 0);
    }
}
