//! Product phase: dedup by trimmed product name, insert canonical rows.

use super::{BatchCommitter, LoadOutcome, SkipReason};
use crate::coerce::{coerce_i32, coerce_numeric, coerce_text};
use crate::db::models::NewProduct;
use crate::dedup::{dedup_first_by, product_key};
use crate::error::SinkError;
use crate::sink::Sink;
use crate::source::SourceRow;
use tracing::{debug, info};

pub fn build_product(name: &str, row: &SourceRow) -> NewProduct {
    NewProduct {
        product_name: name.to_string(),
        product_card_id: coerce_i32(&row.product_card_id),
        category_name: coerce_text(&row.category_name),
        department_name: coerce_text(&row.department_name),
        product_price: coerce_numeric(&row.product_price),
        product_description: coerce_text(&row.product_description),
        product_image: coerce_text(&row.product_image),
        product_status: coerce_i32(&row.product_status),
    }
}

/// Insert one product per distinct name, first occurrence wins.
///
/// Blank names and the `nan` placeholder never become products.
pub fn load_products<S: Sink + ?Sized>(
    rows: &[SourceRow],
    sink: &mut S,
    batch_size: usize,
) -> Result<LoadOutcome<String>, SinkError> {
    let unique = dedup_first_by(rows, product_key);
    info!(
        unique = unique.len(),
        excluded = unique.excluded,
        duplicates = unique.duplicates,
        "Importing products"
    );

    let mut outcome = LoadOutcome {
        candidates: unique.len(),
        ..Default::default()
    };
    let mut committer = BatchCommitter::new("products", batch_size);

    for (name, row) in unique.iter() {
        match sink.insert_product(&build_product(name, row)) {
            Ok(key) => {
                outcome.inserted.insert(name.clone(), key);
                committer.record(sink)?;
            }
            Err(e) => {
                debug!(product = %name, error = %e, "Product insert failed");
                outcome.skipped.record(SkipReason::Error);
            }
        }
    }

    committer.finish(sink)?;
    info!(
        imported = outcome.imported(),
        skipped = %outcome.skipped,
        "Imported products"
    );
    Ok(outcome)
}
