//! Shipping phase: second pass over the source, attached by row position.

use super::{BatchCommitter, KeyMap, ShippingOutcome, SkipReason};
use crate::coerce::{coerce_i32, coerce_text, coerce_timestamp};
use crate::db::models::NewShipping;
use crate::error::SinkError;
use crate::sink::{GeneratedKey, Sink};
use crate::source::{RowPosition, SourceRow};
use tracing::{debug, info};

pub fn build_shipping(row: &SourceRow, order_id: GeneratedKey) -> NewShipping {
    NewShipping {
        order_id,
        shipping_date: coerce_timestamp(&row.shipping_date),
        shipping_mode: coerce_text(&row.shipping_mode),
        days_for_shipping_real: coerce_i32(&row.days_for_shipping_real),
        days_for_shipment_scheduled: coerce_i32(&row.days_for_shipment_scheduled),
        delivery_status: coerce_text(&row.delivery_status),
        late_delivery_risk: coerce_i32(&row.late_delivery_risk),
    }
}

/// Insert a shipping record for every row whose order was created.
pub fn load_shipping<S: Sink + ?Sized>(
    rows: &[SourceRow],
    orders: &KeyMap<RowPosition>,
    sink: &mut S,
    batch_size: usize,
) -> Result<ShippingOutcome, SinkError> {
    info!(candidates = rows.len(), orders = orders.len(), "Importing shipping");

    let mut outcome = ShippingOutcome {
        candidates: rows.len(),
        ..Default::default()
    };
    let mut committer = BatchCommitter::new("shipping", batch_size);

    for (position, row) in rows.iter().enumerate() {
        let Some(&order_id) = orders.get(&position) else {
            debug!(row = position, "Shipping skipped, no order");
            outcome.skipped.record(SkipReason::NoOrder);
            continue;
        };

        match sink.insert_shipping(&build_shipping(row, order_id)) {
            Ok(()) => committer.record(sink)?,
            Err(e) => {
                debug!(row = position, error = %e, "Shipping insert failed");
                outcome.skipped.record(SkipReason::Error);
            }
        }
    }

    outcome.imported = committer.finish(sink)?;
    info!(
        imported = outcome.imported,
        skipped = %outcome.skipped,
        "Imported shipping"
    );
    Ok(outcome)
}
