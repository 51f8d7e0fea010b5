//! Order phase: every source row is an order candidate.
//!
//! A row becomes an order only when both its customer and its product
//! resolved to generated keys in the earlier phases. The customer is checked
//! first; a row missing both is tallied as `no_customer`.

use super::{BatchCommitter, KeyMap, LoadOutcome, SkipReason};
use crate::coerce::{coerce_i32, coerce_numeric, coerce_text, coerce_timestamp};
use crate::db::models::NewOrder;
use crate::dedup::{customer_key, product_key, SourceCustomerId};
use crate::error::SinkError;
use crate::sink::{GeneratedKey, Sink};
use crate::source::{RowPosition, SourceRow};
use tracing::{debug, info};

pub fn build_order(row: &SourceRow, customer_id: GeneratedKey, product_id: GeneratedKey) -> NewOrder {
    let ordered_at = coerce_timestamp(&row.order_date);
    NewOrder {
        order_item_id: coerce_i32(&row.order_item_id),
        customer_id,
        product_id,
        order_date: ordered_at.map(|ts| ts.date()),
        order_date_dateorders: ordered_at,
        order_quantity: coerce_i32(&row.order_item_quantity),
        sales: coerce_numeric(&row.sales_per_customer),
        discount: coerce_numeric(&row.order_item_discount),
        profit_per_order: coerce_numeric(&row.order_profit_per_order),
        order_status: coerce_text(&row.order_status),
        market: coerce_text(&row.market),
        order_region: coerce_text(&row.order_region),
        order_country: coerce_text(&row.order_country),
        order_city: coerce_text(&row.order_city),
        order_state: coerce_text(&row.order_state),
        order_zipcode: coerce_text(&row.order_zipcode),
    }
}

/// Resolve a row's foreign keys, customer first.
pub fn resolve(
    row: &SourceRow,
    customers: &KeyMap<SourceCustomerId>,
    products: &KeyMap<String>,
) -> Result<(GeneratedKey, GeneratedKey), SkipReason> {
    let customer = customer_key(row)
        .and_then(|id| customers.get(&id).copied())
        .ok_or(SkipReason::NoCustomer)?;
    let product = product_key(row)
        .and_then(|name| products.get(&name).copied())
        .ok_or(SkipReason::NoProduct)?;
    Ok((customer, product))
}

/// Insert one order per resolvable source row, keyed by row position.
pub fn load_orders<S: Sink + ?Sized>(
    rows: &[SourceRow],
    customers: &KeyMap<SourceCustomerId>,
    products: &KeyMap<String>,
    sink: &mut S,
    batch_size: usize,
) -> Result<LoadOutcome<RowPosition>, SinkError> {
    info!(candidates = rows.len(), "Importing orders");

    let mut outcome = LoadOutcome {
        candidates: rows.len(),
        ..Default::default()
    };
    let mut committer = BatchCommitter::new("orders", batch_size);

    for (position, row) in rows.iter().enumerate() {
        let (customer_id, product_id) = match resolve(row, customers, products) {
            Ok(keys) => keys,
            Err(reason) => {
                debug!(row = position, reason = %reason, "Order skipped");
                outcome.skipped.record(reason);
                continue;
            }
        };

        match sink.insert_order(&build_order(row, customer_id, product_id)) {
            Ok(key) => {
                outcome.inserted.insert(position, key);
                committer.record(sink)?;
            }
            Err(e) => {
                debug!(row = position, error = %e, "Order insert failed");
                outcome.skipped.record(SkipReason::Error);
            }
        }
    }

    committer.finish(sink)?;
    info!(
        imported = outcome.imported(),
        skipped = %outcome.skipped,
        "Imported orders"
    );
    Ok(outcome)
}
