//! In-process sink.
//!
//! Behaves like the relational store as far as the loaders can observe:
//! per-table key sequences, uncommitted work discarded on rollback, and
//! foreign-key checks on orders and shipping rows. Used for dry runs.

use super::{GeneratedKey, Sink, SinkRecord};
use crate::db::models::{NewCustomer, NewOrder, NewProduct, NewShipping};
use crate::entity::Entity;
use crate::error::SinkError;
use crate::summary::{DeliveryPerformance, OrderMetrics, TableSummary};
use std::collections::HashSet;
use std::fmt;

type RejectFn = Box<dyn Fn(SinkRecord<'_>) -> bool>;

#[derive(Debug)]
struct Table<T> {
    next_key: GeneratedKey,
    committed: Vec<(GeneratedKey, T)>,
    pending: Vec<(GeneratedKey, T)>,
    /// Keys of committed and pending rows, for foreign-key checks.
    live: HashSet<GeneratedKey>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_key: 1,
            committed: Vec::new(),
            pending: Vec::new(),
            live: HashSet::new(),
        }
    }
}

impl<T> Table<T> {
    /// Keys are consumed even when the insert is later rolled back, like a sequence.
    fn insert(&mut self, record: T) -> GeneratedKey {
        let key = self.next_key;
        self.next_key += 1;
        self.pending.push((key, record));
        self.live.insert(key);
        key
    }

    fn contains(&self, key: GeneratedKey) -> bool {
        self.live.contains(&key)
    }

    fn commit(&mut self) {
        self.committed.append(&mut self.pending);
    }

    fn rollback(&mut self) {
        for (key, _) in self.pending.drain(..) {
            self.live.remove(&key);
        }
    }
}

/// Sink that keeps every table in memory.
#[derive(Default)]
pub struct MemorySink {
    customers: Table<NewCustomer>,
    products: Table<NewProduct>,
    orders: Table<NewOrder>,
    shipping: Table<NewShipping>,
    reject: Option<RejectFn>,
    commits: usize,
    rollbacks: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every insert for which `predicate` returns true.
    pub fn with_rejection<F>(mut self, predicate: F) -> Self
    where
        F: Fn(SinkRecord<'_>) -> bool + 'static,
    {
        self.reject = Some(Box::new(predicate));
        self
    }

    pub fn customers(&self) -> &[(GeneratedKey, NewCustomer)] {
        &self.customers.committed
    }

    pub fn products(&self) -> &[(GeneratedKey, NewProduct)] {
        &self.products.committed
    }

    pub fn orders(&self) -> &[(GeneratedKey, NewOrder)] {
        &self.orders.committed
    }

    pub fn shipping(&self) -> &[(GeneratedKey, NewShipping)] {
        &self.shipping.committed
    }

    /// Rows inserted since the last commit, across all tables.
    pub fn pending_rows(&self) -> usize {
        self.customers.pending.len()
            + self.products.pending.len()
            + self.orders.pending.len()
            + self.shipping.pending.len()
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }

    pub fn rollback_count(&self) -> usize {
        self.rollbacks
    }

    fn check<E: Entity>(&self, record: SinkRecord<'_>) -> Result<(), SinkError> {
        match &self.reject {
            Some(predicate) if predicate(record) => {
                Err(SinkError::Rejected(format!("{} rejected by sink", E::NAME)))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySink")
            .field("customers", &self.customers.committed.len())
            .field("products", &self.products.committed.len())
            .field("orders", &self.orders.committed.len())
            .field("shipping", &self.shipping.committed.len())
            .field("pending", &self.pending_rows())
            .field("commits", &self.commits)
            .finish()
    }
}

fn foreign_key_violation(table: &str, column: &str, key: GeneratedKey) -> SinkError {
    SinkError::Rejected(format!(
        "insert into {} violates foreign key: {} = {} does not exist",
        table, column, key
    ))
}

impl Sink for MemorySink {
    fn insert_customer(&mut self, customer: &NewCustomer) -> Result<GeneratedKey, SinkError> {
        self.check::<NewCustomer>(SinkRecord::Customer(customer))?;
        Ok(self.customers.insert(customer.clone()))
    }

    fn insert_product(&mut self, product: &NewProduct) -> Result<GeneratedKey, SinkError> {
        self.check::<NewProduct>(SinkRecord::Product(product))?;
        Ok(self.products.insert(product.clone()))
    }

    fn insert_order(&mut self, order: &NewOrder) -> Result<GeneratedKey, SinkError> {
        self.check::<NewOrder>(SinkRecord::Order(order))?;
        if !self.customers.contains(order.customer_id) {
            return Err(foreign_key_violation(NewOrder::TABLE, "customer_id", order.customer_id));
        }
        if !self.products.contains(order.product_id) {
            return Err(foreign_key_violation(NewOrder::TABLE, "product_id", order.product_id));
        }
        Ok(self.orders.insert(order.clone()))
    }

    fn insert_shipping(&mut self, shipping: &NewShipping) -> Result<(), SinkError> {
        self.check::<NewShipping>(SinkRecord::Shipping(shipping))?;
        if !self.orders.contains(shipping.order_id) {
            return Err(foreign_key_violation(NewShipping::TABLE, "order_id", shipping.order_id));
        }
        self.shipping.insert(shipping.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SinkError> {
        self.customers.commit();
        self.products.commit();
        self.orders.commit();
        self.shipping.commit();
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SinkError> {
        self.customers.rollback();
        self.products.rollback();
        self.orders.rollback();
        self.shipping.rollback();
        self.rollbacks += 1;
        Ok(())
    }

    fn summarize(&mut self) -> Result<TableSummary, SinkError> {
        let orders = &self.orders.committed;
        let sales: Vec<f64> = orders.iter().filter_map(|(_, o)| o.sales).collect();
        let quantities: Vec<i64> = orders
            .iter()
            .filter_map(|(_, o)| o.order_quantity.map(i64::from))
            .collect();

        let revenue = (!sales.is_empty()).then(|| sales.iter().sum::<f64>());
        let average_sale = revenue.map(|total| total / sales.len() as f64);
        let units = (!quantities.is_empty()).then(|| quantities.iter().sum::<i64>());

        let shipping = &self.shipping.committed;
        let late = shipping
            .iter()
            .filter(|(_, s)| s.late_delivery_risk == Some(1))
            .count() as i64;
        let on_time = shipping
            .iter()
            .filter(|(_, s)| s.late_delivery_risk == Some(0))
            .count() as i64;

        Ok(TableSummary {
            customers: self.customers.committed.len() as i64,
            products: self.products.committed.len() as i64,
            orders: orders.len() as i64,
            shipping_details: shipping.len() as i64,
            order_metrics: OrderMetrics::from_totals(orders.len() as i64, revenue, average_sale, units),
            delivery: DeliveryPerformance::from_counts(late, on_time, shipping.len() as i64),
        })
    }
}
