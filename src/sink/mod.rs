//! Destination for normalized rows.
//!
//! A sink assigns surrogate keys synchronously on insert and supports commit
//! and rollback at points chosen by the caller. Loaders treat an insert error
//! as a per-row failure; commit, rollback and summary errors abort the run.

pub mod memory;

pub use memory::MemorySink;

use crate::db::models::{NewCustomer, NewOrder, NewProduct, NewShipping};
use crate::error::SinkError;
use crate::summary::TableSummary;

/// Surrogate key assigned by the sink.
pub type GeneratedKey = i32;

pub trait Sink {
    fn insert_customer(&mut self, customer: &NewCustomer) -> Result<GeneratedKey, SinkError>;

    fn insert_product(&mut self, product: &NewProduct) -> Result<GeneratedKey, SinkError>;

    fn insert_order(&mut self, order: &NewOrder) -> Result<GeneratedKey, SinkError>;

    /// Shipping rows are terminal in the join graph; their key is not needed.
    fn insert_shipping(&mut self, shipping: &NewShipping) -> Result<(), SinkError>;

    /// Make every insert since the last commit durable.
    fn commit(&mut self) -> Result<(), SinkError>;

    /// Discard every insert since the last commit.
    fn rollback(&mut self) -> Result<(), SinkError>;

    /// Row counts and business metrics over committed table state.
    fn summarize(&mut self) -> Result<TableSummary, SinkError>;
}

/// Borrowed view of a record being inserted, for sink-side inspection.
#[derive(Debug, Clone, Copy)]
pub enum SinkRecord<'a> {
    Customer(&'a NewCustomer),
    Product(&'a NewProduct),
    Order(&'a NewOrder),
    Shipping(&'a NewShipping),
}
