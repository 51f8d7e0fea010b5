//! PostgreSQL sink.
//!
//! Inserts run inside a batch transaction that stays open until the loader
//! commits. Each insert is additionally wrapped in a nested transaction,
//! which diesel issues as a savepoint, so a rejected row is rolled back on
//! its own and the rest of the batch is unaffected.

use crate::db::database::{Database, PooledConnection};
use crate::db::models::{NewCustomer, NewOrder, NewProduct, NewShipping};
use crate::db::schema::{customers, orders, products, shipping_details};
use crate::error::SinkError;
use crate::sink::{GeneratedKey, Sink};
use crate::summary::{DeliveryPerformance, OrderMetrics, TableSummary};
use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::QueryResult;
use diesel::sql_types::{BigInt, Double, Nullable};
use tracing::debug;

#[derive(QueryableByName)]
struct OrderMetricsRow {
    #[diesel(sql_type = BigInt)]
    orders: i64,
    #[diesel(sql_type = Nullable<Double>)]
    revenue: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    average_sale: Option<f64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    units: Option<i64>,
}

#[derive(QueryableByName)]
struct DeliveryRow {
    #[diesel(sql_type = BigInt)]
    late: i64,
    #[diesel(sql_type = BigInt)]
    on_time: i64,
    #[diesel(sql_type = BigInt)]
    total: i64,
}

pub struct PgSink {
    conn: PooledConnection,
    in_transaction: bool,
}

impl PgSink {
    pub fn new(conn: PooledConnection) -> Self {
        Self {
            conn,
            in_transaction: false,
        }
    }

    /// Take a dedicated connection from the pool.
    pub fn connect(db: &Database) -> Result<Self, SinkError> {
        Ok(Self::new(db.get_connection()?))
    }

    fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    fn begin_if_needed(&mut self) -> Result<(), SinkError> {
        if !self.in_transaction {
            AnsiTransactionManager::begin_transaction(self.connection())?;
            self.in_transaction = true;
            debug!("Opened batch transaction");
        }
        Ok(())
    }

    /// Run one insert in its own savepoint inside the batch transaction.
    fn insert_row<T, F>(&mut self, insert: F) -> Result<T, SinkError>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<T>,
    {
        self.begin_if_needed()?;
        let conn = self.connection();
        Ok(conn.transaction(insert)?)
    }
}

impl Sink for PgSink {
    fn insert_customer(&mut self, customer: &NewCustomer) -> Result<GeneratedKey, SinkError> {
        self.insert_row(|conn| {
            diesel::insert_into(customers::table)
                .values(customer)
                .returning(customers::customer_id)
                .get_result(conn)
        })
    }

    fn insert_product(&mut self, product: &NewProduct) -> Result<GeneratedKey, SinkError> {
        self.insert_row(|conn| {
            diesel::insert_into(products::table)
                .values(product)
                .returning(products::product_id)
                .get_result(conn)
        })
    }

    fn insert_order(&mut self, order: &NewOrder) -> Result<GeneratedKey, SinkError> {
        self.insert_row(|conn| {
            diesel::insert_into(orders::table)
                .values(order)
                .returning(orders::order_id)
                .get_result(conn)
        })
    }

    fn insert_shipping(&mut self, shipping: &NewShipping) -> Result<(), SinkError> {
        self.insert_row(|conn| {
            diesel::insert_into(shipping_details::table)
                .values(shipping)
                .execute(conn)
                .map(|_| ())
        })
    }

    fn commit(&mut self) -> Result<(), SinkError> {
        if self.in_transaction {
            // Cleared first: a failed COMMIT leaves no usable transaction behind.
            self.in_transaction = false;
            AnsiTransactionManager::commit_transaction(self.connection())?;
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), SinkError> {
        if self.in_transaction {
            self.in_transaction = false;
            AnsiTransactionManager::rollback_transaction(self.connection())?;
        }
        Ok(())
    }

    fn summarize(&mut self) -> Result<TableSummary, SinkError> {
        self.commit()?;
        let conn = self.connection();

        let customers = customers::table.count().get_result::<i64>(conn)?;
        let products = products::table.count().get_result::<i64>(conn)?;
        let orders = orders::table.count().get_result::<i64>(conn)?;
        let shipping_details = shipping_details::table.count().get_result::<i64>(conn)?;

        let metrics = diesel::sql_query(
            "SELECT COUNT(DISTINCT order_id) AS orders, \
                    SUM(sales)::float8 AS revenue, \
                    AVG(sales)::float8 AS average_sale, \
                    SUM(order_quantity)::int8 AS units \
             FROM orders",
        )
        .get_result::<OrderMetricsRow>(conn)?;

        let delivery = diesel::sql_query(
            "SELECT COUNT(*) FILTER (WHERE late_delivery_risk = 1) AS late, \
                    COUNT(*) FILTER (WHERE late_delivery_risk = 0) AS on_time, \
                    COUNT(*) AS total \
             FROM shipping_details",
        )
        .get_result::<DeliveryRow>(conn)?;

        Ok(TableSummary {
            customers,
            products,
            orders,
            shipping_details,
            order_metrics: OrderMetrics::from_totals(
                metrics.orders,
                metrics.revenue,
                metrics.average_sale,
                metrics.units,
            ),
            delivery: DeliveryPerformance::from_counts(delivery.late, delivery.on_time, delivery.total),
        })
    }
}
