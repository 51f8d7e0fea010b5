//! Insertable rows for the normalized tables.
//!
//! Surrogate keys are not part of these structs; they are assigned by the
//! sink and returned from the insert.

use crate::db::schema::*;
use crate::entity::Entity;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Insertable, Serialize)]
#[diesel(table_name = customers)]
pub struct NewCustomer {
    pub customer_email: String,
    pub customer_fname: String,
    pub customer_lname: String,
    pub customer_segment: Option<String>,
    pub customer_city: Option<String>,
    pub customer_state: Option<String>,
    pub customer_country: Option<String>,
    pub customer_zipcode: Option<String>,
    pub customer_street: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Insertable, Serialize)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub product_name: String,
    pub product_card_id: Option<i32>,
    pub category_name: Option<String>,
    pub department_name: Option<String>,
    pub product_price: Option<f64>,
    pub product_description: Option<String>,
    pub product_image: Option<String>,
    pub product_status: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Insertable, Serialize)]
#[diesel(table_name = orders)]
pub struct NewOrder {
    pub order_item_id: Option<i32>,
    pub customer_id: i32,
    pub product_id: i32,
    pub order_date: Option<NaiveDate>,
    pub order_date_dateorders: Option<NaiveDateTime>,
    pub order_quantity: Option<i32>,
    pub sales: Option<f64>,
    pub discount: Option<f64>,
    pub profit_per_order: Option<f64>,
    pub order_status: Option<String>,
    pub market: Option<String>,
    pub order_region: Option<String>,
    pub order_country: Option<String>,
    pub order_city: Option<String>,
    pub order_state: Option<String>,
    pub order_zipcode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Insertable, Serialize)]
#[diesel(table_name = shipping_details)]
pub struct NewShipping {
    pub order_id: i32,
    pub shipping_date: Option<NaiveDateTime>,
    pub shipping_mode: Option<String>,
    pub days_for_shipping_real: Option<i32>,
    pub days_for_shipment_scheduled: Option<i32>,
    pub delivery_status: Option<String>,
    pub late_delivery_risk: Option<i32>,
}

impl Entity for NewCustomer {
    const NAME: &'static str = "customer";
    const TABLE: &'static str = "customers";
}

impl Entity for NewProduct {
    const NAME: &'static str = "product";
    const TABLE: &'static str = "products";
}

impl Entity for NewOrder {
    const NAME: &'static str = "order";
    const TABLE: &'static str = "orders";
}

impl Entity for NewShipping {
    const NAME: &'static str = "shipping";
    const TABLE: &'static str = "shipping_details";
}
