//! Typed row schema for the denormalized source.

use crate::entity::FieldValue;
use crate::error::SourceError;
use std::collections::HashMap;
use std::fmt;

/// Position of a row in the source, 0-based. Identifies a transaction across passes.
pub type RowPosition = usize;

/// Columns the pipeline reads from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    CustomerId,
    CustomerEmail,
    CustomerFname,
    CustomerLname,
    CustomerSegment,
    CustomerCity,
    CustomerState,
    CustomerCountry,
    CustomerZipcode,
    CustomerStreet,
    Latitude,
    Longitude,
    ProductName,
    ProductCardId,
    CategoryName,
    DepartmentName,
    ProductPrice,
    ProductDescription,
    ProductImage,
    ProductStatus,
    OrderItemId,
    OrderDate,
    OrderItemQuantity,
    SalesPerCustomer,
    OrderItemDiscount,
    OrderProfitPerOrder,
    OrderStatus,
    Market,
    OrderRegion,
    OrderCountry,
    OrderCity,
    OrderState,
    OrderZipcode,
    ShippingDate,
    ShippingMode,
    DaysForShippingReal,
    DaysForShipmentScheduled,
    DeliveryStatus,
    LateDeliveryRisk,
}

impl Column {
    pub const ALL: [Column; 39] = [
        Column::CustomerId,
        Column::CustomerEmail,
        Column::CustomerFname,
        Column::CustomerLname,
        Column::CustomerSegment,
        Column::CustomerCity,
        Column::CustomerState,
        Column::CustomerCountry,
        Column::CustomerZipcode,
        Column::CustomerStreet,
        Column::Latitude,
        Column::Longitude,
        Column::ProductName,
        Column::ProductCardId,
        Column::CategoryName,
        Column::DepartmentName,
        Column::ProductPrice,
        Column::ProductDescription,
        Column::ProductImage,
        Column::ProductStatus,
        Column::OrderItemId,
        Column::OrderDate,
        Column::OrderItemQuantity,
        Column::SalesPerCustomer,
        Column::OrderItemDiscount,
        Column::OrderProfitPerOrder,
        Column::OrderStatus,
        Column::Market,
        Column::OrderRegion,
        Column::OrderCountry,
        Column::OrderCity,
        Column::OrderState,
        Column::OrderZipcode,
        Column::ShippingDate,
        Column::ShippingMode,
        Column::DaysForShippingReal,
        Column::DaysForShipmentScheduled,
        Column::DeliveryStatus,
        Column::LateDeliveryRisk,
    ];

    /// Columns without which no entity can be keyed.
    pub const REQUIRED: [Column; 2] = [Column::CustomerId, Column::ProductName];

    /// Header name as it appears in the source file.
    pub fn header(self) -> &'static str {
        match self {
            Column::CustomerId => "Customer Id",
            Column::CustomerEmail => "Customer Email",
            Column::CustomerFname => "Customer Fname",
            Column::CustomerLname => "Customer Lname",
            Column::CustomerSegment => "Customer Segment",
            Column::CustomerCity => "Customer City",
            Column::CustomerState => "Customer State",
            Column::CustomerCountry => "Customer Country",
            Column::CustomerZipcode => "Customer Zipcode",
            Column::CustomerStreet => "Customer Street",
            Column::Latitude => "Latitude",
            Column::Longitude => "Longitude",
            Column::ProductName => "Product Name",
            Column::ProductCardId => "Product Card Id",
            Column::CategoryName => "Category Name",
            Column::DepartmentName => "Department Name",
            Column::ProductPrice => "Product Price",
            Column::ProductDescription => "Product Description",
            Column::ProductImage => "Product Image",
            Column::ProductStatus => "Product Status",
            Column::OrderItemId => "Order Item Id",
            Column::OrderDate => "order date (DateOrders)",
            Column::OrderItemQuantity => "Order Item Quantity",
            Column::SalesPerCustomer => "Sales per customer",
            Column::OrderItemDiscount => "Order Item Discount",
            Column::OrderProfitPerOrder => "Order Profit Per Order",
            Column::OrderStatus => "Order Status",
            Column::Market => "Market",
            Column::OrderRegion => "Order Region",
            Column::OrderCountry => "Order Country",
            Column::OrderCity => "Order City",
            Column::OrderState => "Order State",
            Column::OrderZipcode => "Order Zipcode",
            Column::ShippingDate => "shipping date (DateOrders)",
            Column::ShippingMode => "Shipping Mode",
            Column::DaysForShippingReal => "Days for shipping (real)",
            Column::DaysForShipmentScheduled => "Days for shipment (scheduled)",
            Column::DeliveryStatus => "Delivery Status",
            Column::LateDeliveryRisk => "Late_delivery_risk",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Where each expected column sits in the source header.
///
/// Resolved once at ingestion. A column missing here is a schema fact,
/// reported once; a `Null` cell in a present column is a value fact.
#[derive(Debug, Clone, Default)]
pub struct SourceSchema {
    positions: HashMap<Column, usize>,
    missing: Vec<Column>,
}

impl SourceSchema {
    /// Resolve header names against the expected columns.
    ///
    /// Header names are matched after trimming surrounding whitespace. Extra
    /// source columns are ignored.
    pub fn resolve<'a, I>(headers: I) -> Result<Self, SourceError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut by_name: HashMap<&str, usize> = HashMap::new();
        for (index, name) in headers.into_iter().enumerate() {
            // first occurrence wins for duplicated headers
            by_name.entry(name.trim()).or_insert(index);
        }

        let mut positions = HashMap::new();
        let mut missing = Vec::new();
        for column in Column::ALL {
            match by_name.get(column.header()) {
                Some(&index) => {
                    positions.insert(column, index);
                }
                None => missing.push(column),
            }
        }

        if let Some(required) = Column::REQUIRED.iter().find(|c| missing.contains(*c)) {
            return Err(SourceError::MissingColumn(required.header()));
        }

        Ok(Self { positions, missing })
    }

    /// Schema where every expected column is present, in [`Column::ALL`] order.
    pub fn complete() -> Self {
        Self {
            positions: Column::ALL.iter().enumerate().map(|(i, c)| (*c, i)).collect(),
            missing: Vec::new(),
        }
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    /// Expected columns the source does not carry.
    pub fn missing(&self) -> &[Column] {
        &self.missing
    }
}

/// One denormalized transaction row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    pub customer_id: FieldValue,
    pub customer_email: FieldValue,
    pub customer_fname: FieldValue,
    pub customer_lname: FieldValue,
    pub customer_segment: FieldValue,
    pub customer_city: FieldValue,
    pub customer_state: FieldValue,
    pub customer_country: FieldValue,
    pub customer_zipcode: FieldValue,
    pub customer_street: FieldValue,
    pub latitude: FieldValue,
    pub longitude: FieldValue,

    pub product_name: FieldValue,
    pub product_card_id: FieldValue,
    pub category_name: FieldValue,
    pub department_name: FieldValue,
    pub product_price: FieldValue,
    pub product_description: FieldValue,
    pub product_image: FieldValue,
    pub product_status: FieldValue,

    pub order_item_id: FieldValue,
    pub order_date: FieldValue,
    pub order_item_quantity: FieldValue,
    pub sales_per_customer: FieldValue,
    pub order_item_discount: FieldValue,
    pub order_profit_per_order: FieldValue,
    pub order_status: FieldValue,
    pub market: FieldValue,
    pub order_region: FieldValue,
    pub order_country: FieldValue,
    pub order_city: FieldValue,
    pub order_state: FieldValue,
    pub order_zipcode: FieldValue,

    pub shipping_date: FieldValue,
    pub shipping_mode: FieldValue,
    pub days_for_shipping_real: FieldValue,
    pub days_for_shipment_scheduled: FieldValue,
    pub delivery_status: FieldValue,
    pub late_delivery_risk: FieldValue,
}

impl SourceRow {
    /// Populate a row from raw cells laid out according to `schema`.
    ///
    /// Cells past the end of a short record read as `Null`.
    pub fn from_cells<'a, F>(schema: &SourceSchema, cell_at: F) -> Self
    where
        F: Fn(usize) -> Option<&'a str>,
    {
        let cell = |column: Column| {
            schema
                .position(column)
                .and_then(&cell_at)
                .map(FieldValue::from_raw)
                .unwrap_or(FieldValue::Null)
        };

        Self {
            customer_id: cell(Column::CustomerId),
            customer_email: cell(Column::CustomerEmail),
            customer_fname: cell(Column::CustomerFname),
            customer_lname: cell(Column::CustomerLname),
            customer_segment: cell(Column::CustomerSegment),
            customer_city: cell(Column::CustomerCity),
            customer_state: cell(Column::CustomerState),
            customer_country: cell(Column::CustomerCountry),
            customer_zipcode: cell(Column::CustomerZipcode),
            customer_street: cell(Column::CustomerStreet),
            latitude: cell(Column::Latitude),
            longitude: cell(Column::Longitude),
            product_name: cell(Column::ProductName),
            product_card_id: cell(Column::ProductCardId),
            category_name: cell(Column::CategoryName),
            department_name: cell(Column::DepartmentName),
            product_price: cell(Column::ProductPrice),
            product_description: cell(Column::ProductDescription),
            product_image: cell(Column::ProductImage),
            product_status: cell(Column::ProductStatus),
            order_item_id: cell(Column::OrderItemId),
            order_date: cell(Column::OrderDate),
            order_item_quantity: cell(Column::OrderItemQuantity),
            sales_per_customer: cell(Column::SalesPerCustomer),
            order_item_discount: cell(Column::OrderItemDiscount),
            order_profit_per_order: cell(Column::OrderProfitPerOrder),
            order_status: cell(Column::OrderStatus),
            market: cell(Column::Market),
            order_region: cell(Column::OrderRegion),
            order_country: cell(Column::OrderCountry),
            order_city: cell(Column::OrderCity),
            order_state: cell(Column::OrderState),
            order_zipcode: cell(Column::OrderZipcode),
            shipping_date: cell(Column::ShippingDate),
            shipping_mode: cell(Column::ShippingMode),
            days_for_shipping_real: cell(Column::DaysForShippingReal),
            days_for_shipment_scheduled: cell(Column::DaysForShipmentScheduled),
            delivery_status: cell(Column::DeliveryStatus),
            late_delivery_risk: cell(Column::LateDeliveryRisk),
        }
    }
}
