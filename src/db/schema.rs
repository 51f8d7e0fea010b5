// Destination tables. DDL is owned by the database, not by this crate.

diesel::table! {
    customers (customer_id) {
        customer_id -> Int4,
        customer_email -> Text,
        customer_fname -> Text,
        customer_lname -> Text,
        customer_segment -> Nullable<Text>,
        customer_city -> Nullable<Text>,
        customer_state -> Nullable<Text>,
        customer_country -> Nullable<Text>,
        customer_zipcode -> Nullable<Text>,
        customer_street -> Nullable<Text>,
        latitude -> Nullable<Float8>,
        longitude -> Nullable<Float8>,
    }
}

diesel::table! {
    products (product_id) {
        product_id -> Int4,
        product_name -> Text,
        product_card_id -> Nullable<Int4>,
        category_name -> Nullable<Text>,
        department_name -> Nullable<Text>,
        product_price -> Nullable<Float8>,
        product_description -> Nullable<Text>,
        product_image -> Nullable<Text>,
        product_status -> Nullable<Int4>,
    }
}

diesel::table! {
    orders (order_id) {
        order_id -> Int4,
        order_item_id -> Nullable<Int4>,
        customer_id -> Int4,
        product_id -> Int4,
        order_date -> Nullable<Date>,
        order_date_dateorders -> Nullable<Timestamp>,
        order_quantity -> Nullable<Int4>,
        sales -> Nullable<Float8>,
        discount -> Nullable<Float8>,
        profit_per_order -> Nullable<Float8>,
        order_status -> Nullable<Text>,
        market -> Nullable<Text>,
        order_region -> Nullable<Text>,
        order_country -> Nullable<Text>,
        order_city -> Nullable<Text>,
        order_state -> Nullable<Text>,
        order_zipcode -> Nullable<Text>,
    }
}

diesel::table! {
    shipping_details (shipping_id) {
        shipping_id -> Int4,
        order_id -> Int4,
        shipping_date -> Nullable<Timestamp>,
        shipping_mode -> Nullable<Text>,
        days_for_shipping_real -> Nullable<Int4>,
        days_for_shipment_scheduled -> Nullable<Int4>,
        delivery_status -> Nullable<Text>,
        late_delivery_risk -> Nullable<Int4>,
    }
}

diesel::joinable!(orders -> customers (customer_id));
diesel::joinable!(orders -> products (product_id));
diesel::joinable!(shipping_details -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(customers, orders, products, shipping_details,);
