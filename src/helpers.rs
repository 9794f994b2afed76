//! Helpers over order records and Magento date formats

use crate::types::{Entity, JsonValue};
use chrono::NaiveDateTime;

/// Date format of Magento API fields (`price_from`, `created_at`, ...)
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Order status Magento gives to held orders
const HOLDED_STATUS: &str = "holded";

/// Payment method code of cash on delivery
const CASH_ON_DELIVERY: &str = "cashondelivery";

/// Format a date for the Magento API
pub fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

/// Parse a date returned by the Magento API
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).ok()
}

/// Is the order on hold?
///
/// Some held orders keep their status and only gain a `hold_before_state`.
pub fn is_order_on_hold(order: &Entity) -> bool {
    let holded = order.get("status").and_then(JsonValue::as_str) == Some(HOLDED_STATUS);
    let hold_state = order
        .get("hold_before_state")
        .is_some_and(|state| !state.is_null());
    holded || hold_state
}

pub fn is_order_cash_on_delivery(order: &Entity) -> bool {
    order
        .pointer("/payment/method")
        .and_then(JsonValue::as_str)
        == Some(CASH_ON_DELIVERY)
}

/// Shipping address of the first shipping assignment
pub fn get_order_shipping_address(order: &Entity) -> Option<&JsonValue> {
    order.pointer("/extension_attributes/shipping_assignments/0/shipping/address")
}
