//! Order domain types.
//!
//! An [`OrderPayload`] is what the checkout form submits. Once persisted it
//! becomes a [`StoredOrder`]: the payload plus a server-assigned identifier,
//! order number, creation timestamp and status. Orders are written once and
//! never updated.
//!
//! All types serialize with camelCase field names, matching the JSON the
//! storefront client sends and expects back.

use crate::order_number::OrderNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a stored order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generates a fresh random identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned when a string is not a well-formed order identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid order id: {0}")]
pub struct InvalidOrderId(pub String);

impl FromStr for OrderId {
    type Err = InvalidOrderId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| InvalidOrderId(s.to_string()))
    }
}

/// Who placed the order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    /// Full name
    pub name: String,
    /// Address the confirmation email is sent to
    pub email_address: String,
    /// Contact phone number
    pub phone_number: String,
}

/// Where the order ships to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// Country
    pub country: String,
    /// Postal / ZIP code
    pub zip_code: String,
}

/// How the customer pays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Prepaid e-money account
    #[serde(rename = "e-Money")]
    EMoney,
    /// Pay the courier on delivery
    #[serde(rename = "Cash on Delivery")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Wire representation of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EMoney => "e-Money",
            Self::CashOnDelivery => "Cash on Delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment details.
///
/// `e_money_number` and `e_money_pin` only mean something for
/// [`PaymentMethod::EMoney`]. They are optional even then: requiring them is
/// left to the checkout form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    /// Selected payment method
    pub method: PaymentMethod,
    /// E-money account number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_money_number: Option<String>,
    /// E-money PIN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e_money_pin: Option<String>,
}

impl PaymentDetails {
    /// Cash on delivery, no e-money fields.
    #[must_use]
    pub const fn cash_on_delivery() -> Self {
        Self {
            method: PaymentMethod::CashOnDelivery,
            e_money_number: None,
            e_money_pin: None,
        }
    }

    /// Whether both e-money fields were supplied.
    #[must_use]
    pub const fn has_e_money_credentials(&self) -> bool {
        self.e_money_number.is_some() && self.e_money_pin.is_some()
    }
}

/// A product line in the cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Catalogue product id
    pub id: i64,
    /// Display name
    pub short_name: String,
    /// Cart thumbnail reference
    pub cart_image: String,
    /// Unit price
    pub price: f64,
    /// Units ordered. Integral JSON floats such as `2.0` are accepted.
    #[serde(deserialize_with = "quantity::deserialize")]
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Totals computed by the client. Stored as given; never recomputed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    /// Sum of line totals
    pub subtotal: f64,
    /// Shipping fee
    pub shipping: f64,
    /// Tax
    pub tax: f64,
    /// Amount charged
    pub grand_total: f64,
}

/// Checkout data as submitted by the customer. Unvalidated until
/// [`validate_order_payload`](crate::validation::validate_order_payload) accepts it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Customer contact details
    pub customer: CustomerDetails,
    /// Shipping destination
    pub shipping: ShippingDetails,
    /// Payment selection
    pub payment: PaymentDetails,
    /// Ordered items, in cart order
    pub items: Vec<CartItem>,
    /// Client-computed totals
    pub totals: OrderTotals,
}

/// Lifecycle label of a stored order.
///
/// Orders are created as `received`; nothing in this system moves them on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Accepted and persisted
    #[default]
    Received,
}

impl OrderStatus {
    /// Wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "received" => Ok(Self::Received),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Metadata assigned by the order store on insert.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    /// Generated identifier
    pub order_id: OrderId,
    /// Date-scoped sequential number
    pub order_number: OrderNumber,
    /// Assignment time
    #[serde(with = "timestamp_millis")]
    pub created_at: DateTime<Utc>,
}

/// A persisted order: the payload plus server-assigned fields.
///
/// Serializes flat, i.e. the payload fields sit next to `orderId`,
/// `orderNumber`, `createdAt` and `status`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOrder {
    /// Generated identifier
    pub order_id: OrderId,
    /// Date-scoped sequential number
    pub order_number: OrderNumber,
    /// Assignment time
    #[serde(with = "timestamp_millis")]
    pub created_at: DateTime<Utc>,
    /// Lifecycle label
    pub status: OrderStatus,
    /// What the customer submitted
    #[serde(flatten)]
    pub payload: OrderPayload,
}

impl StoredOrder {
    /// Builds the stored form of `payload` from the store's receipt.
    ///
    /// Used when the store's read-after-write is not visible yet.
    #[must_use]
    pub fn from_receipt(payload: OrderPayload, receipt: &OrderReceipt) -> Self {
        Self {
            order_id: receipt.order_id,
            order_number: receipt.order_number.clone(),
            created_at: receipt.created_at,
            status: OrderStatus::Received,
            payload,
        }
    }

    /// The receipt fields of this order.
    #[must_use]
    pub fn receipt(&self) -> OrderReceipt {
        OrderReceipt {
            order_id: self.order_id,
            order_number: self.order_number.clone(),
            created_at: self.created_at,
        }
    }
}

/// RFC 3339 UTC timestamps with exactly three fractional digits, e.g.
/// `2024-03-01T00:00:00.000Z`. Deserializes any RFC 3339 timestamp.
///
/// Use with `#[serde(with = "timestamp_millis")]`.
pub mod timestamp_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize with millisecond precision.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Deserialize an RFC 3339 timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an RFC 3339 timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

mod quantity {
    use serde::Deserializer;
    use serde::de::{self, Unexpected, Visitor};
    use std::fmt;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }

    struct QuantityVisitor;

    impl Visitor<'_> for QuantityVisitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        #[allow(
            clippy::float_cmp,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
            if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) {
                Ok(v as u32)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn reference_json() -> serde_json::Value {
        json!({
            "customer": {"name": "A", "emailAddress": "a@b.com", "phoneNumber": "+10000000000"},
            "shipping": {"address": "1 Rd", "city": "X", "country": "Y", "zipCode": "00000"},
            "payment": {"method": "Cash on Delivery"},
            "items": [{"id": 1, "shortName": "Item", "cartImage": "/i.png", "price": 10, "quantity": 2}],
            "totals": {"subtotal": 20, "shipping": 5, "tax": 1, "grandTotal": 26}
        })
    }

    #[test]
    fn test_payload_reads_client_json() {
        let payload: OrderPayload = serde_json::from_value(reference_json()).unwrap();

        assert_eq!(payload.customer.email_address, "a@b.com");
        assert_eq!(payload.shipping.zip_code, "00000");
        assert_eq!(payload.payment.method, PaymentMethod::CashOnDelivery);
        assert_eq!(payload.payment.e_money_number, None);
        assert_eq!(payload.items[0].short_name, "Item");
        assert!((payload.totals.grand_total - 26.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_payment_method_is_rejected() {
        let mut value = reference_json();
        value["payment"]["method"] = json!("Bitcoin");

        let result = serde_json::from_value::<OrderPayload>(value);
        assert!(result.is_err());
    }

    #[test]
    fn test_fractional_quantity_is_rejected() {
        for bad in [json!(1.5), json!(-1), json!("2")] {
            let mut value = reference_json();
            value["items"][0]["quantity"] = bad;

            assert!(serde_json::from_value::<OrderPayload>(value).is_err());
        }
    }

    #[test]
    fn test_integral_float_quantity_is_accepted() {
        let mut value = reference_json();
        value["items"][0]["quantity"] = json!(2.0);

        let payload: OrderPayload = serde_json::from_value(value).unwrap();
        assert_eq!(payload.items[0].quantity, 2);
    }

    #[test]
    fn test_created_at_keeps_milliseconds() {
        use chrono::Timelike;

        let created_at = Utc
            .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
            .unwrap()
            .with_nanosecond(250_000_000)
            .unwrap();
        let receipt = OrderReceipt {
            order_id: OrderId::generate(),
            order_number: OrderNumber::generate("AUD", created_at, 0),
            created_at,
        };

        let value = serde_json::to_value(&receipt).unwrap();
        assert_eq!(value["createdAt"], "2024-03-01T09:30:00.250Z");

        let back: OrderReceipt = serde_json::from_value(value).unwrap();
        assert_eq!(back, receipt);
    }

    #[test]
    fn test_e_money_fields_are_optional() {
        let payment: PaymentDetails =
            serde_json::from_value(json!({"method": "e-Money"})).unwrap();
        assert_eq!(payment.method, PaymentMethod::EMoney);
        assert!(!payment.has_e_money_credentials());

        let payment: PaymentDetails = serde_json::from_value(
            json!({"method": "e-Money", "eMoneyNumber": "238521993", "eMoneyPin": "6891"}),
        )
        .unwrap();
        assert!(payment.has_e_money_credentials());
    }

    #[test]
    fn test_stored_order_serializes_flat() {
        let payload: OrderPayload = serde_json::from_value(reference_json()).unwrap();
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let receipt = OrderReceipt {
            order_id: OrderId::generate(),
            order_number: OrderNumber::generate("AUD", created_at, 3),
            created_at,
        };

        let order = StoredOrder::from_receipt(payload, &receipt);
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["orderNumber"], "AUD-20240301-0004");
        assert_eq!(value["status"], "received");
        assert_eq!(value["createdAt"], "2024-03-01T00:00:00.000Z");
        assert_eq!(value["orderId"], receipt.order_id.to_string());
        assert_eq!(value["customer"]["name"], "A");
        assert!(value.get("payload").is_none());
        assert!(value["payment"].get("eMoneyPin").is_none());

        let back: StoredOrder = serde_json::from_value(value).unwrap();
        assert_eq!(back, order);
        assert_eq!(back.receipt(), receipt);
    }

    #[test]
    fn test_order_id_parsing() {
        let id = OrderId::generate();
        assert_eq!(id.to_string().parse::<OrderId>().unwrap(), id);

        let err = "not-an-id".parse::<OrderId>().unwrap_err();
        assert_eq!(err, InvalidOrderId("not-an-id".to_string()));
    }

    #[test]
    fn test_line_total() {
        let item = CartItem {
            id: 4,
            short_name: "XX99 MK II".to_string(),
            cart_image: "/cart/xx99.jpg".to_string(),
            price: 2999.0,
            quantity: 2,
        };
        assert!((item.line_total() - 5998.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("received".parse::<OrderStatus>(), Ok(OrderStatus::Received));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }
}
