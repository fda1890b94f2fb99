//! # Storefront Testing
//!
//! Testing utilities for the storefront checkout.
//!
//! This crate provides:
//! - [`FixedClock`] for deterministic order numbers and timestamps
//! - Payload fixtures mirroring what the storefront client submits
//! - proptest strategies for valid payloads
//!
//! ## Example
//!
//! ```
//! use storefront_core::environment::Clock;
//! use storefront_core::order_number::OrderNumber;
//! use storefront_testing::{fixtures, reference_clock};
//!
//! let clock = reference_clock();
//! let payload = fixtures::reference_payload();
//! assert_eq!(payload.items.len(), 1);
//!
//! let number = OrderNumber::generate("AUD", clock.now(), 3);
//! assert_eq!(number.as_str(), "AUD-20240301-0004");
//! ```

use chrono::{DateTime, Utc};
use storefront_core::environment::Clock;

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_testing::mocks::FixedClock;
    /// use storefront_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Never in practice; the timestamp is hardcoded.
    #[must_use]
    pub fn test_clock() -> FixedClock {
        fixed_at("2025-01-01T00:00:00Z")
    }

    /// Clock stopped at 2024-03-01 00:00:00 UTC, the day used by the
    /// end-to-end checkout scenario.
    ///
    /// # Panics
    ///
    /// Never in practice; the timestamp is hardcoded.
    #[must_use]
    pub fn reference_clock() -> FixedClock {
        fixed_at("2024-03-01T00:00:00Z")
    }

    #[allow(clippy::expect_used)]
    fn fixed_at(rfc3339: &str) -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339(rfc3339)
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Checkout payloads as the storefront client sends them.
pub mod fixtures {
    use storefront_core::order::{
        CartItem, CustomerDetails, OrderPayload, OrderTotals, PaymentDetails, PaymentMethod,
        ShippingDetails,
    };

    /// The single-item cash-on-delivery order from the end-to-end scenario.
    #[must_use]
    pub fn reference_payload() -> OrderPayload {
        OrderPayload {
            customer: CustomerDetails {
                name: "A".to_string(),
                email_address: "a@b.com".to_string(),
                phone_number: "+10000000000".to_string(),
            },
            shipping: ShippingDetails {
                address: "1 Rd".to_string(),
                city: "X".to_string(),
                country: "Y".to_string(),
                zip_code: "00000".to_string(),
            },
            payment: PaymentDetails::cash_on_delivery(),
            items: vec![CartItem {
                id: 1,
                short_name: "Item".to_string(),
                cart_image: "/i.png".to_string(),
                price: 10.0,
                quantity: 2,
            }],
            totals: OrderTotals {
                subtotal: 20.0,
                shipping: 5.0,
                tax: 1.0,
                grand_total: 26.0,
            },
        }
    }

    /// [`reference_payload`] serialized as the client would post it.
    #[must_use]
    pub fn reference_payload_json() -> &'static str {
        r#"{
            "customer": {"name": "A", "emailAddress": "a@b.com", "phoneNumber": "+10000000000"},
            "shipping": {"address": "1 Rd", "city": "X", "country": "Y", "zipCode": "00000"},
            "payment": {"method": "Cash on Delivery"},
            "items": [{"id": 1, "shortName": "Item", "cartImage": "/i.png", "price": 10, "quantity": 2}],
            "totals": {"subtotal": 20, "shipping": 5, "tax": 1, "grandTotal": 26}
        }"#
    }

    /// e-Money order with no number or PIN supplied.
    #[must_use]
    pub fn e_money_payload() -> OrderPayload {
        OrderPayload {
            payment: PaymentDetails {
                method: PaymentMethod::EMoney,
                e_money_number: None,
                e_money_pin: None,
            },
            ..reference_payload()
        }
    }

    /// A two-item order with totals consistent with its lines.
    #[must_use]
    pub fn headphones_payload() -> OrderPayload {
        OrderPayload {
            customer: CustomerDetails {
                name: "Alexei Ward".to_string(),
                email_address: "alexei@mail.com".to_string(),
                phone_number: "+1 202-555-0136".to_string(),
            },
            shipping: ShippingDetails {
                address: "1137 Williams Avenue".to_string(),
                city: "New York".to_string(),
                country: "United States".to_string(),
                zip_code: "10001".to_string(),
            },
            payment: PaymentDetails {
                method: PaymentMethod::EMoney,
                e_money_number: Some("238521993".to_string()),
                e_money_pin: Some("6891".to_string()),
            },
            items: vec![
                CartItem {
                    id: 4,
                    short_name: "XX99 MK II".to_string(),
                    cart_image: "/assets/cart/image-xx99-mark-two-headphones.jpg".to_string(),
                    price: 2999.0,
                    quantity: 1,
                },
                CartItem {
                    id: 6,
                    short_name: "YX1".to_string(),
                    cart_image: "/assets/cart/image-yx1-earphones.jpg".to_string(),
                    price: 599.0,
                    quantity: 2,
                },
            ],
            totals: OrderTotals {
                subtotal: 4197.0,
                shipping: 50.0,
                tax: 839.4,
                grand_total: 5086.4,
            },
        }
    }

    /// [`reference_payload`] with no items.
    #[must_use]
    pub fn empty_cart_payload() -> OrderPayload {
        OrderPayload {
            items: Vec::new(),
            ..reference_payload()
        }
    }
}

/// proptest strategies for checkout types.
pub mod properties {
    use proptest::prelude::*;
    use storefront_core::order::{
        CartItem, CustomerDetails, OrderPayload, OrderTotals, PaymentDetails, PaymentMethod,
        ShippingDetails,
    };

    fn non_blank() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9 ]{0,23}"
    }

    fn amount() -> impl Strategy<Value = f64> {
        (0u32..1_000_000).prop_map(|cents| f64::from(cents) / 100.0)
    }

    /// Payment details of either method.
    pub fn arb_payment() -> impl Strategy<Value = PaymentDetails> {
        prop_oneof![
            Just(PaymentDetails::cash_on_delivery()),
            (
                proptest::option::of("[0-9]{9}"),
                proptest::option::of("[0-9]{4}")
            )
                .prop_map(|(number, pin)| PaymentDetails {
                    method: PaymentMethod::EMoney,
                    e_money_number: number,
                    e_money_pin: pin,
                }),
        ]
    }

    /// A cart line that passes validation.
    pub fn arb_cart_item() -> impl Strategy<Value = CartItem> {
        (1i64..100, non_blank(), "/[a-z]{1,12}\\.(png|jpg)", amount(), 1u32..10).prop_map(
            |(id, short_name, cart_image, price, quantity)| CartItem {
                id,
                short_name,
                cart_image,
                price,
                quantity,
            },
        )
    }

    /// A checkout payload that passes validation.
    pub fn arb_order_payload() -> impl Strategy<Value = OrderPayload> {
        (
            non_blank(),
            "[a-z]{1,10}@[a-z]{1,10}\\.(com|net|io)",
            "\\+[0-9]{4,12}",
            (non_blank(), non_blank(), non_blank(), "[0-9]{5}"),
            arb_payment(),
            proptest::collection::vec(arb_cart_item(), 1..5),
            (amount(), amount()),
        )
            .prop_map(
                |(name, email_address, phone_number, shipping, payment, items, (fee, tax))| {
                    let subtotal = items.iter().map(CartItem::line_total).sum::<f64>();
                    OrderPayload {
                        customer: CustomerDetails {
                            name,
                            email_address,
                            phone_number,
                        },
                        shipping: ShippingDetails {
                            address: shipping.0,
                            city: shipping.1,
                            country: shipping.2,
                            zip_code: shipping.3,
                        },
                        payment,
                        items,
                        totals: OrderTotals {
                            subtotal,
                            shipping: fee,
                            tax,
                            grand_total: subtotal + fee + tax,
                        },
                    }
                },
            )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, reference_clock, test_clock};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use storefront_core::order::OrderPayload;
    use storefront_core::validation::validate_order_payload;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_fixtures_are_valid() {
        assert!(validate_order_payload(&fixtures::reference_payload()).is_ok());
        assert!(validate_order_payload(&fixtures::e_money_payload()).is_ok());
        assert!(validate_order_payload(&fixtures::headphones_payload()).is_ok());
        assert!(validate_order_payload(&fixtures::empty_cart_payload()).is_err());
    }

    #[test]
    fn test_reference_json_matches_payload() {
        let parsed: OrderPayload =
            serde_json::from_str(fixtures::reference_payload_json()).unwrap();
        assert_eq!(parsed, fixtures::reference_payload());
    }

    proptest! {
        #[test]
        fn prop_generated_payloads_validate(payload in properties::arb_order_payload()) {
            prop_assert!(validate_order_payload(&payload).is_ok());
        }
    }
}
