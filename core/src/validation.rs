//! Checkout payload validation.
//!
//! Structural checks (field presence, types, the payment method enum, integer
//! quantities) happen when JSON is deserialized into an
//! [`OrderPayload`](crate::order::OrderPayload). This module covers the
//! constraints a type cannot express, and reports every violation at once so
//! the client can fix the form in one round trip.

use crate::order::{CartItem, OrderPayload};
use thiserror::Error;

/// Minimum number of characters in a phone number.
pub const MIN_PHONE_NUMBER_LEN: usize = 4;

/// Every constraint a payload violated, in field order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{}", .0.join(", "))]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    /// Human-readable violations.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.0
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no violations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Check the field constraints of a checkout payload.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing each violated constraint.
pub fn validate_order_payload(payload: &OrderPayload) -> Result<(), ValidationErrors> {
    let mut violations = Vec::new();

    let customer = &payload.customer;
    require_text(&mut violations, "customer.name", &customer.name);
    if !is_valid_email(customer.email_address.trim()) {
        violations.push("customer.emailAddress must be a valid email address".to_string());
    }
    if customer.phone_number.trim().chars().count() < MIN_PHONE_NUMBER_LEN {
        violations.push(format!(
            "customer.phoneNumber must be at least {MIN_PHONE_NUMBER_LEN} characters"
        ));
    }

    let shipping = &payload.shipping;
    require_text(&mut violations, "shipping.address", &shipping.address);
    require_text(&mut violations, "shipping.city", &shipping.city);
    require_text(&mut violations, "shipping.country", &shipping.country);
    require_text(&mut violations, "shipping.zipCode", &shipping.zip_code);

    if payload.items.is_empty() {
        violations.push("items must contain at least one item".to_string());
    }
    for (index, item) in payload.items.iter().enumerate() {
        validate_item(&mut violations, index, item);
    }

    let totals = &payload.totals;
    require_amount(&mut violations, "totals.subtotal", totals.subtotal);
    require_amount(&mut violations, "totals.shipping", totals.shipping);
    require_amount(&mut violations, "totals.tax", totals.tax);
    require_amount(&mut violations, "totals.grandTotal", totals.grand_total);

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(violations))
    }
}

fn validate_item(violations: &mut Vec<String>, index: usize, item: &CartItem) {
    require_text(violations, &format!("items[{index}].cartImage"), &item.cart_image);
    require_amount(violations, &format!("items[{index}].price"), item.price);
    if item.quantity == 0 {
        violations.push(format!("items[{index}].quantity must be a positive integer"));
    }
}

fn require_text(violations: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        violations.push(format!("{field} is required"));
    }
}

fn require_amount(violations: &mut Vec<String>, field: &str, value: f64) {
    if !value.is_finite() {
        violations.push(format!("{field} must be a finite number"));
    } else if value < 0.0 {
        violations.push(format!("{field} must not be negative"));
    }
}

/// Validate email address format.
///
/// Structural check matching what mail transports accept, not full RFC 5322:
/// - exactly one `@`, length between 3 and 254 characters
/// - local part of `A-Z a-z 0-9 . _ + - '`, not starting or ending with `.`
///   and without consecutive dots
/// - domain of dot-separated labels of ASCII letters, digits and `-`, no label
///   starting or ending with `-`
/// - a top-level domain of at least two letters
///
/// # Examples
///
/// ```
/// use storefront_core::validation::is_valid_email;
///
/// assert!(is_valid_email("a@b.com"));
/// assert!(is_valid_email("first.last+orders@mail.example.co.uk"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@localhost"));
/// assert!(!is_valid_email("a..b@c.com"));
/// assert!(!is_valid_email("a@b.c"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 254 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
    let valid_char =
        |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_' | '\'');

    !local.is_empty()
        && local.chars().all(valid_char)
        && !local.starts_with('.')
        && !local.ends_with(|c: char| c == '.' || c == '\'')
        && !local.contains("..")
}

fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    let Some(tld) = labels.last() else {
        return false;
    };

    let valid_label = |label: &&str| {
        !label.is_empty()
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    };

    labels.len() >= 2
        && labels.iter().all(valid_label)
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::order::{
        CustomerDetails, OrderTotals, PaymentDetails, PaymentMethod, ShippingDetails,
    };

    fn valid_payload() -> OrderPayload {
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

    #[test]
    fn test_email_shapes() {
        for valid in [
            "a@b.com",
            "o'brien@mail.ie",
            "first.last+orders@mail.example.co.uk",
            "x_y-z@sub-domain.example.io",
        ] {
            assert!(is_valid_email(valid), "{valid} should be accepted");
        }

        for invalid in [
            ".a@b.com",
            "a.@b.com",
            "a..b@c.com",
            "a@b..com",
            "a@-b.com",
            "a@b-.com",
            "a@b.c",
            "a@b.c0m",
            "a@b@c.com",
            "a b@c.com",
            "a@localhost",
            "@b.com",
            "a@",
        ] {
            assert!(!is_valid_email(invalid), "{invalid} should be rejected");
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        assert_eq!(validate_order_payload(&valid_payload()), Ok(()));
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut payload = valid_payload();
        payload.items.clear();

        let errors = validate_order_payload(&payload).unwrap_err();
        assert_eq!(errors.violations(), ["items must contain at least one item"]);
    }

    #[test]
    fn test_e_money_without_credentials_is_accepted() {
        let mut payload = valid_payload();
        payload.payment = PaymentDetails {
            method: PaymentMethod::EMoney,
            e_money_number: None,
            e_money_pin: None,
        };

        assert!(validate_order_payload(&payload).is_ok());
    }

    #[test]
    fn test_all_violations_are_reported() {
        let mut payload = valid_payload();
        payload.customer.name = "   ".to_string();
        payload.customer.email_address = "not-an-email".to_string();
        payload.customer.phone_number = "123".to_string();
        payload.shipping.city = String::new();
        payload.items[0].quantity = 0;
        payload.items[0].price = -1.0;
        payload.totals.tax = f64::NAN;

        let errors = validate_order_payload(&payload).unwrap_err();
        assert_eq!(
            errors.violations(),
            [
                "customer.name is required",
                "customer.emailAddress must be a valid email address",
                "customer.phoneNumber must be at least 4 characters",
                "shipping.city is required",
                "items[0].price must not be negative",
                "items[0].quantity must be a positive integer",
                "totals.tax must be a finite number",
            ]
        );
        assert_eq!(errors.len(), 7);
    }

    #[test]
    fn test_error_display_joins_violations() {
        let mut payload = valid_payload();
        payload.shipping.zip_code = String::new();
        payload.items[0].cart_image = String::new();

        let errors = validate_order_payload(&payload).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "shipping.zipCode is required, items[0].cartImage is required"
        );
    }

    #[test]
    fn test_zero_amounts_are_allowed() {
        let mut payload = valid_payload();
        payload.items[0].price = 0.0;
        payload.totals = OrderTotals {
            subtotal: 0.0,
            shipping: 0.0,
            tax: 0.0,
            grand_total: 0.0,
        };

        assert!(validate_order_payload(&payload).is_ok());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("runner-1a2b@example.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a@b..com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email(""));
    }
}
