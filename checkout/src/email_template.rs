//! Order confirmation email content.
//!
//! One plain template: subject, HTML body and a text alternative. Every
//! customer-supplied string is HTML-escaped.

use crate::config::StoreConfig;
use std::fmt::Write as _;
use storefront_core::StoredOrder;

/// Rendered confirmation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationEmail {
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
    /// Plain-text body
    pub text: String,
}

impl ConfirmationEmail {
    /// Render the confirmation for `order`.
    #[must_use]
    pub fn render(order: &StoredOrder, store: &StoreConfig) -> Self {
        Self {
            subject: subject(order, store),
            html: html_body(order, store),
            text: text_body(order, store),
        }
    }
}

/// `Your <store> order <number> is confirmed`
#[must_use]
pub fn subject(order: &StoredOrder, store: &StoreConfig) -> String {
    format!("Your {} order {} is confirmed", store.name, order.order_number)
}

/// Link to the order confirmation page.
#[must_use]
pub fn order_url(order: &StoredOrder, store: &StoreConfig) -> String {
    format!("{}/order-confirmation?orderId={}", store.app_url, order.order_id)
}

/// HTML body.
#[must_use]
pub fn html_body(order: &StoredOrder, store: &StoreConfig) -> String {
    let payload = &order.payload;

    let mut rows = String::new();
    for item in &payload.items {
        let _ = write!(
            rows,
            "<tr><td style=\"padding:8px 0;\"><strong>{}</strong><br />x{}</td>\
             <td style=\"padding:8px 0;text-align:right;\">{}</td></tr>",
            escape_html(&item.short_name),
            item.quantity,
            format_usd(item.line_total()),
        );
    }

    let totals = &payload.totals;
    let mut summary = String::new();
    for (label, amount) in [
        ("Subtotal", totals.subtotal),
        ("Shipping", totals.shipping),
        ("Tax", totals.tax),
        ("Grand Total", totals.grand_total),
    ] {
        let _ = write!(
            summary,
            "<tr><td style=\"padding:4px 0;\">{label}</td>\
             <td style=\"padding:4px 0;text-align:right;\">{}</td></tr>",
            format_usd(amount),
        );
    }

    let shipping = &payload.shipping;
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8" />
    <title>Order Confirmation</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.5; color: #111;">
    <div style="max-width: 600px; margin: 0 auto; padding: 24px;">
        <h1 style="font-size: 22px;">Thank you for your order</h1>
        <p>Hi {name},<br />We've received your order <strong>{number}</strong>.</p>
        <h2 style="font-size: 16px;">Order summary</h2>
        <table role="presentation" width="100%">{rows}</table>
        <hr />
        <table role="presentation" width="100%">{summary}</table>
        <h2 style="font-size: 16px;">Shipping to</h2>
        <p>{address}<br />{city}, {zip}<br />{country}</p>
        <p>Payment: {payment}</p>
        <p>Need to make a change? Reply to this email or reach us at <a href="mailto:{support}">{support}</a>.</p>
        <p><a href="{url}">View your order</a></p>
    </div>
</body>
</html>
"#,
        name = escape_html(&payload.customer.name),
        number = escape_html(order.order_number.as_str()),
        address = escape_html(&shipping.address),
        city = escape_html(&shipping.city),
        zip = escape_html(&shipping.zip_code),
        country = escape_html(&shipping.country),
        payment = escape_html(payload.payment.method.as_str()),
        support = escape_html(&store.support_email),
        url = escape_html(&order_url(order, store)),
    )
}

/// Plain-text alternative of [`html_body`].
#[must_use]
pub fn text_body(order: &StoredOrder, store: &StoreConfig) -> String {
    let payload = &order.payload;
    let mut text = format!(
        "Hi {},\n\nWe've received your order {}.\n\nOrder summary\n",
        payload.customer.name, order.order_number
    );

    for item in &payload.items {
        let _ = writeln!(
            text,
            "  {} x{}  {}",
            item.short_name,
            item.quantity,
            format_usd(item.line_total())
        );
    }

    let totals = &payload.totals;
    let _ = write!(
        text,
        "\nSubtotal: {}\nShipping: {}\nTax: {}\nGrand Total: {}\n",
        format_usd(totals.subtotal),
        format_usd(totals.shipping),
        format_usd(totals.tax),
        format_usd(totals.grand_total),
    );

    let shipping = &payload.shipping;
    let _ = write!(
        text,
        "\nShipping to\n{}\n{}, {}\n{}\n\nPayment: {}\n\nView your order: {}\nQuestions? {}\n",
        shipping.address,
        shipping.city,
        shipping.zip_code,
        shipping.country,
        payload.payment.method,
        order_url(order, store),
        store.support_email,
    );

    text
}

/// Format an amount as US dollars, e.g. `$5,086.40`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_usd(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();

    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use storefront_core::{OrderId, OrderNumber, OrderReceipt, Utc};
    use storefront_testing::fixtures;

    fn order() -> StoredOrder {
        let receipt = OrderReceipt {
            order_id: OrderId::generate(),
            order_number: OrderNumber::generate(
                "AUD",
                Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
                3,
            ),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        };
        StoredOrder::from_receipt(fixtures::headphones_payload(), &receipt)
    }

    #[test]
    fn test_subject() {
        assert_eq!(
            subject(&order(), &StoreConfig::default()),
            "Your Audiophile order AUD-20240301-0004 is confirmed"
        );
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(26.0), "$26.00");
        assert_eq!(format_usd(839.4), "$839.40");
        assert_eq!(format_usd(5086.4), "$5,086.40");
        assert_eq!(format_usd(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_usd(-3.5), "-$3.50");
    }

    #[test]
    fn test_bodies_list_items_totals_and_link() {
        let order = order();
        let store = StoreConfig::default();
        let email = ConfirmationEmail::render(&order, &store);

        for body in [&email.html, &email.text] {
            assert!(body.contains("XX99 MK II"));
            assert!(body.contains("$1,198.00"));
            assert!(body.contains("$5,086.40"));
            assert!(body.contains("AUD-20240301-0004"));
            assert!(body.contains("Payment: e-Money"));
            assert!(body.contains(&format!("orderId={}", order.order_id)));
        }
    }

    #[test]
    fn test_html_escapes_customer_input() {
        let mut order = order();
        order.payload.customer.name = "<script>alert('x')</script>".to_string();

        let html = html_body(&order, &StoreConfig::default());

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }
}
