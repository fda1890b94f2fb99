//! SMTP email provider implementation using Lettre.

use crate::config::{SmtpConfig, StoreConfig};
use crate::email_template::ConfirmationEmail;
use crate::error::{CheckoutError, Result};
use crate::providers::EmailProvider;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use storefront_core::StoredOrder;

/// SMTP email provider using Lettre.
///
/// The transport is built once at startup and shared by clones, so a bad
/// relay host fails the boot instead of the first checkout.
///
/// # Examples
///
/// ```ignore
/// use storefront_checkout::providers::SmtpEmailProvider;
///
/// let provider = SmtpEmailProvider::new(&config.smtp, config.store.clone())?;
/// ```
#[derive(Clone)]
pub struct SmtpEmailProvider {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
    store: StoreConfig,
}

impl SmtpEmailProvider {
    /// Create a new SMTP email provider.
    ///
    /// `smtp.secure` selects implicit TLS (usually port 465); otherwise the
    /// connection is upgraded with STARTTLS (usually port 587).
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Email`] if the relay host or the `From`
    /// address is invalid.
    pub fn new(smtp: &SmtpConfig, store: StoreConfig) -> Result<Self> {
        let builder = if smtp.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
        }
        .map_err(|e| CheckoutError::Email(format!("SMTP relay error: {e}")))?;

        let transport = builder
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build();

        let from = smtp
            .from
            .parse()
            .map_err(|e| CheckoutError::Email(format!("Invalid from address: {e}")))?;

        Ok(Self {
            transport: Arc::new(transport),
            from,
            store,
        })
    }

    /// Build the confirmation message for `order`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Email`] if the customer address does not
    /// parse or the message cannot be assembled.
    pub fn build_message(&self, order: &StoredOrder) -> Result<Message> {
        let email = ConfirmationEmail::render(order, &self.store);
        let to: Mailbox = order
            .payload
            .customer
            .email_address
            .trim()
            .parse()
            .map_err(|e| CheckoutError::Email(format!("Invalid to address: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))
            .map_err(|e| CheckoutError::Email(format!("Failed to build email: {e}")))
    }
}

impl EmailProvider for SmtpEmailProvider {
    async fn send_order_confirmation(&self, order: &StoredOrder) -> Result<()> {
        let message = self.build_message(order)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| CheckoutError::Email(format!("Failed to send email: {e}")))?;

        tracing::info!(
            order_number = %order.order_number,
            "Order confirmation sent"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use storefront_core::{OrderId, OrderNumber, OrderReceipt, Utc};
    use storefront_testing::fixtures;

    fn smtp_config(secure: bool) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: if secure { 465 } else { 587 },
            secure,
            username: "orders@example.com".to_string(),
            password: "secret".to_string(),
            from: "Audiophile <orders@example.com>".to_string(),
        }
    }

    fn order(email: &str) -> StoredOrder {
        let mut payload = fixtures::reference_payload();
        payload.customer.email_address = email.to_string();
        let now = Utc::now();
        StoredOrder::from_receipt(
            payload,
            &OrderReceipt {
                order_id: OrderId::generate(),
                order_number: OrderNumber::generate("AUD", now, 0),
                created_at: now,
            },
        )
    }

    #[tokio::test]
    async fn test_builds_both_transport_modes() {
        assert!(SmtpEmailProvider::new(&smtp_config(true), StoreConfig::default()).is_ok());
        assert!(SmtpEmailProvider::new(&smtp_config(false), StoreConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_from_address_is_rejected() {
        let mut config = smtp_config(false);
        config.from = "not an address".to_string();

        let err = SmtpEmailProvider::new(&config, StoreConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, CheckoutError::Email(_)));
    }

    #[tokio::test]
    async fn test_message_is_addressed_to_customer() {
        let provider = SmtpEmailProvider::new(&smtp_config(false), StoreConfig::default()).unwrap();

        let message = provider.build_message(&order("a@b.com")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("To: a@b.com"));
        assert!(raw.contains("Subject: Your Audiophile order AUD-"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[tokio::test]
    async fn test_unparseable_recipient_fails_before_sending() {
        let provider = SmtpEmailProvider::new(&smtp_config(false), StoreConfig::default()).unwrap();

        let err = provider.build_message(&order("nobody")).unwrap_err();
        assert!(matches!(err, CheckoutError::Email(_)));
    }
}
