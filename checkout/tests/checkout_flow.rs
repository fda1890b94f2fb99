//! Checkout flow tests against the in-memory providers.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use std::sync::Arc;
use storefront_checkout::mocks::{InMemoryOrderStore, MockEmailProvider};
use storefront_checkout::{
    CheckoutEnvironment, CheckoutError, Confirmation, OrderStore, lookup_order, place_order,
};
use storefront_core::environment::Clock;
use storefront_core::{
    DEFAULT_ORDER_PREFIX, OrderId, OrderNumber, OrderReceipt, OrderStatus, PaymentMethod,
    StoredOrder,
};
use storefront_testing::{FixedClock, fixtures, properties, reference_clock, test_clock};

type TestEnv = CheckoutEnvironment<InMemoryOrderStore, MockEmailProvider>;

fn env_with(clock: FixedClock, email: MockEmailProvider) -> TestEnv {
    CheckoutEnvironment::with_clock(InMemoryOrderStore::default(), email, Arc::new(clock))
}

fn test_env() -> TestEnv {
    env_with(test_clock(), MockEmailProvider::new())
}

#[tokio::test]
async fn test_fourth_order_of_the_day_and_lookup() {
    let clock = reference_clock();
    let env = env_with(clock.clone(), MockEmailProvider::new());
    for earlier in 0..3 {
        let receipt = OrderReceipt {
            order_id: OrderId::generate(),
            order_number: OrderNumber::generate(DEFAULT_ORDER_PREFIX, clock.now(), earlier),
            created_at: clock.now(),
        };
        env.orders
            .seed(StoredOrder::from_receipt(fixtures::headphones_payload(), &receipt))
            .unwrap();
    }

    let outcome = place_order(&env, fixtures::reference_payload()).await.unwrap();

    assert_eq!(outcome.receipt.order_number.as_str(), "AUD-20240301-0004");
    assert_eq!(outcome.receipt.created_at, clock.now());
    assert_eq!(outcome.confirmation, Confirmation::Sent);

    let found = lookup_order(&env, &outcome.receipt.order_id.to_string())
        .await
        .unwrap()
        .expect("order should be found");
    assert_eq!(found.receipt(), outcome.receipt);
    assert_eq!(found.status, OrderStatus::Received);
    assert_eq!(found.payload, fixtures::reference_payload());

    let sent = env.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], found);
}

#[tokio::test]
async fn test_empty_cart_is_rejected_without_persisting() {
    let env = test_env();

    let err = place_order(&env, fixtures::empty_cart_payload()).await.unwrap_err();

    assert_eq!(
        err,
        CheckoutError::InvalidPayload("items must contain at least one item".to_string())
    );
    assert!(err.is_user_error());
    assert_eq!(env.orders.create_calls(), 0);
    assert!(env.email.attempts().is_empty());
}

#[tokio::test]
async fn test_malformed_email_is_rejected_without_persisting() {
    let env = test_env();

    for address in [".a@b.com", "a.@b.com", "a..b@c.com", "a@-b.com", "a@b-.com", "a@b.c"] {
        let mut payload = fixtures::reference_payload();
        payload.customer.email_address = address.to_string();

        let err = place_order(&env, payload).await.unwrap_err();

        assert_eq!(
            err,
            CheckoutError::InvalidPayload(
                "customer.emailAddress must be a valid email address".to_string()
            ),
            "{address} should be rejected"
        );
    }
    assert_eq!(env.orders.create_calls(), 0);
    assert!(env.email.attempts().is_empty());
}

#[tokio::test]
async fn test_every_violation_is_reported() {
    let env = test_env();
    let mut payload = fixtures::reference_payload();
    payload.customer.name = "  ".to_string();
    payload.shipping.city = String::new();
    payload.items[0].quantity = 0;

    let err = place_order(&env, payload).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Invalid checkout payload: customer.name is required, shipping.city is required, \
         items[0].quantity must be a positive integer"
    );
}

#[tokio::test]
async fn test_e_money_without_credentials_is_accepted() {
    let env = test_env();

    let outcome = place_order(&env, fixtures::e_money_payload()).await.unwrap();

    let found = lookup_order(&env, &outcome.receipt.order_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.payload.payment.method, PaymentMethod::EMoney);
    assert_eq!(found.payload.payment.e_money_number, None);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let env = test_env();

    let found = lookup_order(&env, &OrderId::generate().to_string()).await.unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn test_notification_failure_keeps_the_order() {
    let env = env_with(test_clock(), MockEmailProvider::failing());

    let outcome = place_order(&env, fixtures::reference_payload()).await.unwrap();

    assert!(matches!(outcome.confirmation, Confirmation::Failed { .. }));
    assert_eq!(env.email.attempts().len(), 1);
    assert!(env.email.sent().is_empty());

    let found = lookup_order(&env, &outcome.receipt.order_id.to_string())
        .await
        .unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn test_persistence_failure_sends_nothing() {
    let env = test_env();
    env.orders.fail_creates(true);

    let err = place_order(&env, fixtures::reference_payload()).await.unwrap_err();

    assert!(matches!(err, CheckoutError::Database(_)));
    assert!(!err.is_user_error());
    assert!(env.email.attempts().is_empty());
}

#[tokio::test]
async fn test_numbering_restarts_on_a_new_day() {
    let env = env_with(reference_clock(), MockEmailProvider::new());
    let yesterday = reference_clock().now() - chrono::Duration::seconds(1);
    env.orders
        .create_order(&fixtures::reference_payload(), yesterday)
        .await
        .unwrap();

    let outcome = place_order(&env, fixtures::reference_payload()).await.unwrap();

    assert_eq!(outcome.receipt.order_number.as_str(), "AUD-20240301-0001");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checkouts_get_distinct_numbers() {
    let env = Arc::new(env_with(reference_clock(), MockEmailProvider::new()));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let env = Arc::clone(&env);
            tokio::spawn(async move { place_order(&env, fixtures::reference_payload()).await })
        })
        .collect();

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap().unwrap().receipt.order_number);
    }
    numbers.sort();
    numbers.dedup();

    assert_eq!(numbers.len(), 20);
    assert_eq!(numbers[0].as_str(), "AUD-20240301-0001");
    assert_eq!(numbers[19].as_str(), "AUD-20240301-0020");
}

proptest! {
    #[test]
    fn prop_valid_payloads_are_stored_verbatim(
        payloads in proptest::collection::vec(properties::arb_order_payload(), 1..6)
    ) {
        let env = env_with(reference_clock(), MockEmailProvider::new());

        for (index, payload) in payloads.into_iter().enumerate() {
            let outcome = tokio_test::block_on(place_order(&env, payload.clone())).unwrap();
            prop_assert_eq!(outcome.receipt.order_number.sequence(), Some(u64::try_from(index).unwrap() + 1));

            let found = tokio_test::block_on(
                lookup_order(&env, &outcome.receipt.order_id.to_string()),
            )
            .unwrap()
            .unwrap();
            prop_assert_eq!(found.payload, payload);
        }
    }
}
