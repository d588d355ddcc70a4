//! Integration tests for the cart checkout.
//!
//! Prepare validates and shows the link, opening the link schedules the reset,
//! and the reset empties both the cart and the form.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use matgar_core::{ChatLink, Price, Product};
use matgar_integration_tests::{
    CART_RESET_DELAY, TestClient, VALID_CUSTOMER, test_config, wait_for_reset,
};
use matgar_storefront::{catalog::Catalog, state::AppState};

const LINK_PREFIX: &str = "https://wa.me/201557219572?text=";

async fn client_with_cart() -> TestClient {
    let mut client = TestClient::new(test_config());
    let response = client
        .post_form("/cart/add", &[("handle", "classic-watch"), ("quantity", "2")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.trim(), "2");
    assert!(response.trigger_event("cart-updated").is_some());
    client
}

fn extract_link(body: &str) -> String {
    let start = body.find(LINK_PREFIX).unwrap();
    let end = body[start..].find('"').unwrap();
    body[start..start + end].to_string()
}

// =============================================================================
// Prepare
// =============================================================================

#[tokio::test]
async fn test_prepare_invalid_shows_errors_and_destructive_notice() {
    let mut client = client_with_cart().await;

    let response = client
        .post_form(
            "/checkout/prepare",
            &[("name", "Al"), ("phone1", "123"), ("street", "12 Abbas St")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Name must be at least 3 characters"));
    assert!(response.body.contains("The primary phone number is invalid"));
    assert!(response.body.contains("Please enter the governorate"));
    assert!(!response.body.contains(LINK_PREFIX));

    let toast = response.trigger_event("toast").unwrap();
    let notices = toast["notices"].as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["title"], "Invalid details");
    assert_eq!(notices[0]["severity"], "destructive");

    // Submitted values are kept for correction.
    assert!(response.body.contains(r#"value="Al""#));
}

#[tokio::test]
async fn test_prepare_valid_shows_link_and_notice() {
    let mut client = client_with_cart().await;

    let response = client.post_form("/checkout/prepare", VALID_CUSTOMER).await;

    assert_eq!(response.status, StatusCode::OK);
    let toast = response.trigger_event("toast").unwrap();
    assert_eq!(toast["notices"][0]["title"], "Your order is ready!");
    assert_eq!(toast["notices"][0]["severity"], "default");
    // No new tab for the cart flow; the shopper clicks the link.
    assert!(response.trigger_event("open-link").is_none());

    let link = extract_link(&response.body);
    let (_, text) = ChatLink::parse(&link).unwrap();
    assert!(text.contains("Alice"));
    assert!(text.contains("(quantity: 2)"));
    assert!(text.contains("3,000"));
    assert!(response.body.contains(r#"data-activate="/checkout/sent""#));
    assert!(response.body.contains("readonly"));
}

#[tokio::test]
async fn test_prepare_with_empty_cart_does_nothing() {
    let mut client = TestClient::new(test_config());

    let page = client.get("/checkout").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Your cart is empty."));
    assert!(page.body.contains("disabled"));

    let response = client.post_form("/checkout/prepare", VALID_CUSTOMER).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.hx_trigger().is_none());
    assert!(!response.body.contains(LINK_PREFIX));
}

// =============================================================================
// Activation and reset
// =============================================================================

#[tokio::test]
async fn test_sent_schedules_reset_that_clears_cart_and_form() {
    let mut client = client_with_cart().await;
    client.post_form("/checkout/prepare", VALID_CUSTOMER).await;

    let response = client.post_form("/checkout/sent", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Sending..."));
    assert!(response.body.contains(r#"hx-get="/checkout/form""#));

    // Still intact before the delay elapses.
    assert_eq!(client.get("/cart/count").await.body.trim(), "2");

    wait_for_reset(CART_RESET_DELAY).await;

    assert_eq!(client.get("/cart/count").await.body.trim(), "0");
    let form = client.get("/checkout/form").await;
    assert!(form.body.contains("Your cart is empty."));
    assert!(!form.body.contains("Alice"));
    assert!(!form.body.contains(LINK_PREFIX));
    assert!(form.trigger_event("cart-updated").is_some());
}

#[tokio::test]
async fn test_sent_without_prepare_is_ignored() {
    let mut client = client_with_cart().await;

    let response = client.post_form("/checkout/sent", &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body.contains("Sending..."));

    wait_for_reset(CART_RESET_DELAY).await;
    assert_eq!(client.get("/cart/count").await.body.trim(), "2");
}

#[tokio::test]
async fn test_prepare_ignored_while_prepared() {
    let mut client = client_with_cart().await;
    client.post_form("/checkout/prepare", VALID_CUSTOMER).await;

    let response = client
        .post_form("/checkout/prepare", &[("name", "Bob")])
        .await;
    assert!(response.hx_trigger().is_none());
    assert!(response.body.contains("Alice"));
    assert!(response.body.contains(LINK_PREFIX));
}

// =============================================================================
// Cart edits
// =============================================================================

#[tokio::test]
async fn test_update_and_remove_lines() {
    let mut client = client_with_cart().await;
    let handle = "classic-watch";

    let response = client
        .post_form("/cart/update", &[("handle", handle), ("quantity", "5")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("7,500"));
    assert_eq!(client.get("/cart/count").await.body.trim(), "5");

    let response = client.post_form("/cart/remove", &[("handle", handle)]).await;
    assert!(response.body.contains("Your cart is empty."));
    assert!(response.trigger_event("cart-updated").is_some());
    assert_eq!(client.get("/cart/count").await.body.trim(), "0");
}

#[tokio::test]
async fn test_products_sharing_a_name_stay_separate_lines() {
    let widget = |handle: &str, price: u32| Product {
        handle: handle.to_string(),
        name: "Widget".to_string(),
        price: Price::from_whole(price),
        description: String::new(),
    };
    let catalog =
        Catalog::new(vec![widget("widget-small", 50), widget("widget-large", 75)]).unwrap();
    let mut client = TestClient::with_state(AppState::new(test_config(), catalog));

    client
        .post_form("/cart/add", &[("handle", "widget-small")])
        .await;
    let response = client
        .post_form("/cart/add", &[("handle", "widget-large")])
        .await;
    assert_eq!(response.body.trim(), "2");

    let cart = client.get("/cart").await;
    assert!(cart.body.contains(r#"value="widget-small""#));
    assert!(cart.body.contains(r#"value="widget-large""#));
    assert!(cart.body.contains("125"));

    let response = client
        .post_form("/cart/remove", &[("handle", "widget-small")])
        .await;
    assert!(!response.body.contains(r#"value="widget-small""#));
    assert!(response.body.contains(r#"value="widget-large""#));
    assert_eq!(client.get("/cart/count").await.body.trim(), "1");
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let mut client = TestClient::new(test_config());
    let response = client
        .post_form("/cart/add", &[("handle", "no-such-thing")])
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_zero_quantity_is_bad_request() {
    let mut client = TestClient::new(test_config());
    let response = client
        .post_form("/cart/add", &[("handle", "classic-watch"), ("quantity", "0")])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
