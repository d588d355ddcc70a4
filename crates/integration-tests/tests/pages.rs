//! Integration tests for page rendering, headers and sessions.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use matgar_core::{CheckoutSettings, Locale};
use matgar_integration_tests::{TestClient, test_config};
use matgar_storefront::{config::StorefrontConfig, state::AppState};

#[tokio::test]
async fn test_health() {
    let mut client = TestClient::new(test_config());
    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_home_lists_catalog() {
    let mut client = TestClient::new(test_config());
    let response = client.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"<html lang="en" dir="ltr">"#));
    assert!(response.body.contains(r#"href="/products/classic-watch""#));
    assert!(response.body.contains(r#"href="/products/travel-backpack""#));
    assert!(response.body.contains("1,500"));
}

#[tokio::test]
async fn test_arabic_pages_are_rtl_with_currency() {
    let config = StorefrontConfig {
        checkout: CheckoutSettings {
            locale: Locale::ArEg,
            ..CheckoutSettings::default()
        },
        ..StorefrontConfig::default()
    };
    let mut client = TestClient::new(config);
    let response = client.get("/products/classic-watch").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"<html lang="ar-EG" dir="rtl">"#));
    assert!(response.body.contains("١٬٥٠٠ جنيه"));
    assert!(response.body.contains("إرسال الطلب عبر واتساب"));
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let mut client = TestClient::new(test_config());
    let response = client.get("/").await;

    assert_eq!(response.headers["x-frame-options"], "DENY");
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["cache-control"], "no-store");
    assert!(response.headers.contains_key("content-security-policy"));
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_session_cookie_keeps_cart() {
    let mut client = TestClient::new(test_config());
    let response = client
        .post_form("/cart/add", &[("handle", "classic-watch")])
        .await;
    assert!(
        response
            .headers
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("matgar_session=")
    );

    assert_eq!(client.get("/cart/count").await.body.trim(), "1");
}

#[tokio::test]
async fn test_shoppers_do_not_share_carts() {
    let state = AppState::from_config(test_config()).unwrap();
    let mut alice = TestClient::with_state(state.clone());
    let mut bob = TestClient::with_state(state);

    alice
        .post_form("/cart/add", &[("handle", "classic-watch")])
        .await;

    assert_eq!(alice.get("/cart/count").await.body.trim(), "1");
    assert_eq!(bob.get("/cart/count").await.body.trim(), "0");
}

#[tokio::test]
async fn test_reading_pages_starts_no_session() {
    let mut client = TestClient::new(test_config());

    for path in ["/", "/cart", "/cart/count", "/checkout", "/products/classic-watch"] {
        let response = client.get(path).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
        assert!(!response.headers.contains_key("set-cookie"), "{path}");
    }
}
