//! Integration tests for the Matgar.tech storefront.
//!
//! The storefront router is driven in-process with
//! [`tower::ServiceExt::oneshot`]; no server or network is involved.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p matgar-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_checkout` - Cart, prepare, activate and the delayed reset
//! - `quick_checkout` - Single-product checkout from the product page
//! - `pages` - Page rendering, headers and sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use matgar_core::{CheckoutSettings, Locale};
use matgar_storefront::{app, config::StorefrontConfig, state::AppState};
use serde_json::Value;
use tower::ServiceExt;

/// Reset delay used for the cart flow in tests.
pub const CART_RESET_DELAY: Duration = Duration::from_millis(60);

/// Reset delay used for the quick flow in tests.
pub const QUICK_RESET_DELAY: Duration = Duration::from_millis(90);

/// A valid customer, as form fields.
pub const VALID_CUSTOMER: &[(&str, &str)] = &[
    ("name", "Alice"),
    ("phone1", "01012345678"),
    ("phone2", ""),
    ("governorate", "Cairo"),
    ("city", "Nasr City"),
    ("village", ""),
    ("street", "12 Abbas St"),
];

/// Storefront configuration for tests: English, short reset delays.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        checkout: CheckoutSettings {
            locale: Locale::En,
            cart_reset_delay: CART_RESET_DELAY,
            quick_reset_delay: QUICK_RESET_DELAY,
            ..CheckoutSettings::default()
        },
        ..StorefrontConfig::default()
    }
}

/// A response, fully read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The parsed `HX-Trigger` header, if any.
    ///
    /// # Panics
    ///
    /// Panics if the header is not valid JSON.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn hx_trigger(&self) -> Option<Value> {
        let value = self.headers.get("hx-trigger")?;
        Some(serde_json::from_str(value.to_str().unwrap()).unwrap())
    }

    /// The payload of the `event` trigger, if present.
    #[must_use]
    pub fn trigger_event(&self, event: &str) -> Option<Value> {
        self.hx_trigger()?.get(event).cloned()
    }
}

/// One browser: a router plus the session cookie it was handed.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// A client against a fresh storefront built from `config`.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        Self::with_state(AppState::from_config(config).unwrap_or_else(|e| panic!("{e}")))
    }

    /// A client against an existing storefront, sharing its shoppers.
    #[must_use]
    pub fn with_state(state: AppState) -> Self {
        Self {
            app: app(state),
            cookie: None,
        }
    }

    /// `GET path`.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Request::get(path), Body::empty()).await
    }

    /// `POST path` with a form-encoded body.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(path).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(request, Body::from(body)).await
    }

    #[allow(clippy::unwrap_used)]
    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

/// Wait for a scheduled reset of `delay` to have run.
pub async fn wait_for_reset(delay: Duration) {
    tokio::time::sleep(delay + Duration::from_millis(100)).await;
}
