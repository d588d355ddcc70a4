//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Product listing
//! GET  /health                     - Health check
//!
//! # Products
//! GET  /products/{handle}          - Product detail with quick checkout form
//! GET  /products/{handle}/checkout - Quick checkout form fragment (HTMX)
//! POST /products/{handle}/checkout - Submit quick checkout (opens WhatsApp)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                       - Cart page
//! POST /cart/add                   - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update                - Update quantity (returns cart_items fragment)
//! POST /cart/remove                - Remove item (returns cart_items fragment)
//! GET  /cart/count                 - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                   - Cart checkout page
//! GET  /checkout/form              - Cart checkout fragment (HTMX)
//! POST /checkout/prepare           - Validate and build the WhatsApp link
//! POST /checkout/sent              - The shopper opened the link; schedules the reset
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use matgar_core::{CheckoutSettings, UiText};

use crate::state::AppState;

/// Page chrome shared by every full page.
#[derive(Clone)]
pub struct Layout {
    pub lang: &'static str,
    pub dir: &'static str,
    pub store_name: String,
    pub ui: &'static UiText,
}

impl Layout {
    #[must_use]
    pub fn new(settings: &CheckoutSettings) -> Self {
        Self {
            lang: settings.locale.tag(),
            dir: settings.locale.direction(),
            store_name: settings.store_name.clone(),
            ui: settings.locale.ui_text(),
        }
    }
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{handle}", get(products::show))
        .route(
            "/{handle}/checkout",
            get(products::checkout_form).post(products::checkout),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/form", get(checkout::form))
        .route("/prepare", post(checkout::prepare))
        .route("/sent", post(checkout::sent))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
}
