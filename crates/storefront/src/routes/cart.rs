//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart lives with the shopper, found through the session.

use std::num::NonZeroU32;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use matgar_core::{Cart, LineItem, Locale, MemoryCart, UiText};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, instrument};

use crate::error::{AppError, Result};
use crate::routes::Layout;
use crate::services::HxTrigger;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct LineView {
    pub handle: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<LineView>,
    pub total: String,
    pub item_count: u32,
    pub is_empty: bool,
}

impl CartView {
    /// Render `cart` with amounts formatted for `locale`.
    #[must_use]
    pub fn new(cart: &MemoryCart, locale: Locale) -> Self {
        Self {
            lines: cart
                .items()
                .iter()
                .map(|line| LineView {
                    handle: line.key().to_string(),
                    name: line.name.clone(),
                    quantity: line.quantity.get(),
                    unit_price: line.unit_price.localized(locale),
                    line_total: line.line_total().localized(locale),
                })
                .collect(),
            total: cart.total().localized(locale),
            item_count: cart.item_count(),
            is_empty: cart.is_empty(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub handle: String,
    pub quantity: Option<u32>,
}

/// Update cart form data. A quantity of zero removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub handle: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub handle: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub ui: &'static UiText,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub ui: &'static UiText,
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let locale = state.settings().locale;
    let cart = match state.shoppers().peek(&session).await? {
        Some(shopper) => {
            let shopper = shopper.lock().await;
            CartView::new(shopper.cart(), locale)
        }
        None => CartView::new(&MemoryCart::new(), locale),
    };

    Ok(CartShowTemplate {
        layout: Layout::new(state.settings()),
        ui: locale.ui_text(),
        cart,
    })
}

/// Add item to cart (HTMX).
///
/// Returns the new count badge and triggers `cart-updated`.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .get(&form.handle)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.handle)))?;
    let quantity = NonZeroU32::new(form.quantity.unwrap_or(1))
        .ok_or_else(|| AppError::BadRequest("quantity must be at least 1".to_string()))?;

    let shopper = state.shoppers().for_session(&session).await?;
    let count = {
        let mut shopper = shopper.lock().await;
        shopper.cart_mut().add(LineItem::of(product, quantity));
        shopper.cart().item_count()
    };
    debug!(handle = %product.handle, quantity = quantity.get(), count, "Added to cart");

    Ok((HxTrigger::new().cart_updated(), CartCountTemplate { count }).into_response())
}

/// Update cart item quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let shopper = state.shoppers().for_session(&session).await?;
    let mut shopper = shopper.lock().await;

    let changed = match NonZeroU32::new(form.quantity) {
        Some(quantity) => shopper.cart_mut().set_quantity(&form.handle, quantity),
        None => shopper.cart_mut().remove(&form.handle),
    };
    if !changed {
        debug!(handle = %form.handle, "Cart line not found");
    }

    let cart = CartView::new(shopper.cart(), state.settings().locale);
    Ok(items_response(state.settings().locale, cart))
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let shopper = state.shoppers().for_session(&session).await?;
    let mut shopper = shopper.lock().await;

    if !shopper.cart_mut().remove(&form.handle) {
        debug!(handle = %form.handle, "Cart line not found");
    }

    let cart = CartView::new(shopper.cart(), state.settings().locale);
    Ok(items_response(state.settings().locale, cart))
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let count = match state.shoppers().peek(&session).await? {
        Some(shopper) => {
            let shopper = shopper.lock().await;
            shopper.cart().item_count()
        }
        None => 0,
    };
    Ok(CartCountTemplate { count })
}

fn items_response(locale: Locale, cart: CartView) -> Response {
    (
        HxTrigger::new().cart_updated(),
        CartItemsTemplate {
            ui: locale.ui_text(),
            cart,
        },
    )
        .into_response()
}
