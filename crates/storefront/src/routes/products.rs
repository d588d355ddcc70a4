//! Product route handlers.
//!
//! Each product page carries a quick checkout form: one step, for that
//! product alone, quantity one. A valid submit opens WhatsApp right away and
//! the form resets after a short delay.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use matgar_core::{
    CheckoutError, CheckoutFlow, CheckoutSettings, CustomerForm, Handoff, Locale, OrderKind,
    Product, UiText,
};
use tower_sessions::Session;
use tracing::{debug, info, instrument};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::routes::Layout;
use crate::routes::checkout::{FormView, poll_after_ms};
use crate::services::{HxTrigger, NoticeBuffer, schedule_quick_reset};
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub handle: String,
    pub name: String,
    pub price: String,
    pub description: String,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, locale: Locale) -> Self {
        Self {
            handle: product.handle.clone(),
            name: product.name.clone(),
            price: product.price.localized(locale),
            description: product.description.clone(),
        }
    }
}

/// Quick checkout fragment data.
#[derive(Clone)]
pub struct QuickCheckoutView {
    pub handle: String,
    pub form: FormView,
    pub is_submitting: bool,
    pub poll_ms: u64,
}

impl QuickCheckoutView {
    #[must_use]
    pub fn new(
        product: &Product,
        flow: &CheckoutFlow,
        settings: &CheckoutSettings,
        errors: Option<&matgar_core::ValidationErrors>,
    ) -> Self {
        Self {
            handle: product.handle.clone(),
            form: FormView::new(settings.locale, flow, errors),
            is_submitting: !flow.is_editing(),
            poll_ms: poll_after_ms(settings, flow),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub ui: &'static UiText,
    pub product: ProductView,
    pub checkout: QuickCheckoutView,
}

/// Quick checkout fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/quick_checkout.html")]
pub struct QuickCheckoutTemplate {
    pub ui: &'static UiText,
    pub checkout: QuickCheckoutView,
}

fn find_product<'a>(state: &'a AppState, handle: &str) -> Result<&'a Product> {
    state
        .catalog()
        .get(handle)
        .ok_or_else(|| AppError::NotFound(format!("product {handle}")))
}

/// Quick checkout flow for `handle`, without starting a session for a
/// shopper that has none yet.
async fn current_flow(state: &AppState, session: &Session, handle: &str) -> Result<CheckoutFlow> {
    Ok(match state.shoppers().peek(session).await? {
        Some(shopper) => {
            let shopper = shopper.lock().await;
            shopper.quick_flow(handle)
        }
        None => CheckoutFlow::new(OrderKind::SingleItem),
    })
}

/// Display product detail page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(handle): Path<String>,
) -> Result<impl IntoResponse> {
    let product = find_product(&state, &handle)?;
    let settings = state.settings();
    let flow = current_flow(&state, &session, &handle).await?;

    Ok(ProductShowTemplate {
        layout: Layout::new(settings),
        ui: settings.locale.ui_text(),
        product: ProductView::new(product, settings.locale),
        checkout: QuickCheckoutView::new(product, &flow, settings, None),
    })
}

/// Current quick checkout fragment (HTMX). Polled while submitting.
#[instrument(skip(state, session))]
pub async fn checkout_form(
    State(state): State<AppState>,
    session: Session,
    Path(handle): Path<String>,
) -> Result<Response> {
    let product = find_product(&state, &handle)?;
    let settings = state.settings();
    let flow = current_flow(&state, &session, &handle).await?;

    let checkout = QuickCheckoutView::new(product, &flow, settings, None);
    Ok(fragment(settings, HxTrigger::new(), checkout))
}

/// Submit the quick checkout (HTMX).
///
/// On success the response asks the browser to open the WhatsApp link and
/// the form reset is scheduled.
#[instrument(skip(state, session, form))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Path(handle): Path<String>,
    Form(form): Form<CustomerForm>,
) -> Result<Response> {
    let product = find_product(&state, &handle)?;
    let settings = state.settings();
    let shared = state.shoppers().for_session(&session).await?;
    let mut shopper = shared.lock().await;

    let notices = NoticeBuffer::default();
    let mut trigger = HxTrigger::new();
    let errors = match shopper.prepare_quick(settings, product, form, &notices) {
        Ok(Handoff::OpenNow { link, reset_after }) => {
            schedule_quick_reset(&shared, &mut shopper, product.clone(), reset_after);
            trigger = trigger.open_link(&link);
            info!(%handle, "Quick order sent to WhatsApp");
            add_breadcrumb("checkout", "Quick order", Some(&[("product", handle.as_str())]));
            None
        }
        Ok(Handoff::AwaitActivation(_)) => None,
        Err(CheckoutError::Invalid(errors)) => {
            debug!(%errors, "Quick checkout form invalid");
            Some(errors)
        }
        Err(e) => {
            debug!(error = %e, "Quick checkout not submitted");
            None
        }
    };

    let flow = shopper.quick_flow(&handle);
    let checkout = QuickCheckoutView::new(product, &flow, settings, errors.as_ref());
    Ok(fragment(
        settings,
        trigger.toasts(notices.into_notices()),
        checkout,
    ))
}

fn fragment(
    settings: &CheckoutSettings,
    trigger: HxTrigger,
    checkout: QuickCheckoutView,
) -> Response {
    (
        trigger,
        QuickCheckoutTemplate {
            ui: settings.locale.ui_text(),
            checkout,
        },
    )
        .into_response()
}
