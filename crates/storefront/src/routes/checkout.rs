//! Cart checkout route handlers.
//!
//! The cart checkout is two steps: "prepare" validates the form and shows
//! the WhatsApp link, then opening the link posts to `/checkout/sent`, which
//! schedules the cart reset. The form's own submit does nothing; only the
//! prepare button advances the flow.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use matgar_core::{
    CheckoutError, CheckoutFlow, CheckoutSettings, CustomerForm, Field, Locale, Phase, UiText,
    ValidationErrors,
};
use tower_sessions::Session;
use tracing::{debug, info, instrument};

use crate::error::{Result, add_breadcrumb};
use crate::routes::Layout;
use crate::routes::cart::CartView;
use crate::services::{HxTrigger, NoticeBuffer, Shopper, schedule_cart_reset};
use crate::state::AppState;

/// Extra time before a submitting fragment re-polls, so the reset has run.
const POLL_GRACE_MS: u64 = 250;

/// One input of the customer form.
#[derive(Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub input_type: &'static str,
    pub value: String,
    pub error: Option<String>,
    pub optional: bool,
}

/// The customer form as rendered.
#[derive(Clone)]
pub struct FormView {
    pub fields: Vec<FieldView>,
    pub readonly: bool,
}

impl FormView {
    /// Render `flow`'s form, with `errors` inline. Read-only outside editing.
    #[must_use]
    pub fn new(locale: Locale, flow: &CheckoutFlow, errors: Option<&ValidationErrors>) -> Self {
        let form = flow.form();
        Self {
            fields: Field::ALL
                .into_iter()
                .map(|field| FieldView {
                    name: field.name(),
                    label: field.label(locale),
                    placeholder: field.placeholder(locale),
                    input_type: match field {
                        Field::Phone1 | Field::Phone2 => "tel",
                        _ => "text",
                    },
                    value: form.value(field).to_string(),
                    error: errors.and_then(|e| e.get(field)).map(str::to_string),
                    optional: field.is_optional(),
                })
                .collect(),
            readonly: !flow.is_editing(),
        }
    }
}

/// Milliseconds a submitting fragment waits before asking for its new state.
#[must_use]
pub fn poll_after_ms(settings: &CheckoutSettings, flow: &CheckoutFlow) -> u64 {
    u64::try_from(settings.reset_delay(flow.kind()).as_millis())
        .unwrap_or(u64::MAX)
        .saturating_add(POLL_GRACE_MS)
}

/// Cart checkout fragment data.
#[derive(Clone)]
pub struct CartCheckoutView {
    pub cart: CartView,
    pub form: FormView,
    pub is_editing: bool,
    pub is_prepared: bool,
    pub is_submitting: bool,
    pub can_prepare: bool,
    pub link: Option<String>,
    pub poll_ms: u64,
}

impl CartCheckoutView {
    #[must_use]
    pub fn new(
        shopper: &mut Shopper,
        settings: &CheckoutSettings,
        errors: Option<&ValidationErrors>,
    ) -> Self {
        let can_prepare = shopper.can_prepare_cart();
        let flow = shopper.cart_flow();
        Self {
            cart: CartView::new(shopper.cart(), settings.locale),
            form: FormView::new(settings.locale, flow, errors),
            is_editing: flow.is_editing(),
            is_prepared: matches!(flow.phase(), Phase::Prepared(_)),
            is_submitting: matches!(flow.phase(), Phase::Submitting(_)),
            can_prepare,
            link: flow.link().map(|link| link.as_str().to_string()),
            poll_ms: poll_after_ms(settings, flow),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub layout: Layout,
    pub ui: &'static UiText,
    pub checkout: CartCheckoutView,
}

/// Cart checkout fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_checkout.html")]
pub struct CartCheckoutTemplate {
    pub ui: &'static UiText,
    pub checkout: CartCheckoutView,
}

/// The current checkout view. A session without a shopper sees an empty one.
async fn current_view(state: &AppState, session: &Session) -> Result<CartCheckoutView> {
    let settings = state.settings();
    Ok(match state.shoppers().peek(session).await? {
        Some(shared) => {
            let mut shopper = shared.lock().await;
            CartCheckoutView::new(&mut shopper, settings, None)
        }
        None => CartCheckoutView::new(&mut Shopper::default(), settings, None),
    })
}

/// Display the checkout page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let settings = state.settings();
    let checkout = current_view(&state, &session).await?;

    Ok(CheckoutShowTemplate {
        layout: Layout::new(settings),
        ui: settings.locale.ui_text(),
        checkout,
    })
}

/// Current checkout fragment (HTMX).
///
/// Polled while submitting; also refreshes the cart badge, since the reset
/// empties the cart.
#[instrument(skip(state, session))]
pub async fn form(State(state): State<AppState>, session: Session) -> Result<Response> {
    let settings = state.settings();
    let checkout = current_view(&state, &session).await?;

    Ok(fragment(settings, HxTrigger::new().cart_updated(), checkout))
}

/// Validate the form and build the WhatsApp link (HTMX).
#[instrument(skip(state, session, form))]
pub async fn prepare(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CustomerForm>,
) -> Result<Response> {
    let shopper = state.shoppers().for_session(&session).await?;
    let settings = state.settings();
    let mut shopper = shopper.lock().await;

    let notices = NoticeBuffer::default();
    let errors = match shopper.prepare_cart(settings, form, &notices) {
        Ok(_) => {
            let lines = shopper.cart().item_count().to_string();
            info!(items = %lines, "Cart order prepared");
            add_breadcrumb("checkout", "Prepared cart order", Some(&[("items", lines.as_str())]));
            None
        }
        Err(CheckoutError::Invalid(errors)) => {
            debug!(%errors, "Cart checkout form invalid");
            Some(errors)
        }
        Err(e) => {
            debug!(error = %e, "Cart checkout not prepared");
            None
        }
    };

    let checkout = CartCheckoutView::new(&mut shopper, settings, errors.as_ref());
    let trigger = HxTrigger::new().toasts(notices.into_notices());
    Ok(fragment(settings, trigger, checkout))
}

/// The shopper opened the prepared link; schedule the reset (HTMX).
#[instrument(skip(state, session))]
pub async fn sent(State(state): State<AppState>, session: Session) -> Result<Response> {
    let shared = state.shoppers().for_session(&session).await?;
    let settings = state.settings();
    let mut shopper = shared.lock().await;

    match shopper.activate_cart(settings) {
        Ok(delay) => {
            schedule_cart_reset(&shared, &mut shopper, delay);
            info!(delay_ms = %delay.as_millis(), "Cart link opened, reset scheduled");
        }
        Err(e) => debug!(error = %e, "Ignoring link activation"),
    }

    let checkout = CartCheckoutView::new(&mut shopper, settings, None);
    Ok(fragment(settings, HxTrigger::new(), checkout))
}

fn fragment(
    settings: &CheckoutSettings,
    trigger: HxTrigger,
    checkout: CartCheckoutView,
) -> Response {
    (
        trigger,
        CartCheckoutTemplate {
            ui: settings.locale.ui_text(),
            checkout,
        },
    )
        .into_response()
}
