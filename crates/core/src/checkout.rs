//! The checkout state machine shared by the cart and quick checkout forms.
//!
//! ```text
//!                prepare (multi-item)              activate
//!   Editing ──────────────────────────▶ Prepared ───────────▶ Submitting
//!      ▲  │                                                      │
//!      │  └──────────────────────────────────────────────────────┤
//!      │              prepare (single-item, link opens now)      │
//!      └──────────────────────── complete ───────────────────────┘
//!                    (after the reset delay: clear source, reset form)
//! ```
//!
//! The machine is pure. It never sleeps or opens anything: [`Handoff`] tells
//! the caller whether to show the link or open it, and how long to wait
//! before calling [`CheckoutFlow::complete`].

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::deep_link::{ChatLink, RecipientId};
use crate::message::OrderMessage;
use crate::types::{CustomerForm, Locale, OrderKind, OrderSource, ValidationErrors};

/// Delay between the shopper opening the cart link and the cart being cleared.
pub const DEFAULT_CART_RESET_DELAY: Duration = Duration::from_millis(1500);

/// Delay between the quick form opening the link and the form being reset.
pub const DEFAULT_QUICK_RESET_DELAY: Duration = Duration::from_millis(2000);

/// Store name used in message headers.
pub const DEFAULT_STORE_NAME: &str = "Matgar.tech";

/// Settings shared by every checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Who receives the order message.
    pub recipient: RecipientId,
    /// Store name shown in the message header.
    pub store_name: String,
    /// Display locale for messages and notices.
    pub locale: Locale,
    /// Reset delay after the cart link is activated.
    pub cart_reset_delay: Duration,
    /// Reset delay after the quick form opens its link.
    pub quick_reset_delay: Duration,
}

impl CheckoutSettings {
    /// The reset delay for a flow of `kind`.
    #[must_use]
    pub const fn reset_delay(&self, kind: OrderKind) -> Duration {
        match kind {
            OrderKind::MultiItem => self.cart_reset_delay,
            OrderKind::SingleItem => self.quick_reset_delay,
        }
    }
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            recipient: RecipientId::default(),
            store_name: DEFAULT_STORE_NAME.to_owned(),
            locale: Locale::default(),
            cart_reset_delay: DEFAULT_CART_RESET_DELAY,
            quick_reset_delay: DEFAULT_QUICK_RESET_DELAY,
        }
    }
}

/// How prominent a notice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Default,
    Destructive,
}

/// A short, transient message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    fn new(title: &str, description: &str, severity: Severity) -> Self {
        Self {
            title: title.to_owned(),
            description: description.to_owned(),
            severity,
        }
    }
}

/// The notification collaborator. Fire-and-forget.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

impl<F: Fn(Notice)> Notifier for F {
    fn notify(&self, notice: Notice) {
        self(notice);
    }
}

/// Where a flow is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Filling in the form. The quick form's idle state.
    #[default]
    Editing,
    /// The link is built and shown; waiting for the shopper to open it.
    Prepared(ChatLink),
    /// The link has been opened; waiting for the reset delay to pass.
    Submitting(ChatLink),
}

impl Phase {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Editing => "editing",
            Self::Prepared(_) => "prepared",
            Self::Submitting(_) => "submitting",
        }
    }
}

/// What the caller must do after a successful [`CheckoutFlow::prepare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handoff {
    /// Show the link; the shopper opens it, then call [`CheckoutFlow::activate`].
    AwaitActivation(ChatLink),
    /// Open the link in a new browsing context now, then call
    /// [`CheckoutFlow::complete`] after `reset_after`.
    OpenNow {
        link: ChatLink,
        reset_after: Duration,
    },
}

/// Why a transition was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// There is nothing to order. The prepare action is unavailable.
    #[error("the order has no items")]
    EmptyOrder,
    /// One or more fields failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    /// The flow is not accepting form submissions right now.
    #[error("checkout is {0}, not editing")]
    NotEditing(&'static str),
    /// There is no prepared link to activate.
    #[error("checkout is {0}, not prepared")]
    NotPrepared(&'static str),
}

/// One checkout form and its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutFlow {
    kind: OrderKind,
    phase: Phase,
    form: CustomerForm,
}

impl CheckoutFlow {
    /// A fresh flow with an empty form.
    #[must_use]
    pub fn new(kind: OrderKind) -> Self {
        Self {
            kind,
            phase: Phase::Editing,
            form: CustomerForm::default(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> OrderKind {
        self.kind
    }

    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The values currently in the form.
    #[must_use]
    pub const fn form(&self) -> &CustomerForm {
        &self.form
    }

    /// The built link, if any.
    #[must_use]
    pub const fn link(&self) -> Option<&ChatLink> {
        match &self.phase {
            Phase::Editing => None,
            Phase::Prepared(link) | Phase::Submitting(link) => Some(link),
        }
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self.phase, Phase::Editing)
    }

    /// Whether the prepare/submit action should be offered.
    #[must_use]
    pub fn can_prepare(&self, source: &impl OrderSource) -> bool {
        self.is_editing() && !source.is_empty()
    }

    /// Validate `form`, build the message and link, and advance.
    ///
    /// The submitted values are kept even when validation fails, so the form
    /// can be shown again with its errors.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotEditing`] outside [`Phase::Editing`]
    /// - [`CheckoutError::EmptyOrder`] if `source` has no items (no notice)
    /// - [`CheckoutError::Invalid`] if any field fails; multi-item flows also
    ///   raise a destructive summary notice
    pub fn prepare(
        &mut self,
        settings: &CheckoutSettings,
        form: CustomerForm,
        source: &impl OrderSource,
        notifier: &impl Notifier,
    ) -> Result<Handoff, CheckoutError> {
        if !self.is_editing() {
            return Err(CheckoutError::NotEditing(self.phase.name()));
        }
        self.form = form;

        if source.is_empty() {
            return Err(CheckoutError::EmptyOrder);
        }

        let ui = settings.locale.ui_text();
        let customer = match self.form.validate(settings.locale) {
            Ok(customer) => customer,
            Err(errors) => {
                if self.kind.shows_failure_notice() {
                    notifier.notify(Notice::new(
                        ui.invalid_title,
                        ui.invalid_description,
                        Severity::Destructive,
                    ));
                }
                return Err(errors.into());
            }
        };

        let message = OrderMessage::build(settings, &customer, source);
        let link = ChatLink::for_message(&settings.recipient, &message);

        if self.kind.awaits_activation() {
            notifier.notify(Notice::new(
                ui.prepared_title,
                ui.prepared_description,
                Severity::Default,
            ));
            self.phase = Phase::Prepared(link.clone());
            Ok(Handoff::AwaitActivation(link))
        } else {
            notifier.notify(Notice::new(
                ui.prepared_title,
                ui.redirect_description,
                Severity::Default,
            ));
            self.phase = Phase::Submitting(link.clone());
            Ok(Handoff::OpenNow {
                link,
                reset_after: settings.reset_delay(self.kind),
            })
        }
    }

    /// The shopper opened the prepared link. Returns the reset delay.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotPrepared`] outside [`Phase::Prepared`].
    pub fn activate(&mut self, settings: &CheckoutSettings) -> Result<Duration, CheckoutError> {
        match core::mem::take(&mut self.phase) {
            Phase::Prepared(link) => {
                self.phase = Phase::Submitting(link);
                Ok(settings.reset_delay(self.kind))
            }
            other => {
                let name = other.name();
                self.phase = other;
                Err(CheckoutError::NotPrepared(name))
            }
        }
    }

    /// Finish a hand-off: run the source's after-send hook, reset the form and
    /// drop the link.
    ///
    /// Returns `false` and does nothing outside [`Phase::Submitting`].
    pub fn complete(&mut self, source: &mut impl OrderSource) -> bool {
        if !matches!(self.phase, Phase::Submitting(_)) {
            return false;
        }
        source.after_send();
        self.form.reset();
        self.phase = Phase::Editing;
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::cell::RefCell;
    use core::num::NonZeroU32;

    use super::*;
    use crate::types::customer::tests::valid_form;
    use crate::types::{Cart, CartOrder, Field, LineItem, MemoryCart, Price, Product, ProductOrder};

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Notice>>);

    impl Notifier for Recorder {
        fn notify(&self, notice: Notice) {
            self.0.borrow_mut().push(notice);
        }
    }

    impl Recorder {
        fn severities(&self) -> Vec<Severity> {
            self.0.borrow().iter().map(|n| n.severity).collect()
        }
    }

    fn english() -> CheckoutSettings {
        CheckoutSettings {
            locale: Locale::En,
            ..CheckoutSettings::default()
        }
    }

    fn widget_cart() -> MemoryCart {
        [LineItem::new(
            "Widget",
            NonZeroU32::new(2).unwrap(),
            Price::from_whole(50),
        )]
        .into_iter()
        .collect()
    }

    fn gadget() -> Product {
        Product {
            handle: "gadget".to_string(),
            name: "Gadget".to_string(),
            price: Price::from_whole(75),
            description: String::new(),
        }
    }

    #[test]
    fn test_cart_flow_prepares_then_completes() {
        let settings = english();
        let notices = Recorder::default();
        let mut cart = widget_cart();
        let mut flow = CheckoutFlow::new(OrderKind::MultiItem);

        let handoff = flow
            .prepare(&settings, valid_form(), &CartOrder::new(&mut cart), &notices)
            .unwrap();
        let Handoff::AwaitActivation(link) = handoff else {
            panic!("cart flow should wait for activation");
        };
        assert!(matches!(flow.phase(), Phase::Prepared(_)));
        assert_eq!(flow.link(), Some(&link));
        assert_eq!(notices.severities(), vec![Severity::Default]);

        let (_, text) = ChatLink::parse(link.as_str()).unwrap();
        assert!(text.contains("- Widget (quantity: 2) - price: 100"));
        assert!(!text.contains("Phone (2)"));
        assert!(!text.contains("Village"));
        assert!(text.ends_with("💰 *Total:* 100"));

        let delay = flow.activate(&settings).unwrap();
        assert_eq!(delay, DEFAULT_CART_RESET_DELAY);
        assert!(matches!(flow.phase(), Phase::Submitting(_)));
        // Still shown until the reset runs.
        assert!(!cart.is_empty());

        assert!(flow.complete(&mut CartOrder::new(&mut cart)));
        assert!(cart.is_empty());
        assert_eq!(flow.phase(), &Phase::Editing);
        assert_eq!(flow.form(), &CustomerForm::default());
        assert_eq!(flow.link(), None);
    }

    #[test]
    fn test_empty_cart_is_gated_without_notice() {
        let notices = Recorder::default();
        let mut cart = MemoryCart::new();
        let mut flow = CheckoutFlow::new(OrderKind::MultiItem);

        assert!(!flow.can_prepare(&CartOrder::new(&mut cart)));
        let err = flow
            .prepare(&english(), valid_form(), &CartOrder::new(&mut cart), &notices)
            .unwrap_err();
        assert_eq!(err, CheckoutError::EmptyOrder);
        assert_eq!(flow.phase(), &Phase::Editing);
        assert!(notices.0.borrow().is_empty());
    }

    #[test]
    fn test_cart_flow_invalid_form_notifies_and_stays_editing() {
        let notices = Recorder::default();
        let mut cart = widget_cart();
        let mut flow = CheckoutFlow::new(OrderKind::MultiItem);
        let mut form = valid_form();
        form.phone1 = "0101".to_string();

        let err = flow
            .prepare(&english(), form.clone(), &CartOrder::new(&mut cart), &notices)
            .unwrap_err();
        let CheckoutError::Invalid(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors.contains(Field::Phone1));
        assert_eq!(flow.phase(), &Phase::Editing);
        assert_eq!(flow.form(), &form);
        assert_eq!(flow.link(), None);
        assert_eq!(notices.severities(), vec![Severity::Destructive]);
    }

    #[test]
    fn test_quick_flow_opens_now_and_resets() {
        let settings = english();
        let notices = Recorder::default();
        let product = gadget();
        let mut flow = CheckoutFlow::new(OrderKind::SingleItem);

        let handoff = flow
            .prepare(&settings, valid_form(), &ProductOrder::new(&product), &notices)
            .unwrap();
        let Handoff::OpenNow { link, reset_after } = handoff else {
            panic!("quick flow should open immediately");
        };
        assert_eq!(reset_after, DEFAULT_QUICK_RESET_DELAY);
        assert!(matches!(flow.phase(), Phase::Submitting(_)));

        let (_, text) = ChatLink::parse(link.as_str()).unwrap();
        assert!(text.contains("- Gadget (quantity: 1) - price: 75"));

        // A second submit while submitting is refused.
        assert!(matches!(
            flow.prepare(&settings, valid_form(), &ProductOrder::new(&product), &notices),
            Err(CheckoutError::NotEditing("submitting"))
        ));

        assert!(flow.complete(&mut ProductOrder::new(&product)));
        assert_eq!(flow.phase(), &Phase::Editing);
        assert_eq!(flow.form(), &CustomerForm::default());
    }

    #[test]
    fn test_quick_flow_invalid_form_has_no_summary_notice() {
        let notices = Recorder::default();
        let product = gadget();
        let mut flow = CheckoutFlow::new(OrderKind::SingleItem);

        let err = flow
            .prepare(
                &english(),
                CustomerForm::default(),
                &ProductOrder::new(&product),
                &notices,
            )
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Invalid(_)));
        assert!(notices.0.borrow().is_empty());
        assert!(flow.is_editing());
    }

    #[test]
    fn test_activate_requires_prepared() {
        let mut flow = CheckoutFlow::new(OrderKind::MultiItem);
        assert_eq!(
            flow.activate(&english()),
            Err(CheckoutError::NotPrepared("editing"))
        );
        assert!(flow.is_editing());
    }

    #[test]
    fn test_complete_outside_submitting_is_noop() {
        let mut cart = widget_cart();
        let mut flow = CheckoutFlow::new(OrderKind::MultiItem);
        assert!(!flow.complete(&mut CartOrder::new(&mut cart)));
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_closure_notifier() {
        let seen = RefCell::new(Vec::new());
        let notifier = |notice: Notice| seen.borrow_mut().push(notice.title);
        let mut cart = widget_cart();
        let mut flow = CheckoutFlow::new(OrderKind::MultiItem);
        flow.prepare(&english(), valid_form(), &CartOrder::new(&mut cart), &notifier)
            .unwrap();
        assert_eq!(seen.into_inner(), vec!["Your order is ready!".to_string()]);
    }
}
