//! Per-shopper checkout state.
//!
//! Each browser session maps to a [`Shopper`]: a cart, the cart checkout
//! flow, and one quick checkout flow per product. Shoppers live in a `moka`
//! cache and expire after the configured idle time.
//!
//! Delayed resets are tokio tasks holding a `Weak` reference to the shopper.
//! Their [`ScheduledReset`] handles are owned by the shopper, so replacing a
//! reset, or the shopper being evicted, cancels the pending callback.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use matgar_core::{
    CartOrder, CheckoutError, CheckoutFlow, CheckoutSettings, CustomerForm, Handoff,
    MemoryCart, Notifier, OrderKind, Product, ProductOrder,
};
use moka::future::Cache;
use tokio::sync::Mutex;
use tower_sessions::Session;
use tracing::{debug, info, instrument};

use crate::models::{ShopperId, session_keys};
use crate::services::reset::ScheduledReset;

const MAX_SHOPPERS: u64 = 100_000;

/// A shopper shared between handlers and reset tasks.
pub type SharedShopper = Arc<Mutex<Shopper>>;

/// Which flow a reset belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum FlowKey {
    Cart,
    Product(String),
}

/// One shopper's cart and checkout forms.
#[derive(Debug)]
pub struct Shopper {
    cart: MemoryCart,
    cart_flow: CheckoutFlow,
    quick_flows: HashMap<String, CheckoutFlow>,
    pending: HashMap<FlowKey, ScheduledReset>,
}

impl Default for Shopper {
    fn default() -> Self {
        Self {
            cart: MemoryCart::new(),
            cart_flow: CheckoutFlow::new(OrderKind::MultiItem),
            quick_flows: HashMap::new(),
            pending: HashMap::new(),
        }
    }
}

impl Shopper {
    #[must_use]
    pub const fn cart(&self) -> &MemoryCart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut MemoryCart {
        &mut self.cart
    }

    #[must_use]
    pub const fn cart_flow(&self) -> &CheckoutFlow {
        &self.cart_flow
    }

    /// The quick checkout flow for a product, or a fresh one.
    #[must_use]
    pub fn quick_flow(&self, handle: &str) -> CheckoutFlow {
        self.quick_flows
            .get(handle)
            .cloned()
            .unwrap_or_else(|| CheckoutFlow::new(OrderKind::SingleItem))
    }

    /// Whether the cart checkout can be prepared right now.
    pub fn can_prepare_cart(&mut self) -> bool {
        self.cart_flow.can_prepare(&CartOrder::new(&mut self.cart))
    }

    /// Prepare the cart order.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::prepare`].
    pub fn prepare_cart(
        &mut self,
        settings: &CheckoutSettings,
        form: CustomerForm,
        notifier: &impl Notifier,
    ) -> Result<Handoff, CheckoutError> {
        self.cart_flow
            .prepare(settings, form, &CartOrder::new(&mut self.cart), notifier)
    }

    /// Submit the quick order for `product`.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::prepare`].
    pub fn prepare_quick(
        &mut self,
        settings: &CheckoutSettings,
        product: &Product,
        form: CustomerForm,
        notifier: &impl Notifier,
    ) -> Result<Handoff, CheckoutError> {
        self.quick_flows
            .entry(product.handle.clone())
            .or_insert_with(|| CheckoutFlow::new(OrderKind::SingleItem))
            .prepare(settings, form, &ProductOrder::new(product), notifier)
    }

    /// The shopper opened the prepared cart link.
    ///
    /// # Errors
    ///
    /// See [`CheckoutFlow::activate`].
    pub fn activate_cart(
        &mut self,
        settings: &CheckoutSettings,
    ) -> Result<Duration, CheckoutError> {
        self.cart_flow.activate(settings)
    }

    /// Run the cart reset: clear the cart and the form.
    pub fn complete_cart(&mut self) -> bool {
        self.cart_flow.complete(&mut CartOrder::new(&mut self.cart))
    }

    /// Run the quick reset for `product`.
    pub fn complete_quick(&mut self, product: &Product) -> bool {
        self.quick_flows
            .get_mut(&product.handle)
            .is_some_and(|flow| flow.complete(&mut ProductOrder::new(product)))
    }

    /// Number of resets waiting to run.
    #[must_use]
    pub fn pending_resets(&self) -> usize {
        self.pending.len()
    }
}

/// Schedule the cart reset after `delay`.
pub fn schedule_cart_reset(shopper: &SharedShopper, state: &mut Shopper, delay: Duration) {
    let weak = Arc::downgrade(shopper);
    let task = ScheduledReset::spawn(delay, async move {
        run_reset(weak, &FlowKey::Cart, Shopper::complete_cart).await;
    });
    replace_pending(state, FlowKey::Cart, task);
}

/// Schedule the quick form reset for `product` after `delay`.
pub fn schedule_quick_reset(
    shopper: &SharedShopper,
    state: &mut Shopper,
    product: Product,
    delay: Duration,
) {
    let key = FlowKey::Product(product.handle.clone());
    let weak = Arc::downgrade(shopper);
    let task_key = key.clone();
    let task = ScheduledReset::spawn(delay, async move {
        run_reset(weak, &task_key, |shopper| shopper.complete_quick(&product)).await;
    });
    replace_pending(state, key, task);
}

fn replace_pending(state: &mut Shopper, key: FlowKey, task: ScheduledReset) {
    if state.pending.insert(key.clone(), task).is_some() {
        debug!(?key, "Replaced pending reset");
    }
}

async fn run_reset(
    weak: Weak<Mutex<Shopper>>,
    key: &FlowKey,
    complete: impl FnOnce(&mut Shopper) -> bool,
) {
    let Some(shopper) = weak.upgrade() else {
        return;
    };
    let mut state = shopper.lock().await;
    let completed = complete(&mut state);
    info!(?key, completed, "Checkout reset");
    if let Some(reset) = state.pending.remove(key) {
        reset.disarm();
    }
}

/// All shoppers, keyed by the id in their session.
#[derive(Clone)]
pub struct ShopperStore {
    shoppers: Cache<ShopperId, SharedShopper>,
}

impl ShopperStore {
    /// Create a store whose shoppers expire after `idle` without access.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        let shoppers = Cache::builder()
            .max_capacity(MAX_SHOPPERS)
            .time_to_idle(idle)
            .build();
        Self { shoppers }
    }

    /// Get or create the shopper for `id`.
    pub async fn get(&self, id: ShopperId) -> SharedShopper {
        self.shoppers
            .get_with(id, async { Arc::new(Mutex::new(Shopper::default())) })
            .await
    }

    /// Get or create the shopper for the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    #[instrument(skip_all)]
    pub async fn for_session(
        &self,
        session: &Session,
    ) -> Result<SharedShopper, tower_sessions::session::Error> {
        let id = if let Some(id) = session.get::<ShopperId>(session_keys::SHOPPER_ID).await? {
            id
        } else {
            let id = ShopperId::generate();
            session.insert(session_keys::SHOPPER_ID, id).await?;
            debug!(shopper_id = %id, "New shopper");
            id
        };
        Ok(self.get(id).await)
    }

    /// The shopper for the current session, if it already has one.
    ///
    /// Never writes to the session, so read-only pages served to cookieless
    /// clients leave no session behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    #[instrument(skip_all)]
    pub async fn peek(
        &self,
        session: &Session,
    ) -> Result<Option<SharedShopper>, tower_sessions::session::Error> {
        let Some(id) = session.get::<ShopperId>(session_keys::SHOPPER_ID).await? else {
            return Ok(None);
        };
        Ok(self.shoppers.get(&id).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use matgar_core::{Cart, LineItem, Locale, Notice, Phase, Price};

    use super::*;

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            locale: Locale::En,
            cart_reset_delay: Duration::from_millis(20),
            quick_reset_delay: Duration::from_millis(20),
            ..CheckoutSettings::default()
        }
    }

    fn form() -> CustomerForm {
        CustomerForm {
            name: "Ahmed Ali".to_string(),
            phone1: "01012345678".to_string(),
            governorate: "Cairo".to_string(),
            city: "Nasr City".to_string(),
            street: "Abbas El Akkad St.".to_string(),
            ..CustomerForm::default()
        }
    }

    fn gadget() -> Product {
        Product {
            handle: "gadget".to_string(),
            name: "Gadget".to_string(),
            price: Price::from_whole(75),
            description: String::new(),
        }
    }

    fn ignore(_: Notice) {}

    async fn prepared_cart(store: &ShopperStore, id: ShopperId) -> SharedShopper {
        let shopper = store.get(id).await;
        {
            let mut state = shopper.lock().await;
            state
                .cart_mut()
                .add(LineItem::new("Widget", NonZeroU32::new(2).unwrap(), Price::from_whole(50)));
            state.prepare_cart(&settings(), form(), &ignore).unwrap();
        }
        shopper
    }

    #[tokio::test]
    async fn test_same_id_same_shopper() {
        let store = ShopperStore::new(Duration::from_secs(60));
        let id = ShopperId::generate();
        let a = store.get(id).await;
        let b = store.get(id).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &store.get(ShopperId::generate()).await));
    }

    #[tokio::test]
    async fn test_cart_reset_runs_after_delay() {
        let store = ShopperStore::new(Duration::from_secs(60));
        let shopper = prepared_cart(&store, ShopperId::generate()).await;

        {
            let mut state = shopper.lock().await;
            let delay = state.activate_cart(&settings()).unwrap();
            schedule_cart_reset(&shopper, &mut state, delay);
            assert!(matches!(state.cart_flow().phase(), Phase::Submitting(_)));
            assert_eq!(state.pending_resets(), 1);
        }

        tokio::time::sleep(Duration::from_millis(150)).await;

        let state = shopper.lock().await;
        assert!(state.cart().is_empty());
        assert_eq!(state.cart_flow().phase(), &Phase::Editing);
        assert_eq!(state.cart_flow().form(), &CustomerForm::default());
        assert_eq!(state.pending_resets(), 0);
    }

    #[tokio::test]
    async fn test_quick_reset_only_touches_its_product() {
        let store = ShopperStore::new(Duration::from_secs(60));
        let shopper = store.get(ShopperId::generate()).await;
        let product = gadget();

        {
            let mut state = shopper.lock().await;
            state
                .cart_mut()
                .add(LineItem::new("Widget", NonZeroU32::MIN, Price::from_whole(50)));
            let handoff = state
                .prepare_quick(&settings(), &product, form(), &ignore)
                .unwrap();
            let Handoff::OpenNow { reset_after, .. } = handoff else {
                panic!("quick checkout opens immediately");
            };
            schedule_quick_reset(&shopper, &mut state, product.clone(), reset_after);
            assert!(!state.quick_flow("gadget").is_editing());
            assert!(state.quick_flow("other").is_editing());
        }

        tokio::time::sleep(Duration::from_millis(150)).await;

        let state = shopper.lock().await;
        assert!(state.quick_flow("gadget").is_editing());
        assert_eq!(state.quick_flow("gadget").form(), &CustomerForm::default());
        assert!(!state.cart().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_shopper_cancels_reset() {
        let shopper: SharedShopper = Arc::new(Mutex::new(Shopper::default()));
        let weak = Arc::downgrade(&shopper);

        {
            let mut state = shopper.lock().await;
            state
                .cart_mut()
                .add(LineItem::new("Widget", NonZeroU32::MIN, Price::from_whole(50)));
            state.prepare_cart(&settings(), form(), &ignore).unwrap();
            let delay = state.activate_cart(&settings()).unwrap();
            schedule_cart_reset(&shopper, &mut state, delay);
        }
        drop(shopper);

        assert!(weak.upgrade().is_none());
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    #[test]
    fn test_can_prepare_cart_follows_flow() {
        let mut state = Shopper::default();
        assert!(!state.can_prepare_cart());

        state
            .cart_mut()
            .add(LineItem::new("Widget", NonZeroU32::MIN, Price::from_whole(50)));
        assert!(state.can_prepare_cart());

        state.prepare_cart(&settings(), form(), &ignore).unwrap();
        assert!(!state.can_prepare_cart());
    }
}
