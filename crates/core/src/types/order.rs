//! What is being ordered: cart lines, single products, and the
//! [`OrderSource`] abstraction both checkout flows build messages from.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::price::Price;

/// The most units a cart line can hold. Larger quantities are clamped.
pub const MAX_QUANTITY: u32 = 999;

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Handle of the catalog product, empty for ad-hoc lines.
    #[serde(default)]
    pub handle: String,
    /// Product name as shown to the shopper.
    pub name: String,
    /// Number of units, always at least one.
    pub quantity: NonZeroU32,
    /// Price of a single unit.
    pub unit_price: Price,
}

impl LineItem {
    /// Create a line item that is not tied to a catalog product.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: NonZeroU32, unit_price: Price) -> Self {
        Self {
            handle: String::new(),
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Create a line of `quantity` units of `product`.
    #[must_use]
    pub fn of(product: &Product, quantity: NonZeroU32) -> Self {
        Self {
            handle: product.handle.clone(),
            name: product.name.clone(),
            quantity,
            unit_price: product.price,
        }
    }

    /// What identifies the line in a cart: the handle, or the name for
    /// ad-hoc lines.
    #[must_use]
    pub fn key(&self) -> &str {
        if self.handle.is_empty() {
            &self.name
        } else {
            &self.handle
        }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A product offered by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// URL-safe identifier.
    pub handle: String,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
}

/// Multi-item (cart) or single-item (quick) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Cart checkout: two steps, the shopper opens the link themselves.
    MultiItem,
    /// Quick checkout: one step, the link opens on submit.
    SingleItem,
}

impl OrderKind {
    /// Whether the shopper must activate the prepared link explicitly.
    #[must_use]
    pub const fn awaits_activation(self) -> bool {
        matches!(self, Self::MultiItem)
    }

    /// Whether a failed validation also raises a summary notice.
    ///
    /// The quick form only shows inline field errors.
    #[must_use]
    pub const fn shows_failure_notice(self) -> bool {
        matches!(self, Self::MultiItem)
    }
}

/// The cart collaborator: current lines, a precomputed total, and clear.
pub trait Cart {
    /// Current lines, in the order they were added.
    fn items(&self) -> &[LineItem];

    /// Total price of all lines.
    fn total(&self) -> Price;

    /// Remove every line.
    fn clear(&mut self);

    /// `true` if the cart has no lines.
    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// Anything an order message can be built from.
pub trait OrderSource {
    /// Which flow this source feeds.
    fn kind(&self) -> OrderKind;

    /// The lines to list in the message.
    fn items(&self) -> Vec<LineItem>;

    /// The amount shown on the total line.
    fn total(&self) -> Price;

    /// Called once the order has been handed off and the form is reset.
    fn after_send(&mut self) {}

    /// `true` if there is nothing to order.
    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// Multi-item adapter over a [`Cart`]. Clears the cart after sending.
#[derive(Debug)]
pub struct CartOrder<'a, C: Cart> {
    cart: &'a mut C,
}

impl<'a, C: Cart> CartOrder<'a, C> {
    pub const fn new(cart: &'a mut C) -> Self {
        Self { cart }
    }
}

impl<C: Cart> OrderSource for CartOrder<'_, C> {
    fn kind(&self) -> OrderKind {
        OrderKind::MultiItem
    }

    fn items(&self) -> Vec<LineItem> {
        self.cart.items().to_vec()
    }

    fn total(&self) -> Price {
        self.cart.total()
    }

    fn after_send(&mut self) {
        self.cart.clear();
    }

    fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }
}

/// Single-item adapter over a [`Product`], quantity fixed at one.
#[derive(Debug, Clone, Copy)]
pub struct ProductOrder<'a> {
    product: &'a Product,
}

impl<'a> ProductOrder<'a> {
    #[must_use]
    pub const fn new(product: &'a Product) -> Self {
        Self { product }
    }
}

impl OrderSource for ProductOrder<'_> {
    fn kind(&self) -> OrderKind {
        OrderKind::SingleItem
    }

    fn items(&self) -> Vec<LineItem> {
        vec![LineItem::of(self.product, NonZeroU32::MIN)]
    }

    fn total(&self) -> Price {
        self.product.price
    }

    fn is_empty(&self) -> bool {
        false
    }
}

/// A plain in-memory cart.
///
/// Keeps one line per [`LineItem::key`], so two products sharing a display
/// name stay separate. Adding an existing line increases its quantity, up to
/// [`MAX_QUANTITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryCart {
    items: Vec<LineItem>,
}

impl MemoryCart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add `line`, merging with an existing line of the same key. The
    /// merged line takes the newer name and unit price.
    pub fn add(&mut self, mut line: LineItem) {
        line.quantity = clamp(line.quantity);
        if let Some(existing) = self.items.iter_mut().find(|l| l.key() == line.key()) {
            existing.quantity = clamp(existing.quantity.saturating_add(line.quantity.get()));
            existing.name = line.name;
            existing.unit_price = line.unit_price;
        } else {
            self.items.push(line);
        }
    }

    /// Set the quantity of the line with `key`. Returns `false` if there is
    /// no such line.
    pub fn set_quantity(&mut self, key: &str, quantity: NonZeroU32) -> bool {
        self.items
            .iter_mut()
            .find(|line| line.key() == key)
            .map(|line| line.quantity = clamp(quantity))
            .is_some()
    }

    /// Remove the line with `key`. Returns `false` if there is no such line.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.key() != key);
        self.items.len() != before
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity.get()))
    }
}

impl Cart for MemoryCart {
    fn items(&self) -> &[LineItem] {
        &self.items
    }

    fn total(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

fn clamp(quantity: NonZeroU32) -> NonZeroU32 {
    NonZeroU32::new(quantity.get().min(MAX_QUANTITY)).unwrap_or(NonZeroU32::MIN)
}

impl FromIterator<LineItem> for MemoryCart {
    fn from_iter<T: IntoIterator<Item = LineItem>>(iter: T) -> Self {
        let mut cart = Self::new();
        for line in iter {
            cart.add(line);
        }
        cart
    }
}
