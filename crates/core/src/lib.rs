//! Matgar Core - checkout logic shared by the storefront and the CLI.
//!
//! Everything an order hand-off needs, from the customer form to the
//! WhatsApp link that carries the order message:
//!
//! - [`types`] - prices, locales, customer details, carts and products
//! - [`message`] - the order message text
//! - [`deep_link`] - `wa.me` links, built and parsed
//! - [`checkout`] - the checkout state machine and its notices
//!
//! # Architecture
//!
//! No I/O and no clocks. The checkout machine reports how long to wait
//! before a reset; the caller owns the timer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod deep_link;
pub mod message;
pub mod types;

pub use checkout::{
    CheckoutError, CheckoutFlow, CheckoutSettings, DEFAULT_CART_RESET_DELAY,
    DEFAULT_QUICK_RESET_DELAY, DEFAULT_STORE_NAME, Handoff, Notice, Notifier, Phase, Severity,
};
pub use deep_link::{ChatLink, DEFAULT_RECIPIENT, LinkError, RecipientError, RecipientId};
pub use message::OrderMessage;
pub use types::*;
