//! Business logic services for storefront.
//!
//! # Services
//!
//! - `shopper` - Per-shopper carts and checkout flows, with delayed resets
//! - `reset` - Cancellable delayed callbacks
//! - `notices` - `HX-Trigger` events for toasts and opening chat links

pub mod notices;
pub mod reset;
pub mod shopper;

pub use notices::{HxTrigger, NoticeBuffer};
pub use reset::ScheduledReset;
pub use shopper::{SharedShopper, Shopper, ShopperStore, schedule_cart_reset, schedule_quick_reset};
