//! Domain models for storefront.

pub mod session;

pub use session::{ShopperId, keys as session_keys};
