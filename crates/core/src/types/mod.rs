//! Domain types for the storefront checkout.
//!
//! Prices, locales, customer details and the things an order is built from.

pub mod customer;
pub mod locale;
pub mod order;
pub mod price;

pub use customer::{CustomerForm, CustomerInfo, Field, FieldError, ValidationErrors};
pub use locale::{Locale, LocaleError, MessageText, UiText};
pub use order::{
    Cart, CartOrder, LineItem, MAX_QUANTITY, MemoryCart, OrderKind, OrderSource, Product,
    ProductOrder,
};
pub use price::{Price, PriceError};
