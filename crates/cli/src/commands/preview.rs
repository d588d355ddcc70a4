//! Preview the order message and link for a customer.
//!
//! Reads the customer form and the order from JSON files, validates the
//! customer the way the storefront does, and prints the message followed by
//! the `wa.me` link.

use std::io::Write;
use std::path::{Path, PathBuf};

use matgar_core::{
    CartOrder, ChatLink, CheckoutSettings, CustomerForm, LineItem, Locale, MemoryCart,
    OrderMessage, OrderSource, Product, ProductOrder, RecipientId,
};
use serde::de::DeserializeOwned;
use tracing::info;

use super::CliError;

/// Where the order lines come from.
pub enum Order {
    /// JSON array of line items.
    Cart(PathBuf),
    /// JSON object describing one product.
    Product(PathBuf),
}

/// Checkout settings for the given overrides.
#[must_use]
pub fn settings(
    locale: Locale,
    recipient: Option<RecipientId>,
    store_name: String,
) -> CheckoutSettings {
    CheckoutSettings {
        recipient: recipient.unwrap_or_default(),
        store_name,
        locale,
        ..CheckoutSettings::default()
    }
}

/// Print the message and link for `customer` ordering `order`.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, the customer is
/// invalid, or the order is empty.
pub fn run(settings: &CheckoutSettings, customer: &Path, order: &Order) -> Result<(), CliError> {
    let form: CustomerForm = read_json(customer)?;

    let (message, link) = match order {
        Order::Cart(path) => {
            let lines: Vec<LineItem> = read_json(path)?;
            let mut cart: MemoryCart = lines.into_iter().collect();
            render(settings, &form, &CartOrder::new(&mut cart))?
        }
        Order::Product(path) => {
            let product: Product = read_json(path)?;
            render(settings, &form, &ProductOrder::new(&product))?
        }
    };

    info!(recipient = %settings.recipient, locale = %settings.locale, "Order preview");

    let mut out = std::io::stdout().lock();
    writeln!(out, "{message}")?;
    writeln!(out)?;
    writeln!(out, "{link}")?;
    Ok(())
}

/// Validate `form` and build the message and link for `source`.
///
/// # Errors
///
/// Returns [`CliError::EmptyOrder`] for an empty source and
/// [`CliError::Invalid`] when the customer fails validation.
pub fn render(
    settings: &CheckoutSettings,
    form: &CustomerForm,
    source: &impl OrderSource,
) -> Result<(OrderMessage, ChatLink), CliError> {
    if source.is_empty() {
        return Err(CliError::EmptyOrder);
    }
    let customer = form.validate(settings.locale).map_err(CliError::Invalid)?;
    let message = OrderMessage::build(settings, &customer, source);
    let link = ChatLink::for_message(&settings.recipient, &message);
    Ok((message, link))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}
