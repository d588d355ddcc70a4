//! Order message text.
//!
//! The message is what the shopper sends to the store over WhatsApp:
//!
//! ```text
//! <header naming the store and order type>
//! -----------------------------------
//! 👤 *Name:* ...
//! 📱 *Phone (1):* ...
//! 📱 *Phone (2):* ...            (only when given)
//! 📍 *Address:*
//! - Governorate: ...
//! - City: ...
//! - Village: ...                 (only when given)
//! - Street: ...
//! -----------------------------------
//! 🛒 *Items:*
//! - <name> (quantity: <qty>) - price: <line total>
//! -----------------------------------
//! 💰 *Total:* <total>
//! ```
//!
//! Labels, digits and the currency suffix come from the [`Locale`]. The
//! output has no leading whitespace on any line, no blank lines, and no
//! surrounding whitespace. It depends only on its inputs.

use core::fmt;

use crate::checkout::CheckoutSettings;
use crate::types::{CustomerInfo, LineItem, Locale, OrderKind, OrderSource};

const DIVIDER: &str = "-----------------------------------";

/// A formatted order message, ready to be put in a chat link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMessage(String);

impl OrderMessage {
    /// Build the message for `customer` ordering from `source`.
    #[must_use]
    pub fn build(
        settings: &CheckoutSettings,
        customer: &CustomerInfo,
        source: &impl OrderSource,
    ) -> Self {
        let locale = settings.locale;
        let text = locale.message_text();
        let kind = source.kind();

        let (header, heading) = match kind {
            OrderKind::MultiItem => (text.multi_item_header, text.multi_item_heading),
            OrderKind::SingleItem => (text.single_item_header, text.single_item_heading),
        };

        let mut lines: Vec<String> = Vec::with_capacity(16);
        lines.push(header.replace("{store}", &settings.store_name));
        lines.push(DIVIDER.to_owned());
        lines.push(format!("{} {}", text.name, customer.name()));
        lines.push(format!("{} {}", text.phone1, customer.phone1()));
        if let Some(phone2) = customer.phone2() {
            lines.push(format!("{} {phone2}", text.phone2));
        }
        lines.push(text.address.to_owned());
        lines.push(format!("{} {}", text.governorate, customer.governorate()));
        lines.push(format!("{} {}", text.city, customer.city()));
        if let Some(village) = customer.village() {
            lines.push(format!("{} {village}", text.village));
        }
        lines.push(format!("{} {}", text.street, customer.street()));
        lines.push(DIVIDER.to_owned());
        lines.push(heading.to_owned());
        lines.extend(source.items().iter().map(|item| item_line(locale, item)));
        lines.push(DIVIDER.to_owned());
        lines.push(format!(
            "{} {}",
            text.total,
            locale.format_price(source.total().amount())
        ));

        Self(normalize(&lines.join("\n")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `- <name> (quantity: <qty>) - price: <line total>`
///
/// The quantity is written as a plain integer in every locale; only amounts
/// are localized.
fn item_line(locale: Locale, item: &LineItem) -> String {
    let text = locale.message_text();
    format!(
        "- {} ({} {}) - {} {}",
        item.name,
        text.quantity,
        item.quantity,
        text.price,
        locale.format_price(item.line_total().amount()),
    )
}

/// Strip leading whitespace from every line, drop the lines that end up
/// empty, and trim the whole text.
fn normalize(raw: &str) -> String {
    raw.trim()
        .lines()
        .map(str::trim_start)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}
