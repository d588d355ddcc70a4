//! Client-side events delivered through the `HX-Trigger` response header.
//!
//! ```text
//! HX-Trigger: {"toast":{"notices":[{"title":..,"description":..,"severity":"default"}]},
//!              "open-link":{"url":"https://wa.me/..."},
//!              "cart-updated":{}}
//! ```
//!
//! `static/js/checkout.js` shows the toasts and opens the link.

use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt::Write as _;

use axum::http::HeaderValue;
use axum::response::{IntoResponseParts, ResponseParts};
use matgar_core::{ChatLink, Notice, Notifier};
use serde_json::{Map, Value, json};

/// Response header read by htmx.
pub const HX_TRIGGER: &str = "HX-Trigger";

/// Event that refreshes the cart badge.
pub const CART_UPDATED: &str = "cart-updated";
/// Event that shows notices.
pub const TOAST: &str = "toast";
/// Event that opens a chat link in a new browsing context.
pub const OPEN_LINK: &str = "open-link";

/// Collects the notices raised while handling one request.
#[derive(Debug, Default)]
pub struct NoticeBuffer(RefCell<Vec<Notice>>);

impl NoticeBuffer {
    #[must_use]
    pub fn into_notices(self) -> Vec<Notice> {
        self.0.into_inner()
    }
}

impl Notifier for NoticeBuffer {
    fn notify(&self, notice: Notice) {
        self.0.borrow_mut().push(notice);
    }
}

/// Events to fire on the client once the response is swapped in.
#[derive(Debug, Default)]
pub struct HxTrigger {
    events: Map<String, Value>,
}

impl HxTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `cart-updated`.
    #[must_use]
    pub fn cart_updated(mut self) -> Self {
        self.events.insert(CART_UPDATED.to_string(), json!({}));
        self
    }

    /// Show `notices`. Nothing is added when there are none.
    #[must_use]
    pub fn toasts(mut self, notices: Vec<Notice>) -> Self {
        if !notices.is_empty() {
            self.events
                .insert(TOAST.to_string(), json!({ "notices": notices }));
        }
        self
    }

    /// Open `link` in a new browsing context.
    #[must_use]
    pub fn open_link(mut self, link: &ChatLink) -> Self {
        self.events
            .insert(OPEN_LINK.to_string(), json!({ "url": link.as_str() }));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The header value, with every non-ASCII character escaped.
    ///
    /// Browsers read header bytes as Latin-1, so Arabic notice text has to
    /// travel as `\uXXXX` escapes inside the JSON.
    #[must_use]
    pub fn header_value(&self) -> Option<HeaderValue> {
        if self.is_empty() {
            return None;
        }
        let json = Value::Object(self.events.clone()).to_string();
        match HeaderValue::from_str(&escape_non_ascii(&json)) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Dropping unencodable HX-Trigger header: {e}");
                None
            }
        }
    }
}

impl IntoResponseParts for HxTrigger {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(value) = self.header_value() {
            res.headers_mut().insert(HX_TRIGGER, value);
        }
        Ok(res)
    }
}

/// Replace every non-ASCII character with JSON `\uXXXX` escapes (UTF-16).
fn escape_non_ascii(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{unit:04x}");
            }
        }
    }
    out
}
