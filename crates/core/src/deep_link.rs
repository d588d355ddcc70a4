//! WhatsApp deep links.
//!
//! A link has the form `https://wa.me/<recipient>?text=<percent-encoded text>`.
//! The text is encoded like `encodeURIComponent`: every byte outside
//! `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is percent-encoded, so line breaks, emoji
//! and Arabic text survive the trip and decoding the `text` parameter gives
//! back the exact message.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::message::OrderMessage;

/// Base of every chat link.
pub const CHAT_BASE_URL: &str = "https://wa.me/";

/// The store's WhatsApp number.
pub const DEFAULT_RECIPIENT: &str = "201557219572";

const TEXT_PARAM: &str = "text";

/// Marks `encodeURIComponent` leaves as they are but `urlencoding` escapes.
const KEPT_MARKS: &[char] = &['!', '\'', '(', ')', '*'];

/// Errors that can occur when parsing a [`RecipientId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipientError {
    #[error("recipient id cannot be empty")]
    Empty,
    #[error("recipient id must contain only digits (got {0:?})")]
    NotNumeric(String),
}

/// Errors that can occur when parsing a [`ChatLink`].
#[derive(thiserror::Error, Debug)]
pub enum LinkError {
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("not a wa.me link: {0}")]
    WrongHost(String),
    #[error("invalid recipient: {0}")]
    Recipient(#[from] RecipientError),
    #[error("link has no text parameter")]
    MissingText,
    #[error("text parameter is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// International phone number of the chat recipient, digits only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipientId(String);

impl RecipientId {
    /// Parse a recipient id.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is empty or contains anything but ASCII digits.
    pub fn parse(s: &str) -> Result<Self, RecipientError> {
        if s.is_empty() {
            return Err(RecipientError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RecipientError::NotNumeric(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecipientId {
    fn default() -> Self {
        Self(DEFAULT_RECIPIENT.to_owned())
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecipientId {
    type Err = RecipientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecipientId {
    type Error = RecipientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecipientId> for String {
    fn from(id: RecipientId) -> Self {
        id.0
    }
}

/// A chat deep link carrying an order message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChatLink(String);

impl ChatLink {
    /// Build the link that opens a chat with `recipient` pre-filled with `text`.
    #[must_use]
    pub fn new(recipient: &RecipientId, text: &str) -> Self {
        Self(format!(
            "{CHAT_BASE_URL}{recipient}?{TEXT_PARAM}={}",
            encode_component(text)
        ))
    }

    /// Build the link for an order message.
    #[must_use]
    pub fn for_message(recipient: &RecipientId, message: &OrderMessage) -> Self {
        Self::new(recipient, message.as_str())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a link back into its recipient and decoded text.
    ///
    /// # Errors
    ///
    /// Returns an error if `link` is not a `wa.me` URL with a numeric
    /// recipient and a `text` parameter.
    pub fn parse(link: &str) -> Result<(RecipientId, String), LinkError> {
        let url = Url::parse(link)?;
        if url.host_str() != Some("wa.me") {
            return Err(LinkError::WrongHost(url.host_str().unwrap_or("").to_owned()));
        }

        let recipient = RecipientId::parse(url.path().trim_start_matches('/'))?;

        // Decode the raw parameter rather than `query_pairs`, which would
        // read `+` as a space.
        let raw = url
            .query()
            .unwrap_or("")
            .split('&')
            .find_map(|pair| pair.strip_prefix("text="))
            .ok_or(LinkError::MissingText)?;
        let text = urlencoding::decode(raw)?.into_owned();

        Ok((recipient, text))
    }
}

/// Percent-encode `text` as a URI component.
fn encode_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    let mut rest = text;
    while let Some(at) = rest.find(KEPT_MARKS) {
        let (plain, tail) = rest.split_at(at);
        let (mark, after) = tail.split_at(1);
        out.push_str(&urlencoding::encode(plain));
        out.push_str(mark);
        rest = after;
    }
    out.push_str(&urlencoding::encode(rest));
    out
}

impl fmt::Display for ChatLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChatLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_parse() {
        assert!(RecipientId::parse("201557219572").is_ok());
        assert_eq!(RecipientId::parse(""), Err(RecipientError::Empty));
        assert!(matches!(
            RecipientId::parse("+20 155"),
            Err(RecipientError::NotNumeric(_))
        ));
    }

    #[test]
    fn test_link_shape() {
        let link = ChatLink::new(&RecipientId::default(), "a b\nc");
        assert_eq!(link.as_str(), "https://wa.me/201557219572?text=a%20b%0Ac");
    }

    #[test]
    fn test_round_trip_preserves_text() {
        let text = "طلب جديد 🛍️\n- Widget (quantity: 2) - price: 1,000\n50% off + tax & fees?=#";
        let link = ChatLink::new(&RecipientId::default(), text);
        let (recipient, decoded) = ChatLink::parse(link.as_str()).unwrap();
        assert_eq!(recipient, RecipientId::default());
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_encoding_keeps_uri_component_marks() {
        let link = ChatLink::new(&RecipientId::default(), "- Widget (quantity: 2)! *it's* ~ok~");
        assert_eq!(
            link.as_str(),
            "https://wa.me/201557219572?text=-%20Widget%20(quantity%3A%202)!%20*it's*%20~ok~"
        );
        let (_, decoded) = ChatLink::parse(link.as_str()).unwrap();
        assert_eq!(decoded, "- Widget (quantity: 2)! *it's* ~ok~");
    }

    #[test]
    fn test_encoded_text_has_no_reserved_characters() {
        let link = ChatLink::new(&RecipientId::default(), "a&b=c+d#e?f/g");
        let query = link.as_str().split_once('?').unwrap().1;
        let value = query.strip_prefix("text=").unwrap();
        assert!(!value.contains(['&', '=', '+', '#', '?', '/']));
    }

    #[test]
    fn test_parse_rejects_other_hosts() {
        assert!(matches!(
            ChatLink::parse("https://example.com/201557219572?text=hi"),
            Err(LinkError::WrongHost(_))
        ));
        assert!(matches!(
            ChatLink::parse("https://wa.me/201557219572"),
            Err(LinkError::MissingText)
        ));
        assert!(matches!(
            ChatLink::parse("https://wa.me/abc?text=hi"),
            Err(LinkError::Recipient(_))
        ));
    }
}
