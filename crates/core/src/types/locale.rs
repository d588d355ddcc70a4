//! Display locale for the checkout.
//!
//! Every piece of customer-facing text lives here, keyed by [`Locale`]:
//! validation messages, order-message labels, notices and form copy.
//! Amounts are rendered the way a browser's `toLocaleString` renders them
//! for the same locale.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Maximum fraction digits kept when formatting an amount.
const MAX_FRACTION_DIGITS: u32 = 3;

/// Errors that can occur when parsing a [`Locale`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    /// The tag does not name a supported locale.
    #[error("unsupported locale: {0}")]
    Unsupported(String),
}

/// Supported display locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Arabic (Egypt). Arabic-Indic digits, right-to-left.
    #[default]
    #[serde(rename = "ar-EG")]
    ArEg,
    /// English.
    #[serde(rename = "en")]
    En,
}

impl Locale {
    /// BCP 47 language tag, for the `lang` attribute.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::ArEg => "ar-EG",
            Self::En => "en",
        }
    }

    /// Text direction, for the `dir` attribute.
    #[must_use]
    pub const fn direction(self) -> &'static str {
        match self {
            Self::ArEg => "rtl",
            Self::En => "ltr",
        }
    }

    /// Format an amount as a grouped decimal number.
    ///
    /// ```
    /// use matgar_core::Locale;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Locale::En.format_amount(Decimal::new(150_000, 2)), "1,500");
    /// assert_eq!(Locale::ArEg.format_amount(Decimal::new(1500, 0)), "١٬٥٠٠");
    /// assert_eq!(Locale::En.format_amount(Decimal::new(12_3456, 4)), "12.346");
    /// ```
    #[must_use]
    pub fn format_amount(self, amount: Decimal) -> String {
        let rounded = amount
            .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        let plain = rounded.abs().to_string();
        let (int_part, frac_part) = plain
            .split_once('.')
            .map_or((plain.as_str(), None), |(i, f)| (i, Some(f)));

        let mut out = String::with_capacity(plain.len() + plain.len() / 3 + 1);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }

        let digits = int_part.len();
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (digits - i) % 3 == 0 {
                out.push(self.group_separator());
            }
            out.push(self.digit(c));
        }

        if let Some(frac) = frac_part {
            out.push(self.decimal_separator());
            out.extend(frac.chars().map(|c| self.digit(c)));
        }

        out
    }

    const fn group_separator(self) -> char {
        match self {
            Self::ArEg => '\u{066C}',
            Self::En => ',',
        }
    }

    const fn decimal_separator(self) -> char {
        match self {
            Self::ArEg => '\u{066B}',
            Self::En => '.',
        }
    }

    fn digit(self, c: char) -> char {
        match (self, c.to_digit(10)) {
            (Self::ArEg, Some(d)) => char::from_u32(0x0660 + d).unwrap_or(c),
            _ => c,
        }
    }

    /// Currency suffix appended to amounts in the order message.
    #[must_use]
    pub const fn currency_suffix(self) -> Option<&'static str> {
        match self {
            Self::ArEg => Some("جنيه"),
            Self::En => None,
        }
    }

    /// Format an amount followed by the currency suffix, if any.
    #[must_use]
    pub fn format_price(self, amount: Decimal) -> String {
        let formatted = self.format_amount(amount);
        match self.currency_suffix() {
            Some(suffix) => format!("{formatted} {suffix}"),
            None => formatted,
        }
    }

    /// Copy used by the order message.
    #[must_use]
    pub const fn message_text(self) -> &'static MessageText {
        match self {
            Self::ArEg => &AR_EG_MESSAGE,
            Self::En => &EN_MESSAGE,
        }
    }

    /// Copy used by notices and form chrome.
    #[must_use]
    pub const fn ui_text(self) -> &'static UiText {
        match self {
            Self::ArEg => &AR_EG_UI,
            Self::En => &EN_UI,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "ar" | "ar-eg" => Ok(Self::ArEg),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            _ => Err(LocaleError::Unsupported(s.to_string())),
        }
    }
}

/// Labels for the order message template.
///
/// `{store}` in the headers is replaced with the store name.
#[derive(Debug)]
pub struct MessageText {
    pub multi_item_header: &'static str,
    pub single_item_header: &'static str,
    pub name: &'static str,
    pub phone1: &'static str,
    pub phone2: &'static str,
    pub address: &'static str,
    pub governorate: &'static str,
    pub city: &'static str,
    pub village: &'static str,
    pub street: &'static str,
    pub multi_item_heading: &'static str,
    pub single_item_heading: &'static str,
    pub quantity: &'static str,
    pub price: &'static str,
    pub total: &'static str,
}

/// Notices, validation messages and form chrome.
#[derive(Debug)]
pub struct UiText {
    pub invalid_title: &'static str,
    pub invalid_description: &'static str,
    pub prepared_title: &'static str,
    pub prepared_description: &'static str,
    pub redirect_description: &'static str,
    pub prepare_button: &'static str,
    pub send_button: &'static str,
    pub quick_send_button: &'static str,
    pub empty_cart: &'static str,
    pub optional_suffix: &'static str,
    pub name_too_short: &'static str,
    pub phone1_invalid: &'static str,
    pub governorate_missing: &'static str,
    pub city_missing: &'static str,
    pub street_missing: &'static str,
    pub products_title: &'static str,
    pub add_to_cart: &'static str,
    pub cart_title: &'static str,
    pub checkout_title: &'static str,
    pub go_to_checkout: &'static str,
    pub order_summary: &'static str,
    pub customer_details: &'static str,
    pub quick_order_title: &'static str,
    pub quantity_label: &'static str,
    pub total_label: &'static str,
    pub update_button: &'static str,
    pub remove_button: &'static str,
    pub submitting: &'static str,
}

const AR_EG_MESSAGE: MessageText = MessageText {
    multi_item_header: "طلب جديد من متجر {store} 🛍️",
    single_item_header: "طلب سريع لمنتج واحد من متجر {store} 🛍️",
    name: "👤 *الاسم:*",
    phone1: "📱 *رقم الهاتف (1):*",
    phone2: "📱 *رقم الهاتف (2):*",
    address: "📍 *العنوان:*",
    governorate: "- المحافظة:",
    city: "- المدينة:",
    village: "- القرية:",
    street: "- الشارع:",
    multi_item_heading: "🛒 *الطلبات:*",
    single_item_heading: "🛒 *المنتج المطلوب:*",
    quantity: "الكمية:",
    price: "السعر:",
    total: "💰 *المبلغ الإجمالي:*",
};

const EN_MESSAGE: MessageText = MessageText {
    multi_item_header: "New order from the {store} store 🛍️",
    single_item_header: "Quick single-product order from the {store} store 🛍️",
    name: "👤 *Name:*",
    phone1: "📱 *Phone (1):*",
    phone2: "📱 *Phone (2):*",
    address: "📍 *Address:*",
    governorate: "- Governorate:",
    city: "- City:",
    village: "- Village:",
    street: "- Street:",
    multi_item_heading: "🛒 *Items:*",
    single_item_heading: "🛒 *Requested product:*",
    quantity: "quantity:",
    price: "price:",
    total: "💰 *Total:*",
};

const AR_EG_UI: UiText = UiText {
    invalid_title: "خطأ في البيانات",
    invalid_description: "يرجى مراجعة الحقول المطلوبة والتأكد من إدخالها بشكل صحيح.",
    prepared_title: "تم تجهيز طلبك!",
    prepared_description: "الآن اضغط على زر 'إرسال عبر واتساب' لإتمام العملية.",
    redirect_description: "سيتم الآن توجيهك إلى واتساب لإرسال الطلب. فقط اضغط على زر الإرسال.",
    prepare_button: "تجهيز الطلب",
    send_button: "إرسال عبر واتساب",
    quick_send_button: "إرسال الطلب عبر واتساب",
    empty_cart: "سلة التسوق فارغة.",
    optional_suffix: "(اختياري)",
    name_too_short: "الاسم يجب أن يكون 3 أحرف على الأقل",
    phone1_invalid: "رقم الهاتف الأول غير صالح",
    governorate_missing: "يرجى إدخال اسم المحافظة",
    city_missing: "يرجى إدخال اسم المدينة",
    street_missing: "يرجى إدخال اسم الشارع",
    products_title: "المنتجات",
    add_to_cart: "أضف إلى السلة",
    cart_title: "سلة التسوق",
    checkout_title: "إتمام الطلب",
    go_to_checkout: "متابعة الطلب",
    order_summary: "ملخص الطلب",
    customer_details: "بيانات التوصيل",
    quick_order_title: "اطلب الآن",
    quantity_label: "الكمية",
    total_label: "الإجمالي",
    update_button: "تحديث",
    remove_button: "حذف",
    submitting: "جاري الإرسال...",
};

const EN_UI: UiText = UiText {
    invalid_title: "Invalid details",
    invalid_description: "Please review the required fields and make sure they are filled in correctly.",
    prepared_title: "Your order is ready!",
    prepared_description: "Now press the 'Send via WhatsApp' button to complete your order.",
    redirect_description: "You will now be taken to WhatsApp to send the order. Just press send.",
    prepare_button: "Prepare order",
    send_button: "Send via WhatsApp",
    quick_send_button: "Send order via WhatsApp",
    empty_cart: "Your cart is empty.",
    optional_suffix: "(optional)",
    name_too_short: "Name must be at least 3 characters",
    phone1_invalid: "The primary phone number is invalid",
    governorate_missing: "Please enter the governorate",
    city_missing: "Please enter the city",
    street_missing: "Please enter the street",
    products_title: "Products",
    add_to_cart: "Add to cart",
    cart_title: "Shopping cart",
    checkout_title: "Checkout",
    go_to_checkout: "Continue to checkout",
    order_summary: "Order summary",
    customer_details: "Delivery details",
    quick_order_title: "Order now",
    quantity_label: "Quantity",
    total_label: "Total",
    update_button: "Update",
    remove_button: "Remove",
    submitting: "Sending...",
};
