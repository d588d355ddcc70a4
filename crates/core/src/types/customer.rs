//! Customer details collected by both checkout forms.
//!
//! [`CustomerForm`] is whatever the shopper typed. [`CustomerInfo`] is the
//! same record after it passed [`CustomerForm::validate`], and is the only
//! input the order-message builder accepts.
//!
//! ## Rules
//!
//! | Field         | Required | Minimum length |
//! |---------------|----------|----------------|
//! | `name`        | yes      | 3              |
//! | `phone1`      | yes      | 10             |
//! | `phone2`      | no       | -              |
//! | `governorate` | yes      | 3              |
//! | `city`        | yes      | 3              |
//! | `village`     | no       | -              |
//! | `street`      | yes      | 5              |
//!
//! Lengths count UTF-16 code units, the way browser form checks count them:
//! Arabic and Latin letters count one each, emoji outside the BMP count two. Values are taken as typed; an optional field is absent
//! only when it is the empty string.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::locale::Locale;

/// The seven fields of the customer form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Phone1,
    Phone2,
    Governorate,
    City,
    Village,
    Street,
}

impl Field {
    /// All fields in display order.
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Phone1,
        Self::Phone2,
        Self::Governorate,
        Self::City,
        Self::Village,
        Self::Street,
    ];

    /// The form key used in request bodies and element ids.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone1 => "phone1",
            Self::Phone2 => "phone2",
            Self::Governorate => "governorate",
            Self::City => "city",
            Self::Village => "village",
            Self::Street => "street",
        }
    }

    /// Minimum length for required fields, `None` for optional ones.
    #[must_use]
    pub const fn min_len(self) -> Option<usize> {
        match self {
            Self::Name | Self::Governorate | Self::City => Some(3),
            Self::Phone1 => Some(10),
            Self::Street => Some(5),
            Self::Phone2 | Self::Village => None,
        }
    }

    /// Whether an empty value is acceptable.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        self.min_len().is_none()
    }

    /// The message shown next to the field when it fails validation.
    ///
    /// Optional fields never fail and have no message.
    #[must_use]
    pub const fn error_message(self, locale: Locale) -> Option<&'static str> {
        let ui = locale.ui_text();
        match self {
            Self::Name => Some(ui.name_too_short),
            Self::Phone1 => Some(ui.phone1_invalid),
            Self::Governorate => Some(ui.governorate_missing),
            Self::City => Some(ui.city_missing),
            Self::Street => Some(ui.street_missing),
            Self::Phone2 | Self::Village => None,
        }
    }

    /// Form label.
    #[must_use]
    pub const fn label(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::ArEg, Self::Name) => "الاسم الثلاثي",
            (Locale::ArEg, Self::Phone1) => "رقم الهاتف الأساسي",
            (Locale::ArEg, Self::Phone2) => "رقم هاتف إضافي",
            (Locale::ArEg, Self::Governorate) => "المحافظة",
            (Locale::ArEg, Self::City) => "المدينة / المركز",
            (Locale::ArEg, Self::Village) => "القرية / المنطقة",
            (Locale::ArEg, Self::Street) => "الشارع ورقم المبنى/الشقة",
            (Locale::En, Self::Name) => "Full name",
            (Locale::En, Self::Phone1) => "Primary phone number",
            (Locale::En, Self::Phone2) => "Additional phone number",
            (Locale::En, Self::Governorate) => "Governorate",
            (Locale::En, Self::City) => "City / district",
            (Locale::En, Self::Village) => "Village / area",
            (Locale::En, Self::Street) => "Street and building/apartment number",
        }
    }

    /// Input placeholder.
    #[must_use]
    pub const fn placeholder(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::ArEg, Self::Name) => "مثال: أحمد محمد علي",
            (Locale::ArEg, Self::Phone1) => "مثال: 01012345678",
            (Locale::ArEg, Self::Phone2) => "مثال: 01112345678",
            (Locale::ArEg, Self::Governorate) => "مثال: القاهرة",
            (Locale::ArEg, Self::City) => "مثال: مدينة نصر",
            (Locale::ArEg, Self::Village) => "مثال: الحى السابع",
            (Locale::ArEg, Self::Street) => "مثال: شارع عباس العقاد، مبنى 5، شقة 10",
            (Locale::En, Self::Name) => "e.g. Ahmed Mohamed Ali",
            (Locale::En, Self::Phone1) => "e.g. 01012345678",
            (Locale::En, Self::Phone2) => "e.g. 01112345678",
            (Locale::En, Self::Governorate) => "e.g. Cairo",
            (Locale::En, Self::City) => "e.g. Nasr City",
            (Locale::En, Self::Village) => "e.g. 7th District",
            (Locale::En, Self::Street) => "e.g. Abbas El Akkad St., building 5, apt 10",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw form input.
///
/// Missing keys deserialize as empty strings, so a partially filled
/// `application/x-www-form-urlencoded` body still yields a form that can be
/// validated and re-rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerForm {
    pub name: String,
    pub phone1: String,
    pub phone2: String,
    pub governorate: String,
    pub city: String,
    pub village: String,
    pub street: String,
}

impl CustomerForm {
    /// The current value of `field`.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Phone1 => &self.phone1,
            Field::Phone2 => &self.phone2,
            Field::Governorate => &self.governorate,
            Field::City => &self.city,
            Field::Village => &self.village,
            Field::Street => &self.street,
        }
    }

    /// Replace the value of `field`.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Phone1 => &mut self.phone1,
            Field::Phone2 => &mut self.phone2,
            Field::Governorate => &mut self.governorate,
            Field::City => &mut self.city,
            Field::Village => &mut self.village,
            Field::Street => &mut self.street,
        };
        *slot = value.into();
    }

    /// Reset every field to the empty default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check every field and return the validated record.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] with one message per failing field, in
    /// display order, rendered for `locale`.
    pub fn validate(&self, locale: Locale) -> Result<CustomerInfo, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for field in Field::ALL {
            if let (Some(min), Some(message)) = (field.min_len(), field.error_message(locale))
                && self.value(field).encode_utf16().count() < min
            {
                errors.push(field, message);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CustomerInfo {
            name: self.name.clone(),
            phone1: self.phone1.clone(),
            phone2: non_empty(&self.phone2),
            governorate: self.governorate.clone(),
            city: self.city.clone(),
            village: non_empty(&self.village),
            street: self.street.clone(),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Field-level validation failures, in display order.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: Field, message: &str) {
        self.errors.push(FieldError {
            field,
            message: message.to_owned(),
        });
    }

    /// `true` when no field failed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// The message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// `true` if `field` failed.
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.get(field).is_some()
    }

    /// Iterate over failing fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self
            .errors
            .iter()
            .map(|e| e.field.name())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} field(s) failed validation: {fields}", self.errors.len())
    }
}

/// Customer details that passed validation.
///
/// Only [`CustomerForm::validate`] constructs this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerInfo {
    name: String,
    phone1: String,
    phone2: Option<String>,
    governorate: String,
    city: String,
    village: Option<String>,
    street: String,
}

impl CustomerInfo {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn phone1(&self) -> &str {
        &self.phone1
    }

    #[must_use]
    pub fn phone2(&self) -> Option<&str> {
        self.phone2.as_deref()
    }

    #[must_use]
    pub fn governorate(&self) -> &str {
        &self.governorate
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn village(&self) -> Option<&str> {
        self.village.as_deref()
    }

    #[must_use]
    pub fn street(&self) -> &str {
        &self.street
    }
}
