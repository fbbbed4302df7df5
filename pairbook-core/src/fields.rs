//! Validated scalar fields of a contact
//!
//! All field types are immutable once constructed. Phone, email and address
//! have a well-known sentinel used when no real value was supplied; the
//! identity resolver relies on it to tell "no data" from "matching data".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FieldError;

/// Placeholder phone for contacts with no known number
pub const DEFAULT_PHONE: &str = "000";
/// Placeholder email for contacts with no known email
pub const DEFAULT_EMAIL: &str = "default@email";
/// Placeholder address for contacts with no known address
pub const DEFAULT_ADDRESS: &str = "Default Address";

/// A person's name, trimmed with runs of inner whitespace collapsed
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        let valid = collapsed
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric())
            && collapsed.chars().all(|c| c.is_alphanumeric() || c == ' ');
        if !valid {
            return Err(FieldError::InvalidName(raw.to_string()));
        }
        Ok(Self(collapsed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive form used when deciding whether two contacts are the
    /// same person
    pub fn normalized_for_identity(&self) -> String {
        self.0.to_lowercase()
    }
}

/// A phone number as entered, e.g. "9123 4567" or "+65 9123-4567"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
        let allowed = body
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
        if !allowed || digits < 3 {
            return Err(FieldError::InvalidPhone(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits only, so "9123 4567" and "91234567" compare equal
    pub fn normalized_for_identity(&self) -> String {
        self.0.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    pub fn is_default(&self) -> bool {
        self.normalized_for_identity() == DEFAULT_PHONE
    }
}

impl Default for Phone {
    fn default() -> Self {
        Self(DEFAULT_PHONE.to_string())
    }
}

/// An email address of the form local-part@domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if !is_valid_email(trimmed) {
            return Err(FieldError::InvalidEmail(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn normalized_for_identity(&self) -> String {
        self.0.trim().to_lowercase()
    }

    pub fn is_default(&self) -> bool {
        self.normalized_for_identity() == DEFAULT_EMAIL
    }
}

impl Default for Email {
    fn default() -> Self {
        Self(DEFAULT_EMAIL.to_string())
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    let special = |c: char| "+_.-".contains(c);
    let local_ok = !local.is_empty()
        && local.chars().all(|c| c.is_alphanumeric() || special(c))
        && local.starts_with(|c: char| c.is_alphanumeric())
        && local.ends_with(|c: char| c.is_alphanumeric());
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
            && label.starts_with(|c: char| c.is_alphanumeric())
            && label.ends_with(|c: char| c.is_alphanumeric())
    });
    labels_ok && labels.last().is_some_and(|last| last.chars().count() >= 2)
}

/// A free-form postal address; must not be blank
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FieldError::InvalidAddress);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ADDRESS
    }
}

impl Default for Address {
    fn default() -> Self {
        Self(DEFAULT_ADDRESS.to_string())
    }
}

/// A tag as entered. Stored case-sensitively, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    pub fn new(raw: &str) -> Result<Self, FieldError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.chars().all(char::is_alphanumeric) {
            return Err(FieldError::InvalidTag(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, other: &Tag) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

/// Free text attached to a contact. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Remark(String);

impl Remark {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

macro_rules! string_conversions {
    ($($ty:ident),*) => {
        $(
            impl TryFrom<String> for $ty {
                type Error = FieldError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    $ty::new(&value)
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.0
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

string_conversions!(Name, Phone, Email, Address, Tag);

impl From<String> for Remark {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Remark> for String {
    fn from(value: Remark) -> Self {
        value.0
    }
}

impl fmt::Display for Remark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
