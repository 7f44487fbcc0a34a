//! Phone normalization and matching variants.
//!
//! Two calling conventions reach the engine:
//! - *split* (mobile clients): calling code and national number arrive as
//!   separate fields
//! - *combined* (web clients): one string, with or without a leading `+`
//!
//! Both are reduced to a digit-only [`Phone`] pair. Lookups then go through
//! [`variants`], because historical rows were stored inconsistently: some
//! with the calling code embedded in the number, some without.

use serde::{Deserialize, Serialize};

use crate::model::Phone;

/// National numbers longer than this are split by the fallback heuristic.
pub const FALLBACK_NATIONAL_DIGITS: usize = 10;

/// A phone number as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhoneInput {
    /// Calling code and national number supplied separately.
    Split { country_code: String, number: String },
    /// One string, e.g. `+971 50 123 4567` or `0501234567`.
    Combined(String),
}

impl PhoneInput {
    #[must_use]
    pub fn split(country_code: impl Into<String>, number: impl Into<String>) -> Self {
        Self::Split {
            country_code: country_code.into(),
            number: number.into(),
        }
    }

    #[must_use]
    pub fn combined(raw: impl Into<String>) -> Self {
        Self::Combined(raw.into())
    }
}

impl From<&Phone> for PhoneInput {
    fn from(phone: &Phone) -> Self {
        Self::split(phone.country_code.clone(), phone.number.clone())
    }
}

/// Raised when a phone reduces to nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid phone format: '{input}' contains no national number digits")]
pub struct InvalidPhoneFormat {
    pub input: String,
}

/// Reduce `input` to a canonical digit-only pair.
///
/// # Errors
///
/// Returns [`InvalidPhoneFormat`] when no national-number digits remain.
pub fn normalize(input: &PhoneInput) -> Result<Phone, InvalidPhoneFormat> {
    match input {
        PhoneInput::Split {
            country_code,
            number,
        } => {
            let national = digits(number);
            if national.is_empty() {
                return Err(InvalidPhoneFormat {
                    input: format!("{country_code} {number}").trim().to_string(),
                });
            }
            Ok(Phone::new(digits(country_code), national))
        }
        PhoneInput::Combined(raw) => {
            if let Some(phone) = parse_e164(raw) {
                return Ok(phone);
            }
            fallback_split(raw).ok_or_else(|| InvalidPhoneFormat { input: raw.clone() })
        }
    }
}

/// Parse an international `+<code><number>` string.
///
/// Returns `None` when there is no leading `+`, or when the number is not a
/// valid number for the region its calling code designates. Italian-style
/// significant leading zeros are kept in the national part.
#[must_use]
pub fn parse_e164(raw: &str) -> Option<Phone> {
    let trimmed = raw.trim();
    let rest = trimmed.strip_prefix('+')?;
    if rest.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let parsed = phonenumber::parse(None, trimmed).ok()?;
    if !phonenumber::is_valid(&parsed) {
        return None;
    }
    let national = parsed.national();
    let number = format!(
        "{}{}",
        "0".repeat(usize::from(national.zeros())),
        national.value()
    );
    Some(Phone::new(parsed.code().value().to_string(), number))
}

fn fallback_split(raw: &str) -> Option<Phone> {
    let all = digits(raw);
    if all.is_empty() {
        return None;
    }
    if all.len() > FALLBACK_NATIONAL_DIGITS {
        let cut = all.len() - FALLBACK_NATIONAL_DIGITS;
        Some(Phone::new(&all[..cut], &all[cut..]))
    } else {
        Some(Phone::new("", all))
    }
}

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// The three textual encodings registered and probed for one phone:
/// `+{cc}{number}`, `{cc}{number}` and the bare `{number}`.
///
/// Stored values are re-sanitized so legacy rows with stray formatting
/// still produce comparable keys.
#[must_use]
pub fn variants(phone: &Phone) -> [String; 3] {
    let cc = digits(&phone.country_code);
    let number = digits(&phone.number);
    [format!("+{cc}{number}"), format!("{cc}{number}"), number]
}

/// Normalize every input, splitting results into usable phones and the
/// inputs that could not be normalized.
#[must_use]
pub fn normalize_all(inputs: &[PhoneInput]) -> (Vec<Phone>, Vec<InvalidPhoneFormat>) {
    let mut phones = Vec::with_capacity(inputs.len());
    let mut rejected = Vec::new();
    for input in inputs {
        match normalize(input) {
            Ok(phone) => {
                if !phones.contains(&phone) {
                    phones.push(phone);
                }
            }
            Err(err) => rejected.push(err),
        }
    }
    (phones, rejected)
}
