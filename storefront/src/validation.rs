//! Checkout form validation.
//!
//! Each step is validated as a whole: the functions here return every
//! invalid field of the step at once, never just the first one.

use crate::types::{OrderDraft, OrderField, ValidationErrors};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// Message for a missing payment method
pub const PAYMENT_REQUIRED: &str = "Choose a payment method";
/// Message for a blank address
pub const ADDRESS_REQUIRED: &str = "Enter a delivery address";
/// Message for a blank or malformed email
pub const EMAIL_INVALID: &str = "Enter a valid email";
/// Message for a blank phone
pub const PHONE_REQUIRED: &str = "Enter a phone number";

/// Shape accepted by [`EmailPolicy::Format`]: `local@domain.tld`
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_FORMAT: LazyLock<Option<Regex>> = LazyLock::new(|| match Regex::new(EMAIL_PATTERN) {
    Ok(format) => Some(format),
    Err(error) => {
        tracing::error!(%error, "Email pattern does not compile; format checks reject every email");
        None
    },
});

/// How strictly the email field is checked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmailPolicy {
    /// Any non-blank value is accepted
    #[default]
    Presence,
    /// The value must look like `local@domain.tld`
    Format,
}

impl EmailPolicy {
    fn accepts(self, email: &str) -> bool {
        match self {
            Self::Presence => !is_blank(email),
            Self::Format => EMAIL_FORMAT
                .as_ref()
                .is_some_and(|format| format.is_match(email.trim())),
        }
    }
}

impl FromStr for EmailPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "presence" => Ok(Self::Presence),
            "format" => Ok(Self::Format),
            other => Err(format!("expected `presence` or `format`, got `{other}`")),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validates the payment/address step
#[must_use]
pub fn validate_address(draft: &OrderDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if draft.payment.is_none() {
        errors.insert(OrderField::Payment, PAYMENT_REQUIRED);
    }
    if is_blank(&draft.address) {
        errors.insert(OrderField::Address, ADDRESS_REQUIRED);
    }
    errors
}

/// Validates the email/phone step
#[must_use]
pub fn validate_contacts(draft: &OrderDraft, policy: EmailPolicy) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if !policy.accepts(&draft.email) {
        errors.insert(OrderField::Email, EMAIL_INVALID);
    }
    if is_blank(&draft.phone) {
        errors.insert(OrderField::Phone, PHONE_REQUIRED);
    }
    errors
}
