use crate::error::{FieldErrors, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A payment card as kept in the vault: no number, no CVV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub holder_name: String,
    /// `MM/YY`.
    pub expiry: String,
    pub last4: String,
}

/// Card details as entered in the add-card form.
#[derive(Clone, Default)]
pub struct CardInput {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
    pub holder_name: String,
}

impl fmt::Debug for CardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardInput")
            .field("number", &"<redacted>")
            .field("expiry", &self.expiry)
            .field("cvv", &"<redacted>")
            .field("holder_name", &self.holder_name)
            .finish()
    }
}

impl CardInput {
    /// Digits of the card number, spaces and separators removed.
    pub fn sanitized_number(&self) -> String {
        self.number.chars().filter(char::is_ascii_digit).collect()
    }

    /// Validates the form and produces the masked card with a fresh id.
    pub fn into_card(self) -> Result<Card> {
        let mut errors = FieldErrors::default();
        let digits = self.sanitized_number();

        if self.number.trim().is_empty() {
            errors.push("number", "card number is required");
        } else if digits.len() < 4 {
            errors.push("number", "card number must contain at least 4 digits");
        }
        if self.expiry.trim().is_empty() {
            errors.push("expiry", "expiry date is required");
        }
        if self.cvv.trim().is_empty() {
            errors.push("cvv", "CVV is required");
        }
        if self.holder_name.trim().is_empty() {
            errors.push("holder_name", "card holder name is required");
        }
        errors.into_result()?;

        Ok(Card {
            id: Uuid::now_v7().to_string(),
            holder_name: self.holder_name.trim().to_string(),
            expiry: format_expiry(&self.expiry),
            last4: digits[digits.len() - 4..].to_string(),
        })
    }
}

/// Formats an expiry typed as digits (`1228`) into `MM/YY`; anything else is
/// kept as typed.
pub fn format_expiry(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 4 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        value.trim().to_string()
    }
}

/// `true` if a card with the same last four digits is already saved.
///
/// This is a "looks like the same card" heuristic, not an identity check.
pub fn is_already_saved(card: &Card, saved: &[Card]) -> bool {
    saved.iter().any(|c| c.last4 == card.last4)
}
