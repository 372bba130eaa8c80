use super::card::{Card, is_already_saved};
use crate::error::CheckoutError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FAILURE_MESSAGE: &str = "Payment processing failed. Please try again.";
pub const SUCCESS_MESSAGE: &str = "Payment processed successfully!";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal processing error";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Processing,
    Paid,
    Failed,
    Expired,
}

impl PaymentStatus {
    pub fn is_success(self) -> bool {
        self == PaymentStatus::Paid
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Processing => "processing",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// The terminal outcome of one payment attempt.
///
/// Built only through the constructors below so `success` always agrees with
/// `status`; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResult {
    success: bool,
    status: PaymentStatus,
    message: String,
    transaction_id: String,
    /// Declared processing time in milliseconds.
    processing_time: u64,
}

impl PaymentResult {
    fn terminal(status: PaymentStatus, message: &str, transaction_id: String, processing_time: u64) -> Self {
        Self {
            success: status.is_success(),
            status,
            message: message.to_string(),
            transaction_id,
            processing_time,
        }
    }

    pub fn paid(transaction_id: String, processing_time: u64) -> Self {
        Self::terminal(PaymentStatus::Paid, SUCCESS_MESSAGE, transaction_id, processing_time)
    }

    pub fn failed(transaction_id: String, processing_time: u64) -> Self {
        Self::terminal(PaymentStatus::Failed, FAILURE_MESSAGE, transaction_id, processing_time)
    }

    /// Synthetic result for an attempt that faulted before settling.
    pub fn internal_failure(transaction_id: String) -> Self {
        Self::terminal(PaymentStatus::Failed, INTERNAL_ERROR_MESSAGE, transaction_id, 0)
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn processing_time(&self) -> u64 {
        self.processing_time
    }
}

/// What the buyer picked on the payment-method step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodId {
    Pix,
    /// "Add a new credit card".
    Credit,
    Debit,
    Boleto,
    /// The card added in this session and not saved under the same digits.
    CurrentCard,
    /// A vault card, by card id.
    Saved(String),
}

const SAVED_PREFIX: &str = "saved-";

impl PaymentMethodId {
    /// Whether a concrete card must be attached before advancing.
    pub fn requires_card(&self) -> bool {
        matches!(
            self,
            PaymentMethodId::Credit | PaymentMethodId::CurrentCard | PaymentMethodId::Saved(_)
        )
    }
}

impl fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethodId::Pix => f.write_str("pix"),
            PaymentMethodId::Credit => f.write_str("credit"),
            PaymentMethodId::Debit => f.write_str("debit"),
            PaymentMethodId::Boleto => f.write_str("boleto"),
            PaymentMethodId::CurrentCard => f.write_str("current-card"),
            PaymentMethodId::Saved(id) => write!(f, "{SAVED_PREFIX}{id}"),
        }
    }
}

impl FromStr for PaymentMethodId {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pix" => Ok(PaymentMethodId::Pix),
            "credit" => Ok(PaymentMethodId::Credit),
            "debit" => Ok(PaymentMethodId::Debit),
            "boleto" => Ok(PaymentMethodId::Boleto),
            "current-card" => Ok(PaymentMethodId::CurrentCard),
            other => match other.strip_prefix(SAVED_PREFIX) {
                Some(id) if !id.is_empty() => Ok(PaymentMethodId::Saved(id.to_string())),
                _ => Err(CheckoutError::invalid(
                    "method",
                    format!("unknown payment method '{other}'"),
                )),
            },
        }
    }
}

impl Serialize for PaymentMethodId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PaymentMethodId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The submitted payment-method step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSelection {
    pub method: PaymentMethodId,
    /// Card added during this checkout, if any.
    pub card: Option<Card>,
    /// The vault as shown to the buyer.
    pub saved_cards: Vec<Card>,
}

impl PaymentSelection {
    /// The card the payment will be charged to, if the method uses one.
    pub fn resolved_card(&self) -> Option<&Card> {
        match &self.method {
            PaymentMethodId::Saved(id) => self
                .saved_cards
                .iter()
                .find(|c| &c.id == id)
                .or(self.card.as_ref()),
            PaymentMethodId::Credit | PaymentMethodId::CurrentCard => self.card.as_ref(),
            _ => None,
        }
    }

    /// Human-readable label of the chosen method.
    pub fn describe(&self) -> String {
        match &self.method {
            PaymentMethodId::Pix => "PIX - instant payment".to_string(),
            PaymentMethodId::Boleto => "Boleto - due in 3 days".to_string(),
            PaymentMethodId::Debit => "Debit card".to_string(),
            PaymentMethodId::CurrentCard => match &self.card {
                Some(card) => format!("Card ending in {}", card.last4),
                None => "Credit card".to_string(),
            },
            PaymentMethodId::Saved(id) => match self.saved_cards.iter().find(|c| &c.id == id) {
                Some(card) => format!("Saved card ending in {}", card.last4),
                None => "Credit card".to_string(),
            },
            PaymentMethodId::Credit => "Credit card".to_string(),
        }
    }
}

/// One selectable entry on the payment-method step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentOption {
    pub method: PaymentMethodId,
    pub label: String,
    pub hint: &'static str,
}

/// Options in display order: PIX, the current card (unless a saved card has
/// the same last digits), each saved card, "add card" and boleto.
pub fn payment_options(current_card: Option<&Card>, saved_cards: &[Card]) -> Vec<PaymentOption> {
    let mut options = vec![PaymentOption {
        method: PaymentMethodId::Pix,
        label: "PIX".to_string(),
        hint: "Instant payment",
    }];
    if let Some(card) = current_card
        && !is_already_saved(card, saved_cards)
    {
        options.push(PaymentOption {
            method: PaymentMethodId::CurrentCard,
            label: format!("Card ending in {}", card.last4),
            hint: "Current card",
        });
    }
    options.extend(saved_cards.iter().map(|card| PaymentOption {
        method: PaymentMethodId::Saved(card.id.clone()),
        label: format!("Card ending in {}", card.last4),
        hint: "Saved card",
    }));
    options.push(PaymentOption {
        method: PaymentMethodId::Credit,
        label: "Add credit card".to_string(),
        hint: "New card",
    });
    options.push(PaymentOption {
        method: PaymentMethodId::Boleto,
        label: "Boleto".to_string(),
        hint: "Due in 3 days",
    });
    options
}
