//! Data accumulated across the checkout steps.

use super::cart::CartLineItem;
use super::customer::CustomerData;
use super::money::Money;
use super::payment::{PaymentResult, PaymentSelection, PaymentStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five checkout steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    CustomerData,
    PaymentMethod,
    Review,
    Processing,
    Result,
}

impl StepKind {
    pub const ALL: [StepKind; 5] = [
        StepKind::CustomerData,
        StepKind::PaymentMethod,
        StepKind::Review,
        StepKind::Processing,
        StepKind::Result,
    ];

    pub fn title(self) -> &'static str {
        match self {
            StepKind::CustomerData => "Customer data",
            StepKind::PaymentMethod => "Payment",
            StepKind::Review => "Review",
            StepKind::Processing => "Processing",
            StepKind::Result => "Result",
        }
    }

    /// Only the first three steps can be left backwards.
    pub fn previous(self) -> Option<StepKind> {
        match self {
            StepKind::PaymentMethod => Some(StepKind::CustomerData),
            StepKind::Review => Some(StepKind::PaymentMethod),
            StepKind::CustomerData | StepKind::Processing | StepKind::Result => None,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
}

/// Status of every step relative to `current`, for a steps indicator.
pub fn step_progress(current: StepKind) -> Vec<(StepKind, StepStatus)> {
    StepKind::ALL
        .iter()
        .map(|&step| {
            let status = match step.cmp(&current) {
                std::cmp::Ordering::Less => StepStatus::Completed,
                std::cmp::Ordering::Equal => StepStatus::Current,
                std::cmp::Ordering::Greater => StepStatus::Pending,
            };
            (step, status)
        })
        .collect()
}

/// The order as confirmed on the review step.
///
/// Items and total are a snapshot; later cart changes do not reach them.
/// `transaction_id` and `status` start empty and are filled once processing
/// settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    pub customer: CustomerData,
    pub payment: PaymentSelection,
    pub items: Vec<CartLineItem>,
    pub total: Money,
    pub transaction_id: Option<String>,
    pub status: Option<PaymentStatus>,
}

impl OrderData {
    /// Returns the order with the settlement fields of `result` added.
    pub fn settled(self, result: &PaymentResult) -> Self {
        Self {
            transaction_id: Some(result.transaction_id().to_string()),
            status: Some(result.status()),
            ..self
        }
    }
}

/// Step contributions collected so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckoutSession {
    customer_data: Option<CustomerData>,
    payment_method: Option<PaymentSelection>,
    order_data: Option<OrderData>,
    payment_result: Option<PaymentResult>,
}

/// A partial session, produced by completing one step.
///
/// Merging is shallow: every field that is set replaces the stored one,
/// fields left unset keep what is already there.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub customer_data: Option<CustomerData>,
    pub payment_method: Option<PaymentSelection>,
    pub order_data: Option<OrderData>,
    pub payment_result: Option<PaymentResult>,
}

impl SessionUpdate {
    pub fn customer(data: CustomerData) -> Self {
        Self {
            customer_data: Some(data),
            ..Self::default()
        }
    }

    pub fn payment(selection: PaymentSelection) -> Self {
        Self {
            payment_method: Some(selection),
            ..Self::default()
        }
    }

    pub fn order(order: OrderData) -> Self {
        Self {
            order_data: Some(order),
            ..Self::default()
        }
    }

    pub fn settlement(result: PaymentResult, order: OrderData) -> Self {
        Self {
            order_data: Some(order),
            payment_result: Some(result),
            ..Self::default()
        }
    }
}

impl CheckoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, update: SessionUpdate) {
        if let Some(data) = update.customer_data {
            self.customer_data = Some(data);
        }
        if let Some(selection) = update.payment_method {
            self.payment_method = Some(selection);
        }
        if let Some(order) = update.order_data {
            self.order_data = Some(order);
        }
        if let Some(result) = update.payment_result {
            self.payment_result = Some(result);
        }
    }

    pub fn customer_data(&self) -> Option<&CustomerData> {
        self.customer_data.as_ref()
    }

    pub fn payment_method(&self) -> Option<&PaymentSelection> {
        self.payment_method.as_ref()
    }

    pub fn order_data(&self) -> Option<&OrderData> {
        self.order_data.as_ref()
    }

    pub fn payment_result(&self) -> Option<&PaymentResult> {
        self.payment_result.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
