//! Staged, probabilistically failing payment simulation.

use crate::config::CheckoutConfig;
use crate::domain::payment::{PaymentResult, PaymentStatus};
use crate::domain::ports::{PhaseUpdate, ProgressObserver};
use chrono::Utc;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info};

/// One intermediate step of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub label: &'static str,
    pub delay_ms: u64,
}

const fn phase(label: &'static str, delay_ms: u64) -> Phase {
    Phase { label, delay_ms }
}

const PIX_PHASES: &[Phase] = &[
    phase("Validating data", 500),
    phase("Generating QR code", 800),
    phase("Awaiting payment", 1000),
    phase("Confirming payment", 700),
];

const CREDIT_PHASES: &[Phase] = &[
    phase("Validating card", 800),
    phase("Processing payment", 1200),
    phase("Checking credit limit", 600),
    phase("Finalizing transaction", 400),
];

const DEBIT_PHASES: &[Phase] = &[
    phase("Validating card", 600),
    phase("Processing debit", 800),
    phase("Checking balance", 400),
    phase("Finalizing transaction", 300),
];

const BOLETO_PHASES: &[Phase] = &[
    phase("Generating boleto", 400),
    phase("Validating data", 300),
    phase("Finalizing", 300),
];

/// Phases and declared settlement time of a payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentPlan {
    pub phases: &'static [Phase],
    /// Wait after the last phase, reported as the processing time.
    pub settlement_ms: u64,
}

impl PaymentPlan {
    /// Looks up the plan by method identifier. Card methods other than a new
    /// credit card share the credit phases but settle like unknown methods.
    pub fn for_method(method: &str) -> Self {
        let phases = match method {
            "pix" => PIX_PHASES,
            "debit" => DEBIT_PHASES,
            "boleto" => BOLETO_PHASES,
            _ => CREDIT_PHASES,
        };
        let settlement_ms = match method {
            "pix" => 2000,
            "credit" => 3000,
            "debit" => 1500,
            "boleto" => 1000,
            _ => 2000,
        };
        Self { phases, settlement_ms }
    }

    /// Sum of phase delays plus settlement, in milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.phases.iter().map(|p| p.delay_ms).sum::<u64>() + self.settlement_ms
    }
}

/// Runs payment attempts. Cheap to clone; holds no per-attempt state.
#[derive(Debug, Clone, Copy)]
pub struct PaymentSimulator {
    config: CheckoutConfig,
}

impl PaymentSimulator {
    pub fn new(config: CheckoutConfig) -> Self {
        Self { config }
    }

    /// Walks the method's phases, reporting each one to `observer`, then
    /// settles the attempt. Never fails: a declined payment is a `Failed`
    /// result.
    pub async fn run(&self, method: &str, observer: &dyn ProgressObserver) -> PaymentResult {
        let plan = PaymentPlan::for_method(method);
        let total = plan.phases.len();

        for (index, phase) in plan.phases.iter().enumerate() {
            debug!(method, phase = phase.label, index, "payment phase");
            observer.on_phase(&PhaseUpdate {
                status: PaymentStatus::Processing,
                label: phase.label,
                index,
                total,
            });
            self.pause(Duration::from_millis(phase.delay_ms)).await;
        }
        self.pause(Duration::from_millis(plan.settlement_ms)).await;

        let result = self.settle(plan.settlement_ms);
        info!(
            method,
            status = %result.status(),
            transaction_id = result.transaction_id(),
            processing_time = result.processing_time(),
            "payment settled"
        );
        result
    }

    async fn pause(&self, delay: Duration) {
        let delay = self.config.scaled(delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Draws the outcome of one attempt.
    pub fn settle(&self, processing_time: u64) -> PaymentResult {
        let declined = rand::thread_rng().gen_range(0.0..1.0) < self.config.failure_rate;
        if declined {
            PaymentResult::failed(transaction_id(), processing_time)
        } else {
            PaymentResult::paid(transaction_id(), processing_time)
        }
    }
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `TXN_<epoch millis>_<9 base36 chars>`.
pub fn transaction_id() -> String {
    format!("TXN_{}_{}", Utc::now().timestamp_millis(), random_suffix(9))
}

/// Id of the synthetic result produced when an attempt faults.
pub fn error_transaction_id() -> String {
    format!("ERR_{}_{}", Utc::now().timestamp_millis(), random_suffix(9))
}
