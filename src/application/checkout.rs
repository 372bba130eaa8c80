//! The five-step checkout.
//!
//! A [`CheckoutContext`] holds the current step and everything collected so
//! far; [`CheckoutFlow`] owns the collaborators and moves a context from one
//! step to the next. A transition that returns an error never advances and
//! never drops collected data.

use crate::application::cart::ShoppingCart;
use crate::application::identity::IdentityService;
use crate::application::simulator::{PaymentSimulator, error_transaction_id};
use crate::application::vault::CardVault;
use crate::config::CheckoutConfig;
use crate::domain::card::{Card, CardInput};
use crate::domain::cart::CartLineItem;
use crate::domain::customer::{CustomerData, CustomerForm};
use crate::domain::money::Money;
use crate::domain::payment::{PaymentMethodId, PaymentOption, PaymentResult, PaymentSelection, payment_options};
use crate::domain::ports::{PhaseUpdate, ProgressObserver};
use crate::domain::session::{
    CheckoutSession, OrderData, SessionUpdate, StepKind, StepStatus, step_progress,
};
use crate::domain::user::User;
use crate::error::{CheckoutError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// What the payment-method step shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentMethodForm {
    pub saved_cards: Vec<Card>,
    /// Card added during this checkout.
    pub current_card: Option<Card>,
}

/// The current step with the data it displays.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutStep {
    CustomerData(CustomerForm),
    PaymentMethod(PaymentMethodForm),
    Review,
    Processing,
    Result,
}

impl CheckoutStep {
    pub fn kind(&self) -> StepKind {
        match self {
            CheckoutStep::CustomerData(_) => StepKind::CustomerData,
            CheckoutStep::PaymentMethod(_) => StepKind::PaymentMethod,
            CheckoutStep::Review => StepKind::Review,
            CheckoutStep::Processing => StepKind::Processing,
            CheckoutStep::Result => StepKind::Result,
        }
    }
}

/// One shopper's pass through the checkout.
#[derive(Debug)]
pub struct CheckoutContext {
    step: CheckoutStep,
    session: CheckoutSession,
    user: User,
}

impl CheckoutContext {
    pub fn step(&self) -> &CheckoutStep {
        &self.step
    }

    pub fn step_kind(&self) -> StepKind {
        self.step.kind()
    }

    pub fn session(&self) -> &CheckoutSession {
        &self.session
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Completed, current and pending steps, in order.
    pub fn progress(&self) -> Vec<(StepKind, StepStatus)> {
        step_progress(self.step_kind())
    }

    /// Selectable payment methods; empty outside the payment-method step.
    pub fn payment_options(&self) -> Vec<PaymentOption> {
        match &self.step {
            CheckoutStep::PaymentMethod(form) => {
                payment_options(form.current_card.as_ref(), &form.saved_cards)
            }
            _ => Vec::new(),
        }
    }

    fn ensure_step(&self, kind: StepKind) -> Result<()> {
        if self.step_kind() == kind {
            Ok(())
        } else {
            Err(CheckoutError::precondition(format!(
                "checkout is at '{}', not '{}'",
                self.step_kind(),
                kind
            )))
        }
    }
}

/// Live preview of the order on the review step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub customer: CustomerData,
    pub payment_label: String,
    pub items: Vec<CartLineItem>,
    pub total: Money,
}

/// Forwards phase updates only while the attempt is still wanted.
struct GuardedObserver {
    live: Arc<AtomicBool>,
    inner: Arc<dyn ProgressObserver>,
}

impl ProgressObserver for GuardedObserver {
    fn on_phase(&self, update: &PhaseUpdate) {
        if self.live.load(Ordering::Acquire) {
            self.inner.on_phase(update);
        }
    }
}

/// A running simulation. Dropping it silences the observer and aborts the
/// task.
struct Attempt {
    live: Arc<AtomicBool>,
    handle: JoinHandle<PaymentResult>,
}

impl Drop for Attempt {
    fn drop(&mut self) {
        self.live.store(false, Ordering::Release);
        self.handle.abort();
    }
}

pub struct CheckoutFlow {
    cart: Arc<ShoppingCart>,
    vault: CardVault,
    identity: IdentityService,
    simulator: PaymentSimulator,
    config: CheckoutConfig,
}

impl CheckoutFlow {
    pub fn new(
        cart: Arc<ShoppingCart>,
        vault: CardVault,
        identity: IdentityService,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            cart,
            vault,
            identity,
            simulator: PaymentSimulator::new(config),
            config,
        }
    }

    /// Starts a checkout for the signed-in user on the customer-data step.
    pub async fn begin(&self) -> Result<CheckoutContext> {
        let Some(user) = self.identity.current_user().await? else {
            warn!("checkout requested without a signed-in user");
            return Err(CheckoutError::precondition("sign in to check out"));
        };
        if self.cart.is_empty().await {
            warn!(user_id = %user.id, "checkout requested with an empty cart");
            return Err(CheckoutError::precondition("the cart is empty"));
        }

        info!(user_id = %user.id, "checkout started");
        Ok(CheckoutContext {
            step: CheckoutStep::CustomerData(CustomerForm::prefilled(Some(&user))),
            session: CheckoutSession::new(),
            user,
        })
    }

    /// Validates the customer form and moves to the payment-method step.
    ///
    /// On a validation error the typed form is kept on the step.
    pub async fn submit_customer_data(&self, ctx: &mut CheckoutContext, form: CustomerForm) -> Result<()> {
        ctx.ensure_step(StepKind::CustomerData)?;

        let form = form.normalized();
        let data = match form.clone().validate() {
            Ok(data) => data,
            Err(e) => {
                ctx.step = CheckoutStep::CustomerData(form);
                return Err(e);
            }
        };
        let method_form = self.payment_method_form(ctx).await?;

        ctx.session.apply(SessionUpdate::customer(data));
        ctx.step = CheckoutStep::PaymentMethod(method_form);
        info!(user_id = %ctx.user.id, "customer data accepted");
        Ok(())
    }

    /// Adds a card on the payment-method step and makes it the current card.
    /// With `save` it is also stored in the user's vault.
    pub async fn add_card(&self, ctx: &mut CheckoutContext, input: CardInput, save: bool) -> Result<Card> {
        ctx.ensure_step(StepKind::PaymentMethod)?;

        let card = self.vault.add_card(Some(&ctx.user.id), input, save).await?;
        let saved_cards = if save {
            Some(self.vault.list_cards(Some(&ctx.user.id)).await?)
        } else {
            None
        };

        if let CheckoutStep::PaymentMethod(form) = &mut ctx.step {
            if let Some(saved_cards) = saved_cards {
                form.saved_cards = saved_cards;
            }
            form.current_card = Some(card.clone());
        }
        Ok(card)
    }

    /// Records the chosen payment method and moves to review.
    ///
    /// `method` is an option identifier (`pix`, `credit`, `debit`, `boleto`,
    /// `current-card`, `saved-<card id>`).
    pub async fn submit_payment_method(&self, ctx: &mut CheckoutContext, method: Option<&str>) -> Result<()> {
        ctx.ensure_step(StepKind::PaymentMethod)?;
        let CheckoutStep::PaymentMethod(form) = &ctx.step else {
            return Err(CheckoutError::precondition("payment step has no form"));
        };

        let Some(method) = method.map(str::trim).filter(|m| !m.is_empty()) else {
            warn!(user_id = %ctx.user.id, "no payment method selected");
            return Err(CheckoutError::precondition("select a payment method"));
        };
        let method: PaymentMethodId = method.parse()?;

        let selection = PaymentSelection {
            method,
            card: form.current_card.clone(),
            saved_cards: form.saved_cards.clone(),
        };
        if selection.method.requires_card() && selection.resolved_card().is_none() {
            warn!(user_id = %ctx.user.id, method = %selection.method, "card method without a card");
            return Err(CheckoutError::precondition("add or select a card to pay by card"));
        }

        info!(user_id = %ctx.user.id, method = %selection.method, "payment method selected");
        ctx.session.apply(SessionUpdate::payment(selection));
        ctx.step = CheckoutStep::Review;
        Ok(())
    }

    /// The order as it would be confirmed right now.
    pub async fn review(&self, ctx: &CheckoutContext) -> Result<ReviewSummary> {
        ctx.ensure_step(StepKind::Review)?;
        let (customer, payment) = collected(&ctx.session)?;
        let cart = self.cart.snapshot().await;

        Ok(ReviewSummary {
            customer: customer.clone(),
            payment_label: payment.describe(),
            items: cart.items().to_vec(),
            total: cart.total_price(),
        })
    }

    /// Freezes the order, runs the payment and ends on the result step.
    ///
    /// Phase updates go to `observer` while the payment runs. If this future
    /// is dropped before it completes, the simulation is cancelled, the
    /// observer stops receiving updates and the context stays on the
    /// processing step.
    pub async fn confirm_review(
        &self,
        ctx: &mut CheckoutContext,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<PaymentResult> {
        ctx.ensure_step(StepKind::Review)?;
        let cart = self.cart.snapshot().await;
        if cart.is_empty() {
            warn!(user_id = %ctx.user.id, "review confirmed with an empty cart");
            return Err(CheckoutError::precondition("the cart is empty"));
        }
        let (customer, payment) = collected(&ctx.session)?;

        let order = OrderData {
            customer: customer.clone(),
            payment: payment.clone(),
            items: cart.items().to_vec(),
            total: cart.total_price(),
            transaction_id: None,
            status: None,
        };
        let method = order.payment.method.to_string();
        ctx.session.apply(SessionUpdate::order(order.clone()));
        ctx.step = CheckoutStep::Processing;
        info!(user_id = %ctx.user.id, method = %method, total = %order.total, "order confirmed");

        let result = self.run_attempt(&method, observer).await;

        ctx.session.apply(SessionUpdate::settlement(result.clone(), order.settled(&result)));
        let display = self.config.scaled(self.config.result_display_delay);
        if !display.is_zero() {
            tokio::time::sleep(display).await;
        }
        ctx.step = CheckoutStep::Result;
        info!(
            user_id = %ctx.user.id,
            status = %result.status(),
            transaction_id = result.transaction_id(),
            "checkout finished"
        );
        Ok(result)
    }

    async fn run_attempt(&self, method: &str, observer: Arc<dyn ProgressObserver>) -> PaymentResult {
        let live = Arc::new(AtomicBool::new(true));
        let guarded = GuardedObserver {
            live: live.clone(),
            inner: observer,
        };
        let simulator = self.simulator;
        let task_method = method.to_string();
        let mut attempt = Attempt {
            live,
            handle: tokio::spawn(async move { simulator.run(&task_method, &guarded).await }),
        };

        match (&mut attempt.handle).await {
            Ok(result) => result,
            Err(e) => {
                error!(method, error = %e, "payment attempt faulted");
                PaymentResult::internal_failure(error_transaction_id())
            }
        }
    }

    /// One step back. Everything collected so far is kept.
    pub async fn back(&self, ctx: &mut CheckoutContext) -> Result<()> {
        let Some(previous) = ctx.step_kind().previous() else {
            return Err(CheckoutError::precondition(format!(
                "cannot go back from '{}'",
                ctx.step_kind()
            )));
        };

        ctx.step = match previous {
            StepKind::CustomerData => CheckoutStep::CustomerData(match ctx.session.customer_data() {
                Some(data) => CustomerForm::from(data),
                None => CustomerForm::prefilled(Some(&ctx.user)),
            }),
            StepKind::PaymentMethod => CheckoutStep::PaymentMethod(self.payment_method_form(ctx).await?),
            StepKind::Review | StepKind::Processing | StepKind::Result => {
                return Err(CheckoutError::precondition("no step to go back to"));
            }
        };
        Ok(())
    }

    /// After a failed payment, starts over from customer data with nothing
    /// collected.
    pub fn retry(&self, ctx: &mut CheckoutContext) -> Result<()> {
        ctx.ensure_step(StepKind::Result)?;
        if ctx.session.payment_result().is_none_or(PaymentResult::success) {
            return Err(CheckoutError::precondition("only a failed payment can be retried"));
        }

        ctx.session = CheckoutSession::new();
        ctx.step = CheckoutStep::CustomerData(CustomerForm::prefilled(Some(&ctx.user)));
        info!(user_id = %ctx.user.id, "checkout restarted after a failed payment");
        Ok(())
    }

    /// Leaves the result step: the cart is emptied and the checkout ends.
    pub async fn new_purchase(&self, ctx: CheckoutContext) -> Result<()> {
        ctx.ensure_step(StepKind::Result)?;
        self.cart.clear().await?;
        info!(user_id = %ctx.user.id, "checkout closed, cart cleared");
        Ok(())
    }

    async fn payment_method_form(&self, ctx: &CheckoutContext) -> Result<PaymentMethodForm> {
        Ok(PaymentMethodForm {
            saved_cards: self.vault.list_cards(Some(&ctx.user.id)).await?,
            current_card: ctx.session.payment_method().and_then(|p| p.card.clone()),
        })
    }
}

fn collected(session: &CheckoutSession) -> Result<(&CustomerData, &PaymentSelection)> {
    match (session.customer_data(), session.payment_method()) {
        (Some(customer), Some(payment)) => Ok((customer, payment)),
        _ => Err(CheckoutError::precondition("customer and payment data are missing")),
    }
}
