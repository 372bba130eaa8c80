mod common;

use checkout_sim::application::checkout::CheckoutStep;
use checkout_sim::domain::customer::CustomerForm;
use checkout_sim::domain::payment::{PaymentMethodId, PaymentStatus};
use checkout_sim::domain::ports::{NoProgress, PhaseUpdate, ProgressObserver};
use checkout_sim::domain::session::{StepKind, StepStatus};
use checkout_sim::error::CheckoutError;
use common::{card_input, customer_form, signed_in_storefront, storefront};
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Labels(Mutex<Vec<&'static str>>);

impl ProgressObserver for Labels {
    fn on_phase(&self, update: &PhaseUpdate) {
        self.0.lock().unwrap().push(update.label);
    }
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let shop = signed_in_storefront(0.0).await;

    let started = shop.checkout().begin().await;
    assert!(matches!(started, Err(CheckoutError::StepPrecondition(_))));
}

#[tokio::test]
async fn test_anonymous_shopper_cannot_check_out() {
    let shop = storefront(0.0).await;
    shop.add_to_cart("mug").await.unwrap();

    let started = shop.checkout().begin().await;
    assert!(matches!(started, Err(CheckoutError::StepPrecondition(_))));
}

#[tokio::test]
async fn test_cart_emptied_before_confirmation_blocks_processing() {
    let shop = signed_in_storefront(0.0).await;
    shop.add_to_cart("mug").await.unwrap();
    let checkout = shop.checkout();
    let mut ctx = checkout.begin().await.unwrap();
    checkout.submit_customer_data(&mut ctx, customer_form()).await.unwrap();
    checkout.submit_payment_method(&mut ctx, Some("pix")).await.unwrap();

    shop.cart().remove_item("mug").await.unwrap();
    let confirmed = checkout.confirm_review(&mut ctx, Arc::new(NoProgress)).await;

    assert!(matches!(confirmed, Err(CheckoutError::StepPrecondition(_))));
    assert_eq!(ctx.step_kind(), StepKind::Review);
    assert!(ctx.session().order_data().is_none());
}

#[tokio::test]
async fn test_double_add_is_noop() {
    let shop = storefront(0.0).await;

    assert!(shop.add_to_cart("mug").await.unwrap());
    assert!(!shop.add_to_cart("mug").await.unwrap());

    assert_eq!(shop.cart().total_item_count().await, 1);
    assert_eq!(shop.cart().total_price().await.value(), dec!(35.90));
}

#[tokio::test]
async fn test_quantity_outside_stock_is_ignored() {
    let shop = storefront(0.0).await;
    shop.add_to_cart("tee").await.unwrap();

    assert!(shop.cart().update_quantity("tee", 2).await.unwrap());
    assert!(!shop.cart().update_quantity("tee", 3).await.unwrap());
    assert!(!shop.cart().update_quantity("tee", 0).await.unwrap());

    assert_eq!(shop.cart().quantity_of("tee").await, Some(2));
    assert_eq!(shop.cart().total_price().await.value(), dec!(118.00));
}

#[tokio::test]
async fn test_pix_needs_no_card() {
    let shop = signed_in_storefront(0.0).await;
    shop.add_to_cart("mug").await.unwrap();
    let checkout = shop.checkout();
    let mut ctx = checkout.begin().await.unwrap();
    checkout.submit_customer_data(&mut ctx, customer_form()).await.unwrap();

    checkout.submit_payment_method(&mut ctx, Some("pix")).await.unwrap();

    assert_eq!(ctx.step_kind(), StepKind::Review);
    let payment = ctx.session().payment_method().unwrap();
    assert_eq!(payment.method, PaymentMethodId::Pix);
    assert!(payment.card.is_none());
}

#[tokio::test]
async fn test_credit_without_card_is_blocked() {
    let shop = signed_in_storefront(0.0).await;
    shop.add_to_cart("mug").await.unwrap();
    let checkout = shop.checkout();
    let mut ctx = checkout.begin().await.unwrap();
    checkout.submit_customer_data(&mut ctx, customer_form()).await.unwrap();

    let submitted = checkout.submit_payment_method(&mut ctx, Some("credit")).await;

    assert!(matches!(submitted, Err(CheckoutError::StepPrecondition(_))));
    assert_eq!(ctx.step_kind(), StepKind::PaymentMethod);
    assert!(ctx.session().payment_method().is_none());

    checkout.add_card(&mut ctx, card_input("4111 1111 1111 1234"), false).await.unwrap();
    checkout.submit_payment_method(&mut ctx, Some("credit")).await.unwrap();
    assert_eq!(ctx.step_kind(), StepKind::Review);
}

#[tokio::test]
async fn test_failed_payment_retry_resets_everything() {
    let shop = signed_in_storefront(1.0).await;
    shop.add_to_cart("mug").await.unwrap();
    let checkout = shop.checkout();
    let mut ctx = checkout.begin().await.unwrap();
    checkout.submit_customer_data(&mut ctx, customer_form()).await.unwrap();
    checkout.submit_payment_method(&mut ctx, Some("boleto")).await.unwrap();

    let result = checkout.confirm_review(&mut ctx, Arc::new(NoProgress)).await.unwrap();

    assert!(!result.success());
    assert_eq!(result.status(), PaymentStatus::Failed);
    assert_eq!(ctx.step_kind(), StepKind::Result);
    assert_eq!(ctx.session().payment_result(), Some(&result));

    checkout.retry(&mut ctx).unwrap();

    assert_eq!(ctx.step_kind(), StepKind::CustomerData);
    assert!(ctx.session().is_empty());
    match ctx.step() {
        CheckoutStep::CustomerData(form) => {
            assert_eq!(form.email, common::EMAIL);
            assert!(form.cpf.is_empty());
        }
        other => panic!("unexpected step {other:?}"),
    }
    assert!(!shop.cart().is_empty().await);
}

#[tokio::test]
async fn test_paid_order_settles_and_new_purchase_clears_cart() {
    let shop = signed_in_storefront(0.0).await;
    shop.add_to_cart("mug").await.unwrap();
    shop.cart().update_quantity("mug", 2).await.unwrap();
    let checkout = shop.checkout();
    let mut ctx = checkout.begin().await.unwrap();
    checkout.submit_customer_data(&mut ctx, customer_form()).await.unwrap();
    checkout.submit_payment_method(&mut ctx, Some("pix")).await.unwrap();

    let labels = Arc::new(Labels::default());
    let result = checkout.confirm_review(&mut ctx, labels.clone()).await.unwrap();

    assert!(result.success());
    assert_eq!(result.processing_time(), 2000);
    assert_eq!(
        *labels.0.lock().unwrap(),
        ["Validating data", "Generating QR code", "Awaiting payment", "Confirming payment"]
    );

    let order = ctx.session().order_data().unwrap();
    assert_eq!(order.total.value(), dec!(71.80));
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.status, Some(PaymentStatus::Paid));
    assert_eq!(order.transaction_id.as_deref(), Some(result.transaction_id()));
    assert!(ctx.progress().iter().all(|(step, status)| {
        *status == if *step == StepKind::Result { StepStatus::Current } else { StepStatus::Completed }
    }));

    checkout.new_purchase(ctx).await.unwrap();
    assert!(shop.cart().is_empty().await);
}

#[tokio::test]
async fn test_order_snapshot_ignores_later_cart_changes() {
    let shop = signed_in_storefront(1.0).await;
    shop.add_to_cart("mug").await.unwrap();
    let checkout = shop.checkout();
    let mut ctx = checkout.begin().await.unwrap();
    checkout.submit_customer_data(&mut ctx, customer_form()).await.unwrap();
    checkout.submit_payment_method(&mut ctx, Some("pix")).await.unwrap();
    checkout.confirm_review(&mut ctx, Arc::new(NoProgress)).await.unwrap();

    shop.add_to_cart("tee").await.unwrap();
    shop.cart().update_quantity("mug", 4).await.unwrap();

    let order = ctx.session().order_data().unwrap();
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 1);
    assert_eq!(order.total.value(), dec!(35.90));
}

#[tokio::test]
async fn test_back_keeps_data_and_resubmit_overwrites() {
    let shop = signed_in_storefront(0.0).await;
    shop.add_to_cart("mug").await.unwrap();
    let checkout = shop.checkout();
    let mut ctx = checkout.begin().await.unwrap();
    checkout.submit_customer_data(&mut ctx, customer_form()).await.unwrap();
    checkout.submit_payment_method(&mut ctx, Some("pix")).await.unwrap();

    checkout.back(&mut ctx).await.unwrap();
    checkout.back(&mut ctx).await.unwrap();
    assert!(checkout.back(&mut ctx).await.is_err());

    assert_eq!(ctx.step_kind(), StepKind::CustomerData);
    assert_eq!(ctx.session().customer_data().unwrap().city, "Sao Paulo");
    assert_eq!(ctx.session().payment_method().unwrap().method, PaymentMethodId::Pix);
    match ctx.step() {
        CheckoutStep::CustomerData(form) => assert_eq!(form.cpf, "123.456.789-09"),
        other => panic!("unexpected step {other:?}"),
    }

    let moved = CustomerForm {
        city: "Campinas".to_string(),
        ..customer_form()
    };
    checkout.submit_customer_data(&mut ctx, moved).await.unwrap();
    assert_eq!(ctx.session().customer_data().unwrap().city, "Campinas");
    assert_eq!(ctx.session().payment_method().unwrap().method, PaymentMethodId::Pix);
}

#[tokio::test]
async fn test_saved_card_offered_in_next_checkout() {
    let shop = signed_in_storefront(0.0).await;
    shop.add_to_cart("mug").await.unwrap();
    let checkout = shop.checkout();

    let mut first = checkout.begin().await.unwrap();
    checkout.submit_customer_data(&mut first, customer_form()).await.unwrap();
    let card = checkout
        .add_card(&mut first, card_input("5500 0000 0000 9876"), true)
        .await
        .unwrap();
    drop(first);

    let mut second = checkout.begin().await.unwrap();
    checkout.submit_customer_data(&mut second, customer_form()).await.unwrap();
    let saved = PaymentMethodId::Saved(card.id.clone());
    assert!(second.payment_options().iter().any(|o| o.method == saved));

    checkout
        .submit_payment_method(&mut second, Some(&format!("saved-{}", card.id)))
        .await
        .unwrap();
    let summary = checkout.review(&second).await.unwrap();
    assert_eq!(summary.payment_label, "Saved card ending in 9876");
}
