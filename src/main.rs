use checkout_sim::application::storefront::Storefront;
use checkout_sim::config::{CheckoutConfig, DEFAULT_FAILURE_RATE, DEFAULT_RESULT_DISPLAY_DELAY};
use checkout_sim::domain::card::CardInput;
use checkout_sim::domain::customer::CustomerForm;
use checkout_sim::domain::ports::SharedStore;
use checkout_sim::domain::user::User;
use checkout_sim::infrastructure::in_memory::InMemoryStore;
use checkout_sim::interfaces::console::ConsoleProgress;
use checkout_sim::interfaces::csv::catalog_reader::CatalogReader;
use checkout_sim::logging;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Runs one simulated checkout", long_about = None)]
struct Cli {
    /// Product catalog CSV file
    catalog: PathBuf,

    /// Customer data JSON file
    #[arg(long)]
    customer: Option<PathBuf>,

    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,

    /// Register a new account with this name instead of signing in
    #[arg(long, value_name = "NAME")]
    register: Option<String>,

    /// Product to add to the cart, optionally with a quantity (`mug=2`)
    #[arg(long = "add", value_name = "ID[=QTY]", value_parser = parse_cart_line)]
    add: Vec<(String, Option<u32>)>,

    /// Payment method: pix, credit, debit, boleto, current-card or saved-<card id>
    #[arg(long)]
    method: Option<String>,

    #[arg(long, requires_all = ["card_expiry", "card_cvv", "card_holder"])]
    card_number: Option<String>,

    /// Card expiry, MM/YY
    #[arg(long)]
    card_expiry: Option<String>,

    #[arg(long)]
    card_cvv: Option<String>,

    #[arg(long)]
    card_holder: Option<String>,

    /// Keep the added card in the vault
    #[arg(long, requires = "card_number")]
    save_card: bool,

    /// Print the saved cards and exit
    #[arg(long)]
    list_cards: bool,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_FAILURE_RATE)]
    failure_rate: f64,

    /// 1.0 waits in real time, 0 does not wait at all
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    #[arg(long, default_value_t = DEFAULT_RESULT_DISPLAY_DELAY.as_millis() as u64)]
    display_delay_ms: u64,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn parse_cart_line(value: &str) -> std::result::Result<(String, Option<u32>), String> {
    match value.split_once('=') {
        Some((id, quantity)) => {
            let quantity = quantity
                .trim()
                .parse()
                .map_err(|_| format!("invalid quantity in '{value}'"))?;
            Ok((id.trim().to_string(), Some(quantity)))
        }
        None => Ok((value.trim().to_string(), None)),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<&Path>) -> Result<SharedStore> {
    use checkout_sim::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => Ok(Arc::new(RocksDBStore::open(path).into_diagnostic()?)),
        None => Ok(Arc::new(InMemoryStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<&Path>) -> Result<SharedStore> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(Arc::new(InMemoryStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let config = CheckoutConfig {
        failure_rate: cli.failure_rate,
        time_scale: cli.time_scale,
        result_display_delay: Duration::from_millis(cli.display_delay_ms),
    };
    let store = open_store(cli.db_path.as_deref())?;

    let file = File::open(&cli.catalog).into_diagnostic()?;
    let catalog = CatalogReader::new(file).into_catalog().into_diagnostic()?;
    let shop = Storefront::open(store, catalog, config).await.into_diagnostic()?;

    let user = sign_in(&shop, &cli).await?;

    if cli.list_cards {
        let cards = shop.vault().list_cards(Some(&user.id)).await.into_diagnostic()?;
        println!("{}", serde_json::to_string_pretty(&cards).into_diagnostic()?);
        return Ok(());
    }

    for (product_id, quantity) in &cli.add {
        shop.add_to_cart(product_id).await.into_diagnostic()?;
        if let Some(quantity) = *quantity {
            shop.cart().update_quantity(product_id, quantity).await.into_diagnostic()?;
            if shop.cart().quantity_of(product_id).await != Some(quantity) {
                warn!(product_id = %product_id, quantity, "quantity outside stock, kept previous quantity");
            }
        }
    }

    let customer_path = cli
        .customer
        .as_deref()
        .ok_or_else(|| miette::miette!("--customer is required to check out"))?;
    let form: CustomerForm =
        serde_json::from_reader(File::open(customer_path).into_diagnostic()?).into_diagnostic()?;

    let checkout = shop.checkout();
    let mut ctx = checkout.begin().await.into_diagnostic()?;
    checkout.submit_customer_data(&mut ctx, form).await.into_diagnostic()?;

    if let Some(number) = &cli.card_number {
        let input = CardInput {
            number: number.clone(),
            expiry: cli.card_expiry.clone().unwrap_or_default(),
            cvv: cli.card_cvv.clone().unwrap_or_default(),
            holder_name: cli.card_holder.clone().unwrap_or_default(),
        };
        let card = checkout.add_card(&mut ctx, input, cli.save_card).await.into_diagnostic()?;
        info!(card_id = %card.id, last4 = %card.last4, "card added");
    }

    checkout
        .submit_payment_method(&mut ctx, cli.method.as_deref())
        .await
        .into_diagnostic()?;
    let summary = checkout.review(&ctx).await.into_diagnostic()?;
    info!(total = %summary.total, payment = %summary.payment_label, "reviewing order");

    let result = checkout
        .confirm_review(&mut ctx, Arc::new(ConsoleProgress))
        .await
        .into_diagnostic()?;

    let order = ctx
        .session()
        .order_data()
        .ok_or_else(|| miette::miette!("checkout finished without an order"))?;
    let output = serde_json::json!({
        "customer": order.customer,
        "payment_method": order.payment.describe(),
        "items": order.items,
        "total": order.total,
        "payment": result,
    });
    println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);

    if result.success() {
        checkout.new_purchase(ctx).await.into_diagnostic()?;
    }
    Ok(())
}

async fn sign_in(shop: &Storefront, cli: &Cli) -> Result<User> {
    let identity = shop.identity();
    match &cli.register {
        Some(name) => identity
            .register(name, &cli.email, &cli.password)
            .await
            .into_diagnostic(),
        None => identity.login(&cli.email, &cli.password).await.into_diagnostic(),
    }
}
