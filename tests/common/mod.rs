#![allow(dead_code)]

use checkout_sim::application::storefront::Storefront;
use checkout_sim::config::CheckoutConfig;
use checkout_sim::domain::card::CardInput;
use checkout_sim::domain::customer::CustomerForm;
use checkout_sim::infrastructure::in_memory::InMemoryStore;
use checkout_sim::interfaces::csv::catalog_reader::CatalogReader;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

pub const CATALOG_FIXTURE: &str = "tests/fixtures/catalog.csv";
pub const CUSTOMER_FIXTURE: &str = "tests/fixtures/customer.json";

pub const EMAIL: &str = "maria@example.com";
pub const PASSWORD: &str = "s3cret!";

/// Writes a catalog CSV with `rows` products `p1..pN`, each priced 10.00
/// with a stock of 5.
pub fn generate_catalog(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["id", "name", "description", "price", "image", "category", "stock"])?;

    for i in 1..=rows {
        wtr.write_record(&[
            format!("p{i}"),
            format!("Product {i}"),
            "generated".to_string(),
            "10.00".to_string(),
            format!("/img/p{i}.png"),
            "misc".to_string(),
            "5".to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn customer_form() -> CustomerForm {
    CustomerForm {
        name: "Maria Souza".to_string(),
        email: EMAIL.to_string(),
        phone: "(11) 98765-4321".to_string(),
        cpf: "123.456.789-09".to_string(),
        address: "Rua das Flores, 100".to_string(),
        city: "Sao Paulo".to_string(),
        state: "SP".to_string(),
        zip_code: "01310-100".to_string(),
    }
}

pub fn card_input(number: &str) -> CardInput {
    CardInput {
        number: number.to_string(),
        expiry: "12/28".to_string(),
        cvv: "123".to_string(),
        holder_name: "MARIA SOUZA".to_string(),
    }
}

/// A storefront over the fixture catalog with no waiting.
pub async fn storefront(failure_rate: f64) -> Storefront {
    let catalog = CatalogReader::new(File::open(CATALOG_FIXTURE).unwrap())
        .into_catalog()
        .unwrap();
    let config = CheckoutConfig::instant().with_failure_rate(failure_rate);
    Storefront::open(Arc::new(InMemoryStore::new()), catalog, config)
        .await
        .unwrap()
}

/// Same as [`storefront`] with a signed-in shopper.
pub async fn signed_in_storefront(failure_rate: f64) -> Storefront {
    let shop = storefront(failure_rate).await;
    shop.identity()
        .register("Maria Souza", EMAIL, PASSWORD)
        .await
        .unwrap();
    shop
}
