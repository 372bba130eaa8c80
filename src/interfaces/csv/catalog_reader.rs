use crate::domain::product::{Catalog, Product};
use crate::error::{CheckoutError, Result};
use std::io::Read;

/// Reads the product catalog from a CSV source.
///
/// Expects the header `id,name,description,price,image,category,stock`.
/// Whitespace around fields is trimmed. A row with a negative price or a
/// malformed field yields an error for that row only.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    /// Creates a new `CatalogReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes products.
    pub fn products(self) -> impl Iterator<Item = Result<Product>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }

    /// Reads every row, failing on the first bad one or on a duplicate id.
    pub fn into_catalog(self) -> Result<Catalog> {
        let mut products: Vec<Product> = Vec::new();
        for product in self.products() {
            let product = product?;
            if products.iter().any(|p| p.id == product.id) {
                return Err(CheckoutError::invalid(
                    "id",
                    format!("duplicate product id '{}'", product.id),
                ));
            }
            products.push(product);
        }
        Ok(Catalog::new(products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "id, name, description, price, image, category, stock";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\np1, Mouse, Wireless mouse, 79.90, /img/p1.png, peripherals, 3\n\
             p2, Cable, USB-C cable, 19.9, /img/p2.png, accessories, 0"
        );
        let reader = CatalogReader::new(data.as_bytes());
        let results: Vec<Result<Product>> = reader.products().collect();

        assert_eq!(results.len(), 2);
        let p1 = results[0].as_ref().unwrap();
        assert_eq!(p1.id, "p1");
        assert_eq!(p1.price.value(), dec!(79.90));
        assert_eq!(p1.stock, 3);
        assert!(!results[1].as_ref().unwrap().in_stock());
    }

    #[test]
    fn test_reader_negative_price_rejected() {
        let data = format!("{HEADER}\np1, Mouse, x, -1.00, /img, misc, 3");
        let reader = CatalogReader::new(data.as_bytes());
        let results: Vec<Result<Product>> = reader.products().collect();

        assert!(results[0].is_err());
    }

    #[test]
    fn test_reader_malformed_stock() {
        let data = format!("{HEADER}\np1, Mouse, x, 1.00, /img, misc, lots");
        let reader = CatalogReader::new(data.as_bytes());
        assert!(reader.products().next().unwrap().is_err());
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let data = format!("{HEADER}\np1, A, x, 1, /a, misc, 1\np1, B, y, 2, /b, misc, 1");
        let result = CatalogReader::new(data.as_bytes()).into_catalog();
        assert!(matches!(result, Err(CheckoutError::Validation(_))));
    }
}
