use nexent_common::mock::MemoryFile;
use nexent_common::product::{Price, Product, ProductId};

pub mod harness;

pub const KB: u64 = 1024;
pub const MB: u64 = 1024 * KB;

/// Route `tracing` output through the test writer. Safe to call from every test.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A PNG fixture of `kb` kilobytes.
pub fn png(name: &str, kb: u64) -> MemoryFile {
    MemoryFile::image(name, kb * KB)
}

/// Build a stored product as the backend would return it.
pub fn make_product(id: &str, name: &str, price_cents: u64, stock: u32) -> Product {
    let now = chrono::Utc::now();
    Product {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        description: format!("{name} for the workshop"),
        category: "Tools".to_string(),
        price: Price::from_cents(price_cents),
        stock,
        images: vec![format!("https://cdn.local/{id}.png")],
        created_at: Some(now),
        updated_at: Some(now),
    }
}

/// Decode a product list the way the backend serves it.
pub fn products_from_json(json: serde_json::Value) -> Vec<Product> {
    serde_json::from_value(json).unwrap_or_else(|e| panic!("Bad product fixture: {e}"))
}
