//! In-memory stand-ins for the browser and the backend.
//!
//! Used by unit tests and the integration harness.

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::api::ProductApi;
use crate::draft::{DraftField, ProductForm};
use crate::error::ApiError;
use crate::preview::PreviewMinter;
use crate::product::{Price, Product, ProductId};
use crate::upload::ImageFile;

/// A picked file with no bytes behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

impl MemoryFile {
    pub fn new(name: &str, content_type: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            content_type: content_type.to_string(),
            size,
        }
    }

    /// A PNG of the given size.
    pub fn image(name: &str, size: u64) -> Self {
        Self::new(name, "image/png", size)
    }
}

impl ImageFile for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Record of every URL a [`CountingMinter`] handed out and took back.
#[derive(Debug, Default)]
pub struct MintLedger {
    pub minted: Vec<String>,
    pub released: Vec<String>,
    failing: HashSet<String>,
}

impl MintLedger {
    /// URLs minted but not yet released.
    pub fn outstanding(&self) -> usize {
        let released: HashSet<&String> = self.released.iter().collect();
        self.minted.iter().filter(|u| !released.contains(u)).count()
    }

    pub fn has_double_release(&self) -> bool {
        let mut seen = HashSet::new();
        !self.released.iter().all(|u| seen.insert(u))
    }

    pub fn release_count(&self, url: &str) -> usize {
        self.released.iter().filter(|u| *u == url).count()
    }
}

/// Preview minter that counts mints and releases.
///
/// Clones share one ledger, so a test can keep a handle after moving the
/// minter into a controller.
#[derive(Debug, Clone, Default)]
pub struct CountingMinter {
    ledger: Rc<RefCell<MintLedger>>,
}

impl CountingMinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> Ref<'_, MintLedger> {
        self.ledger.borrow()
    }

    /// Make minting fail for files with this name.
    pub fn fail_on(&mut self, name: &str) {
        self.ledger.borrow_mut().failing.insert(name.to_string());
    }
}

impl<F: ImageFile> PreviewMinter<F> for CountingMinter {
    fn mint(&mut self, file: &F) -> Result<String, String> {
        let mut ledger = self.ledger.borrow_mut();
        if ledger.failing.contains(file.name()) {
            return Err("object URL unavailable".into());
        }
        let url = format!("blob:mock/{}/{}", ledger.minted.len() + 1, file.name());
        ledger.minted.push(url.clone());
        Ok(url)
    }

    fn release(&mut self, url: &str) {
        self.ledger.borrow_mut().released.push(url.to_string());
    }
}

/// One request seen by a [`MemoryProductApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List,
    Create {
        fields: Vec<(String, String)>,
        uploaded: Vec<String>,
    },
    Update {
        id: ProductId,
        fields: Vec<(String, String)>,
        uploaded: Vec<String>,
    },
    Delete(ProductId),
}

#[derive(Debug, Default)]
struct Backend {
    products: Vec<Product>,
    calls: Vec<ApiCall>,
    next_id: u64,
    fail_next: Option<ApiError>,
}

/// Product API backed by a vector. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryProductApi {
    backend: Rc<RefCell<Backend>>,
}

impl MemoryProductApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::new();
        api.backend.borrow_mut().products = products;
        api
    }

    pub fn products(&self) -> Vec<Product> {
        self.backend.borrow().products.clone()
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.backend.borrow().calls.clone()
    }

    /// Fail the next request of any kind with `error`.
    pub fn fail_next(&self, error: ApiError) {
        self.backend.borrow_mut().fail_next = Some(error);
    }

    fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        let mut backend = self.backend.borrow_mut();
        backend.calls.push(call);
        match backend.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn bad_request(message: &str) -> ApiError {
        ApiError::Http {
            status: 400,
            message: Some(message.to_string()),
        }
    }

    fn not_found() -> ApiError {
        ApiError::Http {
            status: 404,
            message: Some("Product not found".into()),
        }
    }
}

fn owned_fields(form: &ProductForm<MemoryFile>) -> Vec<(String, String)> {
    form.fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn uploaded_names(form: &ProductForm<MemoryFile>) -> Vec<String> {
    form.images.iter().map(|f| f.name.clone()).collect()
}

fn image_urls(form: &ProductForm<MemoryFile>) -> Vec<String> {
    form.images
        .iter()
        .map(|f| format!("https://cdn.local/{}", f.name))
        .collect()
}

fn apply_fields(product: &mut Product, form: &ProductForm<MemoryFile>) -> Result<(), ApiError> {
    let text = |field: DraftField| form.field(field).unwrap_or_default().to_string();
    product.name = text(DraftField::Name);
    product.description = text(DraftField::Description);
    product.category = text(DraftField::Category);
    product.price = Price::parse(&text(DraftField::Price))
        .ok_or_else(|| MemoryProductApi::bad_request("Invalid price"))?;
    product.stock = text(DraftField::Stock)
        .parse()
        .map_err(|_| MemoryProductApi::bad_request("Invalid stock"))?;
    Ok(())
}

impl ProductApi for MemoryProductApi {
    type File = MemoryFile;

    async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.record(ApiCall::List)?;
        Ok(self.products())
    }

    async fn create(&self, form: ProductForm<MemoryFile>) -> Result<Product, ApiError> {
        self.record(ApiCall::Create {
            fields: owned_fields(&form),
            uploaded: uploaded_names(&form),
        })?;
        if form.images.is_empty() {
            return Err(Self::bad_request("At least one image is required"));
        }

        let mut backend = self.backend.borrow_mut();
        backend.next_id += 1;
        let mut product = Product {
            id: ProductId(format!("p-{}", backend.next_id)),
            name: String::new(),
            description: String::new(),
            category: String::new(),
            price: Price::default(),
            stock: 0,
            images: image_urls(&form),
            created_at: None,
            updated_at: None,
        };
        apply_fields(&mut product, &form)?;
        backend.products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: &ProductId, form: ProductForm<MemoryFile>) -> Result<Product, ApiError> {
        self.record(ApiCall::Update {
            id: id.clone(),
            fields: owned_fields(&form),
            uploaded: uploaded_names(&form),
        })?;

        let mut backend = self.backend.borrow_mut();
        let product = backend
            .products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(Self::not_found)?;
        let mut updated = product.clone();
        apply_fields(&mut updated, &form)?;
        if !form.images.is_empty() {
            updated.images = image_urls(&form);
        }
        *product = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), ApiError> {
        self.record(ApiCall::Delete(id.clone()))?;
        let mut backend = self.backend.borrow_mut();
        let before = backend.products.len();
        backend.products.retain(|p| &p.id != id);
        if backend.products.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }
}
