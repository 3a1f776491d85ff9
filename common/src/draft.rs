use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DraftError;
use crate::preview::{PreviewMinter, PreviewSet, PreviewUrl};
use crate::product::{Price, Product, ProductId};
use crate::upload::{validate_batch, ImageFile};

/// The editable scalar fields of a product form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DraftField {
    Name,
    Description,
    Category,
    Price,
    Stock,
}

impl DraftField {
    /// Multipart order.
    pub const ALL: [DraftField; 5] = [
        DraftField::Name,
        DraftField::Description,
        DraftField::Category,
        DraftField::Price,
        DraftField::Stock,
    ];

    /// Multipart field name.
    pub fn form_name(self) -> &'static str {
        match self {
            DraftField::Name => "name",
            DraftField::Description => "description",
            DraftField::Category => "category",
            DraftField::Price => "price",
            DraftField::Stock => "stock",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            DraftField::Name => "Product Name",
            DraftField::Description => "Description",
            DraftField::Category => "Category",
            DraftField::Price => "Price",
            DraftField::Stock => "Stock",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_name())
    }
}

/// Raw text of the form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftFields {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub stock: String,
}

impl DraftFields {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Description => &self.description,
            DraftField::Category => &self.category,
            DraftField::Price => &self.price,
            DraftField::Stock => &self.stock,
        }
    }

    fn slot(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Name => &mut self.name,
            DraftField::Description => &mut self.description,
            DraftField::Category => &mut self.category,
            DraftField::Price => &mut self.price,
            DraftField::Stock => &mut self.stock,
        }
    }
}

/// Multipart payload for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductForm<F> {
    /// Scalar fields in [`DraftField::ALL`] order.
    pub fields: Vec<(&'static str, String)>,
    /// Sent as repeated `images` parts; empty keeps the stored images.
    pub images: Vec<F>,
}

impl<F> ProductForm<F> {
    pub const IMAGE_FIELD: &'static str = "images";

    pub fn field(&self, field: DraftField) -> Option<&str> {
        let name = field.form_name();
        self.fields
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Unsaved state of the product modal.
///
/// A Draft owns the ephemeral preview URLs of its pending files. They are
/// given back through [`Draft::discard`] or replaced by
/// [`Draft::replace_images`]; dropping a Draft without either leaks them.
#[derive(Debug, PartialEq)]
pub struct Draft<F> {
    session: u64,
    fields: DraftFields,
    pending_files: Vec<F>,
    previews: PreviewSet,
    editing: Option<ProductId>,
}

impl<F: ImageFile> Draft<F> {
    /// Empty Draft for creating a product.
    pub fn create(session: u64) -> Self {
        Self {
            session,
            fields: DraftFields::default(),
            pending_files: Vec::new(),
            previews: PreviewSet::new(),
            editing: None,
        }
    }

    /// Draft pre-filled from an existing product, previewing its stored images.
    pub fn edit(session: u64, product: &Product) -> Self {
        Self {
            session,
            fields: DraftFields {
                name: product.name.clone(),
                description: product.description.clone(),
                category: product.category.clone(),
                price: product.price.to_input_text(),
                stock: product.stock.to_string(),
            },
            pending_files: Vec::new(),
            previews: PreviewSet::persisted(product.images.iter().cloned()),
            editing: Some(product.id.clone()),
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn editing_target(&self) -> Option<&ProductId> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn fields(&self) -> &DraftFields {
        &self.fields
    }

    pub fn field(&self, field: DraftField) -> &str {
        self.fields.get(field)
    }

    pub fn pending_files(&self) -> &[F] {
        &self.pending_files
    }

    pub fn previews(&self) -> &[PreviewUrl] {
        self.previews.urls()
    }

    /// Same Draft with one field replaced.
    pub fn with_field(mut self, field: DraftField, value: impl Into<String>) -> Self {
        *self.fields.slot(field) = value.into();
        self
    }

    /// Swap in a new picker batch. On error nothing changes.
    pub fn replace_images<M: PreviewMinter<F>>(
        &mut self,
        files: Vec<F>,
        minter: &mut M,
    ) -> Result<(), DraftError> {
        validate_batch(&files)?;
        let fresh = PreviewSet::mint_batch(&files, minter).map_err(|e| {
            tracing::warn!("Could not mint preview URLs: {e}");
            DraftError::PreviewUnavailable
        })?;

        let released = self.previews.release(minter);
        tracing::debug!(
            "Draft {}: released {released} previews, minted {}",
            self.session,
            fresh.len()
        );
        self.previews = fresh;
        self.pending_files = files;
        Ok(())
    }

    /// Release every ephemeral URL. Returns how many were released.
    pub fn discard<M: PreviewMinter<F>>(mut self, minter: &mut M) -> usize {
        self.previews.release(minter)
    }

    /// Check the Draft and build the multipart payload.
    pub fn to_form(&self) -> Result<ProductForm<F>, DraftError> {
        if self.editing.is_none() && self.previews.is_empty() {
            return Err(DraftError::MissingImages);
        }
        for field in [DraftField::Name, DraftField::Description, DraftField::Category] {
            if self.field(field).trim().is_empty() {
                return Err(DraftError::MissingField(field));
            }
        }
        let price = self.fields.price.trim();
        if Price::parse(price).is_none() {
            return Err(DraftError::InvalidPrice);
        }
        let stock = self.fields.stock.trim();
        if stock.is_empty() || !stock.bytes().all(|b| b.is_ascii_digit()) || stock.parse::<u32>().is_err() {
            return Err(DraftError::InvalidStock);
        }

        let fields = DraftField::ALL
            .iter()
            .map(|&f| (f.form_name(), self.field(f).trim().to_string()))
            .collect();
        Ok(ProductForm {
            fields,
            images: self.pending_files.clone(),
        })
    }
}
