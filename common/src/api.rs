use crate::draft::ProductForm;
use crate::error::ApiError;
use crate::product::{Product, ProductId};
use crate::upload::ImageFile;

/// Collection endpoint, relative to the API base URL.
pub const PRODUCTS_PATH: &str = "/api/products";

pub fn product_path(id: &ProductId) -> String {
    format!("{PRODUCTS_PATH}/{}", id.0)
}

/// REST contract of the product backend.
#[allow(async_fn_in_trait)]
pub trait ProductApi {
    type File: ImageFile;

    /// `GET /api/products`
    async fn list(&self) -> Result<Vec<Product>, ApiError>;

    /// `POST /api/products` (multipart)
    async fn create(&self, form: ProductForm<Self::File>) -> Result<Product, ApiError>;

    /// `PUT /api/products/{id}` (multipart)
    async fn update(&self, id: &ProductId, form: ProductForm<Self::File>) -> Result<Product, ApiError>;

    /// `DELETE /api/products/{id}`
    async fn delete(&self, id: &ProductId) -> Result<(), ApiError>;
}

/// Supplies the identity provider's session token.
#[allow(async_fn_in_trait)]
pub trait TokenSource {
    /// `Ok(None)` when nobody is signed in.
    async fn token(&self) -> Result<Option<String>, String>;
}

/// `Authorization` header value, or `None` to send the request unauthenticated.
/// A failing token source is logged and treated like a signed-out session.
pub async fn authorization_header<T: TokenSource>(source: &T) -> Option<String> {
    match source.token().await {
        Ok(Some(token)) if !token.is_empty() => Some(format!("Bearer {token}")),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Error getting session token, sending unauthenticated: {e}");
            None
        }
    }
}
