//! HTTP client for the product backend.
//!
//! Every request carries the identity provider's bearer token when one is
//! available and is sent with credentials, so the backend's session cookie
//! travels too.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use nexent_common::api::{authorization_header, product_path, ProductApi, TokenSource, PRODUCTS_PATH};
use nexent_common::config::DashboardConfig;
use nexent_common::draft::ProductForm;
use nexent_common::error::ApiError;
use nexent_common::product::{Product, ProductId};

use super::auth::ProviderSession;
use super::picked_file::PickedFile;

/// Request body.
#[allow(dead_code)] // Json and Form are only sent in WASM builds
enum Body<'a> {
    Empty,
    Json(String),
    Form(&'a ProductForm<PickedFile>),
}

/// Create/update responses come back either bare or wrapped.
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedProduct {
    Bare(Product),
    Wrapped { product: Product },
}

impl From<SavedProduct> for Product {
    fn from(saved: SavedProduct) -> Self {
        match saved {
            SavedProduct::Bare(p) | SavedProduct::Wrapped { product: p } => p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpProductApi<T = ProviderSession> {
    base_url: String,
    tokens: T,
}

impl<T: TokenSource> HttpProductApi<T> {
    pub fn new(config: &DashboardConfig, tokens: T) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            tokens,
        }
    }

    async fn send(&self, method: &str, path: &str, body: Body<'_>) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let authorization = authorization_header(&self.tokens).await;
        tracing::debug!("{method} {url}");
        send_request(&url, method, body, authorization.as_deref()).await
    }

    /// POST a JSON body to another endpoint on the same backend.
    pub async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let json = serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send("POST", path, Body::Json(json)).await.map(|_| ())
    }
}

fn decode<R: DeserializeOwned>(text: &str) -> Result<R, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

impl<T: TokenSource> ProductApi for HttpProductApi<T> {
    type File = PickedFile;

    async fn list(&self) -> Result<Vec<Product>, ApiError> {
        let text = self.send("GET", PRODUCTS_PATH, Body::Empty).await?;
        decode(&text)
    }

    async fn create(&self, form: ProductForm<PickedFile>) -> Result<Product, ApiError> {
        let text = self.send("POST", PRODUCTS_PATH, Body::Form(&form)).await?;
        decode::<SavedProduct>(&text).map(Product::from)
    }

    async fn update(&self, id: &ProductId, form: ProductForm<PickedFile>) -> Result<Product, ApiError> {
        let text = self.send("PUT", &product_path(id), Body::Form(&form)).await?;
        decode::<SavedProduct>(&text).map(Product::from)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), ApiError> {
        self.send("DELETE", &product_path(id), Body::Empty).await?;
        Ok(())
    }
}

// ─── HTTP helpers (WASM) ─────────────────────────────────────────────────────

#[cfg(target_family = "wasm")]
fn js_error(what: &str, e: wasm_bindgen::JsValue) -> ApiError {
    ApiError::Network(format!("{what}: {:?}", e))
}

#[cfg(target_family = "wasm")]
fn form_data(form: &ProductForm<PickedFile>) -> Result<web_sys::FormData, ApiError> {
    use nexent_common::upload::ImageFile;

    let data = web_sys::FormData::new().map_err(|e| js_error("Failed to create form", e))?;
    for (name, value) in &form.fields {
        data.append_with_str(name, value)
            .map_err(|e| js_error("Failed to append field", e))?;
    }
    for file in &form.images {
        data.append_with_blob_and_filename(
            ProductForm::<PickedFile>::IMAGE_FIELD,
            file.file(),
            file.name(),
        )
        .map_err(|e| js_error("Failed to append image", e))?;
    }
    Ok(data)
}

#[cfg(target_family = "wasm")]
async fn send_request(
    url: &str,
    method: &str,
    body: Body<'_>,
    authorization: Option<&str>,
) -> Result<String, ApiError> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    let opts = web_sys::RequestInit::new();
    opts.set_method(method);
    opts.set_mode(web_sys::RequestMode::Cors);
    opts.set_credentials(web_sys::RequestCredentials::Include);

    // Multipart bodies get their boundary header from the browser.
    let is_json = matches!(body, Body::Json(_));
    match body {
        Body::Empty => {}
        Body::Json(text) => opts.set_body(&JsValue::from_str(&text)),
        Body::Form(form) => opts.set_body(&form_data(form)?),
    }

    let request = web_sys::Request::new_with_str_and_init(url, &opts)
        .map_err(|e| js_error("Failed to create request", e))?;
    let headers = request.headers();
    if is_json {
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| js_error("Failed to set header", e))?;
    }
    if let Some(value) = authorization {
        headers
            .set("Authorization", value)
            .map_err(|e| js_error("Failed to set header", e))?;
    }

    let window = web_sys::window().ok_or_else(|| ApiError::Network("No window".to_string()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| js_error("Fetch failed", e))?;

    let resp: web_sys::Response = resp_value
        .dyn_into()
        .map_err(|_| ApiError::Network("Response is not a Response object".to_string()))?;

    let text = JsFuture::from(resp.text().map_err(|e| js_error("Failed to get text", e))?)
        .await
        .map_err(|e| js_error("Failed to read body", e))?;
    let text = text.as_string().unwrap_or_default();

    if !resp.ok() {
        return Err(ApiError::from_response(resp.status(), &text));
    }
    Ok(text)
}

// Non-WASM stub for type checking
#[cfg(not(target_family = "wasm"))]
async fn send_request(
    _url: &str,
    _method: &str,
    _body: Body<'_>,
    _authorization: Option<&str>,
) -> Result<String, ApiError> {
    Err(ApiError::Network("HTTP client only available in WASM".to_string()))
}
