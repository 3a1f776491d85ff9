use dioxus::prelude::*;

use nexent_common::cache::{CacheHandle, QueryCache};
use nexent_common::config::DashboardConfig;
use nexent_common::product::Product;
use nexent_common::user_sync::UserSync;

pub type ProductCache = QueryCache<Vec<Product>>;

/// Server-state cache shared by every page.
///
/// Wraps the signal so the cache trait can be implemented on it; reads
/// subscribe the rendering component like any other signal read.
#[derive(Clone, Copy, PartialEq)]
pub struct SharedCache(pub Signal<ProductCache>);

impl CacheHandle<Vec<Product>> for SharedCache {
    fn with<R>(&self, f: impl FnOnce(&ProductCache) -> R) -> R {
        f(&self.0.read())
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut ProductCache) -> R) -> R {
        let mut signal = self.0;
        let mut cache = signal.write();
        f(&mut cache)
    }
}

pub fn use_product_cache() -> SharedCache {
    use_context::<SharedCache>()
}

pub fn use_dashboard_config() -> DashboardConfig {
    use_context::<DashboardConfig>()
}

pub fn use_user_sync_state() -> Signal<UserSync> {
    use_context::<Signal<UserSync>>()
}

/// Compile-time settings, with the backend URL optionally overridden by an
/// `?api=` query parameter.
pub fn load_config() -> DashboardConfig {
    let config = DashboardConfig::from_env();
    match api_override() {
        Some(url) => {
            tracing::info!("Using API base URL from query string: {url}");
            config.with_api_base_url(&url)
        }
        None => config,
    }
}

#[cfg(target_family = "wasm")]
fn api_override() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    web_sys::UrlSearchParams::new_with_str(&search)
        .ok()?
        .get("api")
        .filter(|url| !url.trim().is_empty())
}

#[cfg(not(target_family = "wasm"))]
fn api_override() -> Option<String> {
    None
}
