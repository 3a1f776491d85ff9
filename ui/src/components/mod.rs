pub mod app;
pub mod auth;
pub mod object_urls;
pub mod picked_file;
pub mod product_api;
pub mod products_page;
pub mod shared_state;
pub mod toaster;
pub mod user_sync;
