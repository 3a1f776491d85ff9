pub mod api;
pub mod cache;
pub mod config;
pub mod controller;
pub mod draft;
pub mod error;
pub mod mock;
pub mod preview;
pub mod product;
pub mod stock;
pub mod toast;
pub mod upload;
pub mod user_sync;
