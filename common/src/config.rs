use serde::{Deserialize, Serialize};

use crate::stock::{StockPolicy, DEFAULT_LOW_STOCK_THRESHOLD};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Dashboard settings.
///
/// The web bundle has no process environment, so [`DashboardConfig::from_env`]
/// reads variables captured at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub low_stock_threshold: u32,
    /// Toast when the product list fails to load (otherwise only logged).
    pub report_fetch_errors: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            report_fetch_errors: true,
        }
    }
}

impl DashboardConfig {
    /// Build from `NEXENT_API_URL`, `NEXENT_LOW_STOCK_THRESHOLD` and
    /// `NEXENT_REPORT_FETCH_ERRORS` as set when the crate was compiled.
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("NEXENT_API_URL"),
            option_env!("NEXENT_LOW_STOCK_THRESHOLD"),
            option_env!("NEXENT_REPORT_FETCH_ERRORS"),
        )
    }

    /// Unset, empty or unparsable values fall back to the defaults.
    pub fn from_values(
        api_base_url: Option<&str>,
        low_stock_threshold: Option<&str>,
        report_fetch_errors: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        let api_base_url = api_base_url
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        let low_stock_threshold = match low_stock_threshold.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid low stock threshold {raw:?}");
                defaults.low_stock_threshold
            }),
            _ => defaults.low_stock_threshold,
        };
        let report_fetch_errors = report_fetch_errors
            .and_then(parse_flag)
            .unwrap_or(defaults.report_fetch_errors);

        Self {
            api_base_url,
            low_stock_threshold,
            report_fetch_errors,
        }
    }

    /// Same config pointed at another backend (e.g. from a `?api=` parameter).
    pub fn with_api_base_url(mut self, url: &str) -> Self {
        let url = url.trim().trim_end_matches('/');
        if !url.is_empty() {
            self.api_base_url = url.to_string();
        }
        self
    }

    pub fn stock_policy(&self) -> StockPolicy {
        StockPolicy::new(self.low_stock_threshold)
    }

    /// Absolute URL for an API path such as `/api/products`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
