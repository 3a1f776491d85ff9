//! Bridge to the identity provider's browser SDK.
//!
//! The provider script installs a global `Clerk` object. Everything here reads
//! it through `js_sys::Reflect`; when the script has not loaded, the session
//! is treated as signed out.

use nexent_common::api::TokenSource;
use nexent_common::user_sync::Identity;

/// The provider's current browser session.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ProviderSession;

impl TokenSource for ProviderSession {
    async fn token(&self) -> Result<Option<String>, String> {
        session_token().await
    }
}

#[cfg(target_family = "wasm")]
mod wasm_impl {
    use js_sys::{Function, Promise, Reflect};
    use serde::Deserialize;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    use nexent_common::user_sync::Identity;

    #[derive(Deserialize)]
    struct EmailAddress {
        #[serde(rename = "emailAddress")]
        email_address: String,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ProviderUser {
        id: String,
        primary_email_address: Option<EmailAddress>,
        first_name: Option<String>,
        last_name: Option<String>,
        image_url: Option<String>,
    }

    /// Follow `path` from `window`, stopping at `undefined`/`null`.
    fn global(path: &[&str]) -> Option<JsValue> {
        let mut value: JsValue = web_sys::window()?.into();
        for key in path {
            value = Reflect::get(&value, &JsValue::from_str(key)).ok()?;
            if value.is_undefined() || value.is_null() {
                return None;
            }
        }
        Some(value)
    }

    fn method(target: &JsValue, name: &str) -> Result<Function, String> {
        Reflect::get(target, &JsValue::from_str(name))
            .map_err(|e| format!("{name}: {:?}", e))?
            .dyn_into::<Function>()
            .map_err(|_| format!("{name} is not a function"))
    }

    pub async fn session_token() -> Result<Option<String>, String> {
        let Some(session) = global(&["Clerk", "session"]) else {
            return Ok(None);
        };
        let result = method(&session, "getToken")?
            .call0(&session)
            .map_err(|e| format!("getToken threw: {:?}", e))?;
        let promise: Promise = result
            .dyn_into()
            .map_err(|_| "getToken did not return a promise".to_string())?;
        let token = JsFuture::from(promise)
            .await
            .map_err(|e| format!("getToken rejected: {:?}", e))?;
        Ok(token.as_string())
    }

    pub fn current_identity() -> Option<Identity> {
        let user = global(&["Clerk", "user"])?;
        match serde_wasm_bindgen::from_value::<ProviderUser>(user) {
            Ok(user) => Some(Identity {
                id: user.id,
                email: user.primary_email_address.map(|e| e.email_address),
                first_name: user.first_name,
                last_name: user.last_name,
                image_url: user.image_url,
            }),
            Err(e) => {
                tracing::warn!("Could not read signed-in user: {e}");
                None
            }
        }
    }

    pub fn open_sign_in() {
        let Some(clerk) = global(&["Clerk"]) else {
            tracing::warn!("Identity provider not loaded");
            return;
        };
        if let Err(e) = method(&clerk, "openSignIn").and_then(|f| {
            f.call0(&clerk).map_err(|e| format!("openSignIn threw: {:?}", e))
        }) {
            tracing::error!("{e}");
        }
    }
}

#[cfg(target_family = "wasm")]
use wasm_impl::session_token;

/// The signed-in user, or `None` when signed out.
#[cfg(target_family = "wasm")]
pub fn current_identity() -> Option<Identity> {
    wasm_impl::current_identity()
}

/// Show the provider's sign-in dialog.
#[cfg(target_family = "wasm")]
pub fn open_sign_in() {
    wasm_impl::open_sign_in()
}

// Non-WASM stubs for type checking
#[cfg(not(target_family = "wasm"))]
async fn session_token() -> Result<Option<String>, String> {
    Ok(None)
}

#[cfg(not(target_family = "wasm"))]
pub fn current_identity() -> Option<Identity> {
    None
}

#[cfg(not(target_family = "wasm"))]
pub fn open_sign_in() {}
