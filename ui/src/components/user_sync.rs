use dioxus::prelude::*;

use nexent_common::user_sync::{SyncPayload, USER_SYNC_PATH};

use super::auth::{current_identity, ProviderSession};
use super::product_api::HttpProductApi;
use super::shared_state::{use_dashboard_config, use_user_sync_state};

/// How often the provider session is checked for sign-in changes, in ms.
#[cfg_attr(not(target_family = "wasm"), allow(dead_code))]
const SESSION_POLL_MS: u32 = 2_000;

/// Copy the signed-in user to the backend once per session.
///
/// Polls the identity provider; each sync request runs as its own detached
/// task and never blocks rendering.
pub fn use_user_sync() {
    let config = use_dashboard_config();
    let mut sync = use_user_sync_state();

    let client = HttpProductApi::new(&config, ProviderSession);
    let _session_poll = use_coroutine(move |_rx: UnboundedReceiver<()>| {
        let client = client.clone();
        async move {
            loop {
                let identity = current_identity();
                if identity.is_none() && !sync.read().is_idle() {
                    tracing::debug!("Signed out, resetting user sync");
                    sync.write().reset();
                }
                let payload = sync.write().begin(identity.as_ref());
                if let Some(payload) = payload {
                    let client = client.clone();
                    spawn(async move {
                        let ok = post_sync(&client, &payload).await;
                        sync.write().finish(&payload.clerk_user_id, ok);
                    });
                }

                #[cfg(target_family = "wasm")]
                gloo_timers::future::TimeoutFuture::new(SESSION_POLL_MS).await;
                #[cfg(not(target_family = "wasm"))]
                std::future::pending::<()>().await; // never runs on native
            }
        }
    });
}

async fn post_sync(client: &HttpProductApi, payload: &SyncPayload) -> bool {
    tracing::info!("Syncing user {} to backend", payload.clerk_user_id);
    match client.post_json(USER_SYNC_PATH, payload).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Failed to sync user: {e}");
            false
        }
    }
}
