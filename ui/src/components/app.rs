use dioxus::prelude::*;

use nexent_common::cache::QueryCache;
use nexent_common::user_sync::UserSync;

use super::auth::{current_identity, open_sign_in};
use super::products_page::ProductsPage;
use super::shared_state::{load_config, use_user_sync_state, SharedCache};
use super::user_sync::use_user_sync;

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[layout(AppLayout)]
    #[route("/")]
    Home {},
    #[route("/products")]
    Products {},
}

#[component]
pub fn App() -> Element {
    let config = use_context_provider(load_config);
    tracing::debug!("Dashboard config: {:?}", config);
    use_context_provider(|| SharedCache(Signal::new(QueryCache::new())));
    use_context_provider(|| Signal::new(UserSync::new()));
    use_user_sync();

    rsx! { Router::<Route> {} }
}

#[component]
fn AppLayout() -> Element {
    let nav = use_navigator();
    let sync = use_user_sync_state();
    let synced = sync.read().is_synced();
    let user_label = current_identity().map(|user| user.email.unwrap_or(user.id));

    rsx! {
        div { class: "nexent-app",
            header { class: "app-header",
                h1 { "Nexent Admin" }
                nav {
                    button {
                        onclick: move |_| { nav.push(Route::Home {}); },
                        "Home"
                    }
                    button {
                        onclick: move |_| { nav.push(Route::Products {}); },
                        "Products"
                    }
                }
                div { class: "user-info",
                    if let Some(label) = user_label {
                        span { class: "user-email", "{label}" }
                        if synced {
                            span { class: "sync-status", title: "Synced to database", " ✓" }
                        }
                    } else {
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| open_sign_in(),
                            "Sign in"
                        }
                    }
                }
            }
            main {
                Outlet::<Route> {}
            }
        }
    }
}

/// Route component: landing page with the session and sync status.
#[component]
fn Home() -> Element {
    let synced = use_user_sync_state().read().is_synced();
    let signed_in = current_identity().is_some();

    rsx! {
        div { class: "home",
            h1 { "Welcome to Nexent" }
            if signed_in {
                p { "You are signed in!" }
                if synced {
                    p { class: "synced", "Synced to database" }
                }
            } else {
                p { "Please sign in to continue." }
            }
        }
    }
}

/// Route component: renders the product catalog.
#[component]
fn Products() -> Element {
    rsx! { ProductsPage {} }
}
