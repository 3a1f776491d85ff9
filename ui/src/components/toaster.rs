use dioxus::prelude::*;

use nexent_common::toast::Toast;

/// How long a toast stays up, in milliseconds.
#[cfg_attr(not(target_family = "wasm"), allow(dead_code))]
const TOAST_MS: u32 = 3_000;

/// Top-right notification stack.
#[component]
pub fn Toaster(toasts: Vec<Toast>, on_dismiss: EventHandler<u64>) -> Element {
    rsx! {
        div { class: "toaster toaster-top-right",
            {toasts.into_iter().map(|toast| {
                let id = toast.id;
                rsx! { ToastItem { key: "{id}", toast, on_dismiss } }
            })}
        }
    }
}

#[component]
fn ToastItem(toast: Toast, on_dismiss: EventHandler<u64>) -> Element {
    let id = toast.id;

    // Auto-dismiss
    use_hook(move || {
        spawn(async move {
            #[cfg(target_family = "wasm")]
            gloo_timers::future::TimeoutFuture::new(TOAST_MS).await;
            #[cfg(not(target_family = "wasm"))]
            std::future::pending::<()>().await; // never runs on native
            on_dismiss.call(id);
        });
    });

    rsx! {
        div {
            class: toast.class(),
            onclick: move |_| on_dismiss.call(id),
            span { "{toast.message}" }
        }
    }
}
