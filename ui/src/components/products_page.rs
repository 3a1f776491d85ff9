use dioxus::prelude::*;
use futures::StreamExt;

use nexent_common::cache::{QueryClient, QueryKey, ServerStateCache};
use nexent_common::controller::{MutationRequest, ProductsController, DELETE_PROMPT};
use nexent_common::draft::{DraftField, DraftFields};
use nexent_common::product::{Product, ProductId};
use nexent_common::stock::StockStatus;
use nexent_common::upload::MAX_IMAGES;

use super::auth::ProviderSession;
use super::object_urls::ObjectUrlMinter;
use super::picked_file::{picked_files, reset_picker, PickedFile};
use super::product_api::HttpProductApi;
use super::shared_state::{use_dashboard_config, use_product_cache, SharedCache};
use super::toaster::Toaster;

type Controller = ProductsController<PickedFile, ObjectUrlMinter>;
type Client = QueryClient<HttpProductApi<ProviderSession>, SharedCache>;

const IMAGE_INPUT_ID: &str = "product-images";

/// Work for the page coroutine. Each action runs as its own task, so
/// requests may overlap.
#[derive(Debug)]
enum PageAction {
    Refresh,
    Run(MutationRequest<PickedFile>),
}

async fn run_action(client: Client, mut controller: Signal<Controller>, action: PageAction) {
    match action {
        PageAction::Refresh => {
            if let Err(e) = client.fetch(QueryKey::Products).await {
                controller.write().fetch_failed(&e);
            }
        }
        PageAction::Run(request) => {
            let kind = request.kind();
            let report = client.mutate(request.mutation).await;
            controller.write().finish(request.session, kind, report);
        }
    }
}

/// What the modal needs to render, copied out of the controller.
#[derive(Clone, PartialEq)]
struct DraftView {
    fields: DraftFields,
    previews: Vec<String>,
    editing: bool,
    pending: usize,
}

#[derive(Clone, PartialEq)]
struct ProductRow {
    product: Product,
    status: StockStatus,
}

#[cfg(target_family = "wasm")]
fn confirm(prompt: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(prompt).ok())
        .unwrap_or(false)
}

#[cfg(not(target_family = "wasm"))]
fn confirm(_prompt: &str) -> bool {
    false
}

#[component]
pub fn ProductsPage() -> Element {
    let config = use_dashboard_config();
    let cache = use_product_cache();
    let mut controller = use_signal(|| Controller::new(ObjectUrlMinter, &config));
    let client: Client = use_hook(|| {
        QueryClient::new(HttpProductApi::new(&config, ProviderSession), cache)
    });

    let actions = use_coroutine(move |mut rx: UnboundedReceiver<PageAction>| {
        let client = client.clone();
        async move {
            while let Some(action) = rx.next().await {
                tracing::debug!("Products page action: {:?}", action);
                spawn(run_action(client.clone(), controller, action));
            }
        }
    });

    // Initial fetch
    use_effect(move || actions.send(PageAction::Refresh));

    // Release previews when navigating away.
    use_drop(move || {
        if let Ok(mut ctl) = controller.try_write() {
            ctl.close_modal();
        }
    });

    let state = cache.0.read();
    let loading = state.is_loading(QueryKey::Products);
    let products = state.data(QueryKey::Products).cloned().unwrap_or_default();
    drop(state);

    let ctl = controller.read();
    let rows: Vec<ProductRow> = products
        .into_iter()
        .map(|product| ProductRow {
            status: ctl.stock_status(&product),
            product,
        })
        .collect();
    let draft = ctl.draft().map(|d| DraftView {
        fields: d.fields().clone(),
        previews: d.previews().iter().map(|p| p.as_str().to_string()).collect(),
        editing: d.is_editing(),
        pending: d.pending_files().len(),
    });
    let toasts: Vec<_> = ctl.toasts().iter().cloned().collect();
    drop(ctl);

    rsx! {
        div { class: "products-page",
            Toaster {
                toasts,
                on_dismiss: move |id| controller.write().toasts_mut().dismiss(id),
            }

            div { class: "page-header",
                div {
                    h1 { "Products" }
                    p { class: "subtitle", "Manage your product inventory" }
                }
                button {
                    class: "btn btn-primary",
                    onclick: move |_| controller.write().open_create(),
                    "Add Product"
                }
            }

            if loading {
                div { class: "loading loading-spinner" }
            } else if rows.is_empty() {
                p { class: "empty-state", "No products yet." }
            } else {
                div { class: "product-list",
                    {rows.into_iter().map(|row| {
                        let pid = row.product.id.clone();
                        rsx! {
                            ProductCard {
                                key: "{pid}",
                                row,
                                on_edit: move |product: Product| controller.write().open_edit(&product),
                                on_delete: move |id: ProductId| {
                                    let mut prompt = confirm;
                                    let request = controller.write().request_delete(&id, &mut prompt);
                                    if let Some(request) = request {
                                        actions.send(PageAction::Run(request));
                                    }
                                },
                            }
                        }
                    })}
                }
            }

            if let Some(view) = draft {
                ProductModal {
                    view,
                    on_field: move |(field, value): (DraftField, String)| {
                        controller.write().set_field(field, value);
                    },
                    on_pick: move |_| {
                        let files = picked_files(IMAGE_INPUT_ID);
                        controller.write().select_images(files);
                        reset_picker(IMAGE_INPUT_ID);
                    },
                    on_submit: move |_| {
                        let request = controller.write().submit();
                        if let Some(request) = request {
                            actions.send(PageAction::Run(request));
                        }
                    },
                    on_close: move |_| {
                        controller.write().close_modal();
                    },
                }
            }
        }
    }
}

#[component]
fn ProductCard(
    row: ProductRow,
    on_edit: EventHandler<Product>,
    on_delete: EventHandler<ProductId>,
) -> Element {
    let ProductRow { product, status } = row;
    let cover = product.cover_image().unwrap_or_default().to_string();
    let updated = product
        .updated_at
        .map(|t| t.format("%d %b %Y").to_string());
    let id = product.id.clone();
    let edit_target = product.clone();

    rsx! {
        div { class: "card product-card",
            div { class: "card-body",
                img { class: "product-thumb", src: "{cover}", alt: "{product.name}" }
                div { class: "product-info",
                    h3 { "{product.name}" }
                    p { class: "category", "{product.category}" }
                    p { class: "price", "{product.price} | Stock: {product.stock}" }
                    div { class: "badge {status.badge_class()}", "{status}" }
                    if let Some(updated) = updated {
                        p { class: "updated", "Updated {updated}" }
                    }
                }
                div { class: "product-actions",
                    button {
                        class: "btn btn-ghost",
                        onclick: move |_| on_edit.call(edit_target.clone()),
                        "Edit"
                    }
                    button {
                        class: "btn btn-ghost text-error",
                        title: DELETE_PROMPT,
                        onclick: move |_| on_delete.call(id.clone()),
                        "Delete"
                    }
                }
            }
        }
    }
}

#[component]
fn ProductModal(
    view: DraftView,
    on_field: EventHandler<(DraftField, String)>,
    on_pick: EventHandler<()>,
    on_submit: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    let title = if view.editing { "Edit Product" } else { "Add Product" };
    let action = if view.editing { "Update" } else { "Create" };
    let image_hint = if view.editing && view.pending == 0 {
        "Current images are kept unless you choose new ones".to_string()
    } else {
        format!("Up to {MAX_IMAGES} images, 2MB each")
    };

    rsx! {
        div { class: "modal modal-open",
            div { class: "modal-box",
                div { class: "modal-header",
                    h3 { "{title}" }
                    button {
                        r#type: "button",
                        class: "btn btn-sm btn-circle",
                        onclick: move |_| on_close.call(()),
                        "✕"
                    }
                }
                form {
                    onsubmit: move |evt| {
                        evt.prevent_default();
                        on_submit.call(());
                    },
                    {DraftField::ALL.iter().map(|&field| {
                        let value = view.fields.get(field).to_string();
                        rsx! { FieldInput { key: "{field}", field, value, on_field } }
                    })}

                    input {
                        id: IMAGE_INPUT_ID,
                        class: "file-input",
                        r#type: "file",
                        accept: "image/*",
                        multiple: true,
                        onchange: move |_| on_pick.call(()),
                    }
                    p { class: "hint", "{image_hint}" }

                    if !view.previews.is_empty() {
                        div { class: "preview-grid",
                            {view.previews.iter().enumerate().map(|(i, src)| rsx! {
                                img { key: "{i}", class: "preview", src: "{src}", alt: "preview" }
                            })}
                        }
                    }

                    div { class: "modal-action",
                        button {
                            r#type: "button",
                            class: "btn",
                            onclick: move |_| on_close.call(()),
                            "Cancel"
                        }
                        button { r#type: "submit", class: "btn btn-primary", "{action}" }
                    }
                }
            }
        }
    }
}

#[component]
fn FieldInput(field: DraftField, value: String, on_field: EventHandler<(DraftField, String)>) -> Element {
    let placeholder = field.placeholder();
    match field {
        DraftField::Description => rsx! {
            textarea {
                class: "textarea",
                placeholder,
                value: "{value}",
                oninput: move |evt| on_field.call((field, evt.value())),
            }
        },
        DraftField::Price | DraftField::Stock => {
            let step = if field == DraftField::Price { "0.01" } else { "1" };
            rsx! {
                input {
                    class: "input",
                    r#type: "number",
                    min: "0",
                    step,
                    placeholder,
                    value: "{value}",
                    oninput: move |evt| on_field.call((field, evt.value())),
                }
            }
        }
        DraftField::Name | DraftField::Category => rsx! {
            input {
                class: "input",
                r#type: "text",
                placeholder,
                value: "{value}",
                oninput: move |evt| on_field.call((field, evt.value())),
            }
        },
    }
}
