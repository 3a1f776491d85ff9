use futures::executor::block_on;
use serde_json::json;

use nexent_common::config::DashboardConfig;
use nexent_common::controller::{ModalState, DELETE_PROMPT, FETCH_FAILED};
use nexent_common::draft::DraftField;
use nexent_common::error::ApiError;
use nexent_common::mock::{ApiCall, MemoryFile};
use nexent_common::product::{Price, ProductId};
use nexent_common::stock::StockStatus;
use nexent_dashboard_integration::harness::Dashboard;
use nexent_dashboard_integration::{make_product, png, products_from_json, MB};

/// Creating a product sends one multipart request, closes the modal and
/// shows the new row after the refetch.
#[test]
fn create_product_appears_out_of_stock() {
    block_on(async {
        let mut d = Dashboard::mount(Vec::new()).await;
        assert!(d.products().is_empty());

        d.controller.open_create();
        d.fill("Widget", "A blue widget", "Tools", "9.99", "0");
        assert!(d.pick(vec![png("widget.png", 100)]));
        assert!(d.submit().await);

        assert_eq!(d.last_toast().as_deref(), Some("Product created successfully!"));
        assert_eq!(d.modal(), ModalState::Closed);
        assert_eq!(d.outstanding_previews(), 0);

        let rows = d.products();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Widget");
        assert_eq!(rows[0].price, Price::from_cents(999));
        assert_eq!(rows[0].price.to_string(), "$9.99");
        assert_eq!(d.badges(), vec![("Widget".to_string(), StockStatus::OutOfStock)]);
        assert_eq!(StockStatus::OutOfStock.label(), "Out of Stock");

        let calls = d.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], ApiCall::List);
        match &calls[1] {
            ApiCall::Create { fields, uploaded } => {
                let names: Vec<_> = fields.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(names, ["name", "description", "category", "price", "stock"]);
                assert!(fields.contains(&("price".to_string(), "9.99".to_string())));
                assert_eq!(uploaded, &vec!["widget.png".to_string()]);
            }
            other => panic!("expected create, got {other:?}"),
        }
        assert_eq!(calls[2], ApiCall::List);
    });
}

/// Editing stock without picking files keeps the stored images.
#[test]
fn edit_stock_without_new_images() {
    block_on(async {
        let mut d = Dashboard::mount(vec![make_product("p-1", "Widget", 999, 0)]).await;
        let widget = d.product("p-1").unwrap();

        d.controller.open_edit(&widget);
        assert_eq!(d.modal(), ModalState::Edit(ProductId("p-1".into())));
        let draft = d.controller.draft().unwrap();
        assert_eq!(draft.previews().len(), 1);
        assert!(!draft.previews()[0].is_ephemeral());

        d.controller.set_field(DraftField::Stock, "5");
        assert!(d.submit().await);

        assert_eq!(d.last_toast().as_deref(), Some("Product updated successfully!"));
        match &d.calls()[1] {
            ApiCall::Update { id, uploaded, .. } => {
                assert_eq!(id, &ProductId("p-1".into()));
                assert!(uploaded.is_empty());
            }
            other => panic!("expected update, got {other:?}"),
        }
        let updated = d.product("p-1").unwrap();
        assert_eq!(updated.stock, 5);
        assert_eq!(updated.images, widget.images);
        assert_eq!(d.badges(), vec![("Widget".to_string(), StockStatus::LowStock)]);
    });
}

/// The low stock badge follows the configured threshold.
#[test]
fn low_stock_threshold_is_configurable() {
    block_on(async {
        let config = DashboardConfig {
            low_stock_threshold: 5,
            ..DashboardConfig::default()
        };
        let products = vec![
            make_product("p-1", "Hammer", 1500, 5),
            make_product("p-2", "Saw", 2500, 4),
            make_product("p-3", "Drill", 9900, 0),
        ];
        let d = Dashboard::mount_with(config, products).await;
        assert_eq!(
            d.badges(),
            vec![
                ("Hammer".to_string(), StockStatus::InStock),
                ("Saw".to_string(), StockStatus::LowStock),
                ("Drill".to_string(), StockStatus::OutOfStock),
            ]
        );
    });
}

/// Declining the prompt sends nothing and leaves the row in place.
#[test]
fn declined_delete_sends_nothing() {
    block_on(async {
        let mut d = Dashboard::mount(vec![make_product("p-1", "Widget", 999, 3)]).await;
        assert!(!d.delete("p-1", false).await);
        assert_eq!(d.calls(), vec![ApiCall::List]);
        assert_eq!(d.products().len(), 1);
        assert!(d.toasts().is_empty());
    });
}

#[test]
fn confirmed_delete_removes_row() {
    block_on(async {
        let mut d = Dashboard::mount(vec![
            make_product("p-1", "Widget", 999, 3),
            make_product("p-2", "Gadget", 450, 30),
        ])
        .await;
        assert!(d.delete("p-1", true).await);
        assert_eq!(d.last_toast().as_deref(), Some("Product deleted successfully!"));
        assert_eq!(
            d.products().iter().map(|p| p.id.0.as_str()).collect::<Vec<_>>(),
            ["p-2"]
        );
        assert_eq!(DELETE_PROMPT, "Are you sure you want to delete this product?");
    });
}

#[test]
fn delete_failure_shows_generic_message() {
    block_on(async {
        let mut d = Dashboard::mount(vec![make_product("p-1", "Widget", 999, 3)]).await;
        d.backend.fail_next(ApiError::Http {
            status: 500,
            message: Some("database offline".into()),
        });
        assert!(d.delete("p-1", true).await);
        assert_eq!(d.last_toast().as_deref(), Some("Failed to delete product"));
        assert_eq!(d.products().len(), 1);
    });
}

/// A rejected create keeps the modal open with everything the user entered.
#[test]
fn server_rejection_keeps_draft() {
    block_on(async {
        let mut d = Dashboard::mount(Vec::new()).await;
        d.controller.open_create();
        d.fill("Widget", "A blue widget", "Tools", "9.99", "0");
        d.pick(vec![png("widget.png", 100)]);

        d.backend.fail_next(ApiError::Http {
            status: 400,
            message: Some("Price must be positive".into()),
        });
        assert!(d.submit().await);

        assert_eq!(d.last_toast().as_deref(), Some("Price must be positive"));
        assert_eq!(d.modal(), ModalState::Create);
        let draft = d.controller.draft().unwrap();
        assert_eq!(draft.field(DraftField::Name), "Widget");
        assert_eq!(draft.pending_files().len(), 1);
        assert_eq!(d.outstanding_previews(), 1);
        // No refetch after a failed write.
        assert_eq!(d.calls().len(), 2);
        assert!(d.products().is_empty());

        // Retrying the same Draft succeeds.
        assert!(d.submit().await);
        assert_eq!(d.products().len(), 1);
        assert_eq!(d.outstanding_previews(), 0);
    });
}

/// Opening an edit and cancelling changes nothing on the server or the list.
#[test]
fn edit_then_cancel_leaves_list_unchanged() {
    block_on(async {
        let mut d = Dashboard::mount(vec![make_product("p-1", "Widget", 999, 12)]).await;
        let before = d.products();

        d.controller.open_edit(&before[0]);
        d.controller.set_field(DraftField::Name, "Renamed");
        d.pick(vec![png("new.png", 10), png("other.png", 10)]);
        assert_eq!(d.outstanding_previews(), 2);

        assert_eq!(d.controller.close_modal(), 2);
        assert_eq!(d.products(), before);
        assert_eq!(d.calls(), vec![ApiCall::List]);
        assert_eq!(d.outstanding_previews(), 0);
    });
}

/// Invalid batches are refused whole and leave the current previews alone.
#[test]
fn invalid_batches_are_rejected() {
    block_on(async {
        let mut d = Dashboard::mount(Vec::new()).await;
        d.controller.open_create();
        assert!(d.pick(vec![png("a.png", 10)]));

        let four: Vec<_> = (0..4).map(|i| png(&format!("{i}.png"), 10)).collect();
        assert!(!d.pick(four));
        assert_eq!(d.last_toast().as_deref(), Some("Maximum 3 images allowed"));

        assert!(!d.pick(vec![png("b.png", 10), MemoryFile::new("notes.txt", "text/plain", 10)]));
        assert_eq!(d.last_toast().as_deref(), Some("Only images under 2MB are allowed"));

        assert!(!d.pick(vec![MemoryFile::image("huge.png", 2 * MB + 1)]));
        assert!(d.pick(vec![MemoryFile::image("edge.png", 2 * MB)]));

        let draft = d.controller.draft().unwrap();
        assert_eq!(draft.pending_files()[0].name, "edge.png");
        assert_eq!(d.outstanding_previews(), 1);
    });
}

/// Create with fields but no images never reaches the backend.
#[test]
fn create_requires_an_image() {
    block_on(async {
        let mut d = Dashboard::mount(Vec::new()).await;
        d.controller.open_create();
        d.fill("Widget", "A blue widget", "Tools", "9.99", "0");
        assert!(!d.submit().await);
        assert_eq!(d.last_toast().as_deref(), Some("Please upload at least one image"));
        assert_eq!(d.calls(), vec![ApiCall::List]);
    });
}

/// Every minted preview URL is released exactly once across reselection,
/// modal switches and unmount.
#[test]
fn previews_never_leak() {
    block_on(async {
        let mut d = Dashboard::mount(vec![make_product("p-1", "Widget", 999, 12)]).await;
        let widget = d.product("p-1").unwrap();

        d.controller.open_create();
        d.pick(vec![png("a.png", 1), png("b.png", 1), png("c.png", 1)]);
        d.pick(vec![png("d.png", 1), png("e.png", 1)]);
        d.controller.open_edit(&widget);
        d.pick(vec![png("f.png", 1)]);

        let minter = d.unmount();
        let ledger = minter.ledger();
        assert_eq!(ledger.minted.len(), 6);
        assert_eq!(ledger.outstanding(), 0);
        assert!(!ledger.has_double_release());
    });
}

/// A failed refetch reports an error but keeps the last good list; the next
/// fetch recovers.
#[test]
fn failed_refetch_keeps_last_list() {
    block_on(async {
        let products = products_from_json(json!([{
            "_id": "665f",
            "name": "Widget",
            "description": "Blue",
            "category": "Tools",
            "price": 9.99,
            "stock": 25,
            "images": ["https://cdn.local/w.png"],
            "createdAt": "2024-05-01T10:00:00Z"
        }]));
        let mut d = Dashboard::mount(products).await;
        assert!(d.toasts().is_empty());
        assert_eq!(d.badges(), vec![("Widget".to_string(), StockStatus::InStock)]);
        assert_eq!(d.product("665f").map(|p| p.price), Some(Price::from_cents(999)));

        d.backend.fail_next(ApiError::Network("connection refused".into()));
        d.refresh().await;
        assert_eq!(d.last_toast().as_deref(), Some(FETCH_FAILED));
        assert_eq!(d.products().len(), 1);
        assert!(!d.is_loading());

        d.refresh().await;
        assert_eq!(d.toasts().len(), 1);
        assert_eq!(d.calls(), vec![ApiCall::List, ApiCall::List, ApiCall::List]);
    });
}

/// With fetch errors muted the list simply stays empty.
#[test]
fn muted_fetch_errors() {
    block_on(async {
        let config = DashboardConfig {
            report_fetch_errors: false,
            ..DashboardConfig::default()
        };
        let mut d = Dashboard::mount_with(config, Vec::new()).await;
        d.backend.fail_next(ApiError::Http {
            status: 503,
            message: None,
        });
        d.refresh().await;
        assert!(d.toasts().is_empty());
        assert!(d.products().is_empty());
    });
}
