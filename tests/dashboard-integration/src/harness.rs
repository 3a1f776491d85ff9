use std::cell::RefCell;
use std::rc::Rc;

use nexent_common::cache::{CacheHandle, QueryCache, QueryClient, QueryKey, ServerStateCache};
use nexent_common::config::DashboardConfig;
use nexent_common::controller::{ModalState, ProductsController};
use nexent_common::draft::DraftField;
use nexent_common::mock::{ApiCall, CountingMinter, MemoryFile, MemoryProductApi};
use nexent_common::product::{Product, ProductId};
use nexent_common::stock::StockStatus;

use crate::init_logging;

pub type SharedCache = Rc<RefCell<QueryCache<Vec<Product>>>>;

/// A mounted Products page wired to an in-memory backend.
///
/// Every action drives the same controller and cache the UI uses, so each
/// call here corresponds to one user gesture.
pub struct Dashboard {
    pub controller: ProductsController<MemoryFile, CountingMinter>,
    pub client: QueryClient<MemoryProductApi, SharedCache>,
    pub backend: MemoryProductApi,
    pub minter: CountingMinter,
}

impl Dashboard {
    /// Mount with default settings over `products`.
    pub async fn mount(products: Vec<Product>) -> Self {
        Self::mount_with(DashboardConfig::default(), products).await
    }

    /// Mount with `config`, then run the initial product fetch.
    pub async fn mount_with(config: DashboardConfig, products: Vec<Product>) -> Self {
        init_logging();
        let backend = MemoryProductApi::with_products(products);
        let minter = CountingMinter::new();
        let client = QueryClient::new(backend.clone(), SharedCache::default());
        let controller = ProductsController::new(minter.clone(), &config);

        let mut dashboard = Self {
            controller,
            client,
            backend,
            minter,
        };
        dashboard.refresh().await;
        dashboard
    }

    /// Refetch the product list, reporting a failure the way the page does.
    pub async fn refresh(&mut self) {
        if let Err(e) = self.client.fetch(QueryKey::Products).await {
            self.controller.fetch_failed(&e);
        }
    }

    /// Rows currently rendered.
    pub fn products(&self) -> Vec<Product> {
        self.client.products()
    }

    pub fn product(&self, id: &str) -> Option<Product> {
        self.products().into_iter().find(|p| p.id.0 == id)
    }

    /// Badge shown next to each row, in list order.
    pub fn badges(&self) -> Vec<(String, StockStatus)> {
        self.products()
            .iter()
            .map(|p| (p.name.clone(), self.controller.stock_status(p)))
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.client.cache().with(|c| c.is_loading(QueryKey::Products))
    }

    pub fn modal(&self) -> ModalState {
        self.controller.modal_state()
    }

    /// Text of the newest toast.
    pub fn last_toast(&self) -> Option<String> {
        self.controller.toasts().latest().map(|t| t.message.clone())
    }

    /// Every toast still on screen, oldest first.
    pub fn toasts(&self) -> Vec<String> {
        self.controller
            .toasts()
            .iter()
            .map(|t| t.message.clone())
            .collect()
    }

    /// Requests the backend has seen so far.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.backend.calls()
    }

    /// Ephemeral preview URLs minted and not yet released.
    pub fn outstanding_previews(&self) -> usize {
        self.minter.ledger().outstanding()
    }

    /// Type every form field.
    pub fn fill(&mut self, name: &str, description: &str, category: &str, price: &str, stock: &str) {
        let values = [name, description, category, price, stock];
        for (field, value) in DraftField::ALL.into_iter().zip(values) {
            self.controller.set_field(field, value);
        }
    }

    pub fn pick(&mut self, files: Vec<MemoryFile>) -> bool {
        self.controller.select_images(files)
    }

    /// Press the Create/Update button and wait for the request and refetch to
    /// settle. Returns whether a request was sent.
    pub async fn submit(&mut self) -> bool {
        let Some(request) = self.controller.submit() else {
            return false;
        };
        let kind = request.kind();
        let report = self.client.mutate(request.mutation).await;
        self.controller.finish(request.session, kind, report);
        true
    }

    /// Press Delete on a row, answering the confirmation prompt with
    /// `answer`. Returns whether a request was sent.
    pub async fn delete(&mut self, id: &str, answer: bool) -> bool {
        let mut confirm = |prompt: &str| {
            tracing::debug!("confirm({prompt:?}) -> {answer}");
            answer
        };
        let Some(request) = self
            .controller
            .request_delete(&ProductId(id.to_string()), &mut confirm)
        else {
            return false;
        };
        let kind = request.kind();
        let report = self.client.mutate(request.mutation).await;
        self.controller.finish(request.session, kind, report);
        true
    }

    /// Navigate away. Returns the minter so leaks can still be checked.
    pub fn unmount(self) -> CountingMinter {
        let minter = self.minter.clone();
        drop(self);
        minter
    }
}
