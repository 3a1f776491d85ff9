use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::block_on;

use nexent_common::api::ProductApi;
use nexent_common::cache::{QueryClient, QueryKey, ServerStateCache};
use nexent_common::draft::ProductForm;
use nexent_common::error::ApiError;
use nexent_common::mock::MemoryFile;
use nexent_common::product::{Product, ProductId};
use nexent_dashboard_integration::harness::SharedCache;
use nexent_dashboard_integration::{init_logging, make_product};

/// Backend whose list responses are released by the test, one gate per call.
#[derive(Clone, Default)]
struct GatedApi {
    gates: Rc<RefCell<VecDeque<oneshot::Receiver<Vec<Product>>>>>,
}

impl GatedApi {
    fn gate(&self) -> oneshot::Sender<Vec<Product>> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().push_back(rx);
        tx
    }
}

impl ProductApi for GatedApi {
    type File = MemoryFile;

    async fn list(&self) -> Result<Vec<Product>, ApiError> {
        let gate = self.gates.borrow_mut().pop_front();
        match gate {
            Some(rx) => rx.await.map_err(|_| ApiError::Network("gate dropped".into())),
            None => Ok(Vec::new()),
        }
    }

    async fn create(&self, _form: ProductForm<MemoryFile>) -> Result<Product, ApiError> {
        Err(ApiError::Network("read-only".into()))
    }

    async fn update(&self, _id: &ProductId, _form: ProductForm<MemoryFile>) -> Result<Product, ApiError> {
        Err(ApiError::Network("read-only".into()))
    }

    async fn delete(&self, _id: &ProductId) -> Result<(), ApiError> {
        Err(ApiError::Network("read-only".into()))
    }
}

fn names(client: &QueryClient<GatedApi, SharedCache>) -> Vec<String> {
    client.products().into_iter().map(|p| p.name).collect()
}

/// Two overlapping fetches: the later one answers first, then the earlier
/// one arrives. The list shows the later response.
#[test]
fn older_response_does_not_overwrite_newer() {
    init_logging();
    let api = GatedApi::default();
    let slow_gate = api.gate();
    let fast_gate = api.gate();
    let client = QueryClient::new(api, SharedCache::default());
    let (ack_tx, ack_rx) = oneshot::channel::<()>();

    block_on(async {
        let client = &client;
        let first = client.fetch(QueryKey::Products);
        let second = async move {
            let result = client.fetch(QueryKey::Products).await;
            let _ = ack_tx.send(());
            result
        };
        let driver = async move {
            let _ = fast_gate.send(vec![make_product("p-2", "Fresh", 100, 1)]);
            let _ = ack_rx.await;
            let _ = slow_gate.send(vec![make_product("p-1", "Old", 100, 1)]);
        };

        let (first, second, ()) = futures::join!(first, second, driver);
        assert!(first.is_ok());
        assert!(second.is_ok());
    });

    assert_eq!(names(&client), ["Fresh"]);
}

/// Responses that arrive in request order are all applied.
#[test]
fn in_order_responses_apply_latest() {
    init_logging();
    let api = GatedApi::default();
    let first_gate = api.gate();
    let second_gate = api.gate();
    let client = QueryClient::new(api, SharedCache::default());
    let (ack_tx, ack_rx) = oneshot::channel::<()>();

    block_on(async {
        let client = &client;
        let first = async move {
            let result = client.fetch(QueryKey::Products).await;
            let _ = ack_tx.send(());
            result
        };
        let second = client.fetch(QueryKey::Products);
        let driver = async move {
            let _ = first_gate.send(vec![make_product("p-1", "First", 100, 1)]);
            let _ = ack_rx.await;
            let _ = second_gate.send(vec![make_product("p-2", "Second", 100, 1)]);
        };
        let _ = futures::join!(first, second, driver);
    });

    assert_eq!(names(&client), ["Second"]);
}
