//! Server-state cache: last-fetched backend data plus invalidation.
//!
//! The store ([`QueryCache`]) is synchronous and updated in two halves around
//! each network call, so no borrow is ever held across an `.await`. Every
//! fetch gets a ticket; a response is applied only if it is newer than the
//! last one applied for its key.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::api::ProductApi;
use crate::draft::ProductForm;
use crate::error::ApiError;
use crate::product::{Product, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Products,
}

/// Handed out by [`QueryCache::begin_fetch`], returned with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub key: QueryKey,
    pub seq: u64,
}

#[derive(Debug)]
struct Entry<T> {
    data: Option<T>,
    /// Ticket of the response currently in `data`.
    applied_seq: u64,
    pending: usize,
    /// Some fetch has come back, successfully or not.
    settled: bool,
    stale: bool,
    error: Option<ApiError>,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            data: None,
            applied_seq: 0,
            pending: 0,
            settled: false,
            stale: false,
            error: None,
        }
    }
}

#[derive(Debug)]
pub struct QueryCache<T> {
    entries: HashMap<QueryKey, Entry<T>>,
    next_seq: u64,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self, key: QueryKey) -> FetchTicket {
        self.next_seq += 1;
        self.entries.entry(key).or_default().pending += 1;
        FetchTicket {
            key,
            seq: self.next_seq,
        }
    }

    /// Apply a fetch result. Returns `false` if a newer response already
    /// landed and this one was dropped.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<T, ApiError>) -> bool {
        let entry = self.entries.entry(ticket.key).or_default();
        entry.pending = entry.pending.saturating_sub(1);
        entry.settled = true;

        if ticket.seq <= entry.applied_seq {
            tracing::warn!(
                "Dropping stale {:?} response #{} (have #{})",
                ticket.key,
                ticket.seq,
                entry.applied_seq
            );
            return false;
        }

        match result {
            Ok(data) => {
                entry.data = Some(data);
                entry.applied_seq = ticket.seq;
                entry.stale = false;
                entry.error = None;
            }
            // Keep the last good data on failure.
            Err(e) => entry.error = Some(e),
        }
        true
    }

    /// Forget a fetch whose future was dropped before it completed.
    pub fn cancel_fetch(&mut self, ticket: FetchTicket) {
        tracing::debug!("{:?} fetch #{} cancelled", ticket.key, ticket.seq);
        if let Some(entry) = self.entries.get_mut(&ticket.key) {
            entry.pending = entry.pending.saturating_sub(1);
        }
    }

    /// Mark a key's data as outdated. The data stays visible until a
    /// refetch replaces it.
    pub fn invalidate(&mut self, key: QueryKey) {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.stale = true;
        }
    }

    pub fn data(&self, key: QueryKey) -> Option<&T> {
        self.entries.get(&key).and_then(|e| e.data.as_ref())
    }

    /// Nothing to show yet: no data, and either a fetch is running or none
    /// has come back so far.
    pub fn is_loading(&self, key: QueryKey) -> bool {
        match self.entries.get(&key) {
            None => true,
            Some(e) => e.data.is_none() && (e.pending > 0 || !e.settled),
        }
    }

    pub fn is_fetching(&self, key: QueryKey) -> bool {
        self.entries.get(&key).is_some_and(|e| e.pending > 0)
    }

    pub fn is_stale(&self, key: QueryKey) -> bool {
        self.entries.get(&key).is_some_and(|e| e.stale)
    }

    pub fn last_error(&self, key: QueryKey) -> Option<&ApiError> {
        self.entries.get(&key).and_then(|e| e.error.as_ref())
    }
}

/// Shared access to a [`QueryCache`]. Closures must not await.
pub trait CacheHandle<T> {
    fn with<R>(&self, f: impl FnOnce(&QueryCache<T>) -> R) -> R;
    fn with_mut<R>(&self, f: impl FnOnce(&mut QueryCache<T>) -> R) -> R;
}

impl<T> CacheHandle<T> for Rc<RefCell<QueryCache<T>>> {
    fn with<R>(&self, f: impl FnOnce(&QueryCache<T>) -> R) -> R {
        f(&self.borrow())
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut QueryCache<T>) -> R) -> R {
        f(&mut self.borrow_mut())
    }
}

/// Cancels its ticket if the owning fetch is dropped mid-request.
struct InFlight<'a, H: CacheHandle<Vec<Product>>> {
    cache: &'a H,
    ticket: Option<FetchTicket>,
}

impl<H: CacheHandle<Vec<Product>>> InFlight<'_, H> {
    fn complete(mut self, result: Result<Vec<Product>, ApiError>) -> bool {
        match self.ticket.take() {
            Some(ticket) => self.cache.with_mut(|c| c.complete_fetch(ticket, result)),
            None => false,
        }
    }
}

impl<H: CacheHandle<Vec<Product>>> Drop for InFlight<'_, H> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.cache.with_mut(|c| c.cancel_fetch(ticket));
        }
    }
}

/// A write against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<F> {
    Create(ProductForm<F>),
    Update { id: ProductId, form: ProductForm<F> },
    Delete(ProductId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn success_message(self) -> &'static str {
        match self {
            MutationKind::Create => "Product created successfully!",
            MutationKind::Update => "Product updated successfully!",
            MutationKind::Delete => "Product deleted successfully!",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            MutationKind::Create => "Failed to create product",
            MutationKind::Update => "Failed to update product",
            MutationKind::Delete => "Failed to delete product",
        }
    }
}

impl<F> Mutation<F> {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create(_) => MutationKind::Create,
            Mutation::Update { .. } => MutationKind::Update,
            Mutation::Delete(_) => MutationKind::Delete,
        }
    }

    /// Queries that a successful run makes outdated.
    pub fn invalidates(&self) -> &'static [QueryKey] {
        &[QueryKey::Products]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutput {
    Saved(Product),
    Deleted,
}

/// Outcome of [`ServerStateCache::mutate`].
#[derive(Debug, Clone, PartialEq)]
pub struct MutationReport {
    pub outcome: Result<MutationOutput, ApiError>,
    /// Result of the follow-up refetch; `None` if the mutation failed.
    pub refetch: Option<Result<(), ApiError>>,
}

/// Injectable server-state capability.
#[allow(async_fn_in_trait)]
pub trait ServerStateCache {
    type File;

    /// Load `key` from the backend into the cache.
    async fn fetch(&self, key: QueryKey) -> Result<(), ApiError>;

    fn invalidate(&self, key: QueryKey);

    /// Run a write; on success invalidate and refetch what it touched.
    async fn mutate(&self, op: Mutation<Self::File>) -> MutationReport;
}

/// [`ServerStateCache`] over a [`ProductApi`] and a cache handle.
#[derive(Debug, Clone)]
pub struct QueryClient<A, H> {
    api: A,
    cache: H,
}

impl<A, H> QueryClient<A, H>
where
    A: ProductApi,
    H: CacheHandle<Vec<Product>>,
{
    pub fn new(api: A, cache: H) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &H {
        &self.cache
    }

    /// Current product list, empty before the first successful fetch.
    pub fn products(&self) -> Vec<Product> {
        self.cache
            .with(|c| c.data(QueryKey::Products).cloned())
            .unwrap_or_default()
    }

    async fn run(&self, op: Mutation<A::File>) -> Result<MutationOutput, ApiError> {
        match op {
            Mutation::Create(form) => self.api.create(form).await.map(MutationOutput::Saved),
            Mutation::Update { id, form } => {
                self.api.update(&id, form).await.map(MutationOutput::Saved)
            }
            Mutation::Delete(id) => self.api.delete(&id).await.map(|()| MutationOutput::Deleted),
        }
    }
}

impl<A, H> ServerStateCache for QueryClient<A, H>
where
    A: ProductApi,
    H: CacheHandle<Vec<Product>>,
{
    type File = A::File;

    async fn fetch(&self, key: QueryKey) -> Result<(), ApiError> {
        let ticket = self.cache.with_mut(|c| c.begin_fetch(key));
        let in_flight = InFlight {
            cache: &self.cache,
            ticket: Some(ticket),
        };
        let result = match key {
            QueryKey::Products => self.api.list().await,
        };
        if let Err(e) = &result {
            tracing::error!("Fetching {key:?} failed: {e}");
        }
        let outcome = result.as_ref().map(|_| ()).map_err(ApiError::clone);
        in_flight.complete(result);
        outcome
    }

    fn invalidate(&self, key: QueryKey) {
        self.cache.with_mut(|c| c.invalidate(key));
    }

    async fn mutate(&self, op: Mutation<A::File>) -> MutationReport {
        let kind = op.kind();
        let keys = op.invalidates();
        let outcome = self.run(op).await;
        match &outcome {
            Ok(_) => tracing::info!("{kind:?} succeeded"),
            Err(e) => tracing::error!("{kind:?} failed: {e}"),
        }
        if outcome.is_err() {
            return MutationReport {
                outcome,
                refetch: None,
            };
        }

        let mut refetch = Ok(());
        for &key in keys {
            self.invalidate(key);
            if let Err(e) = self.fetch(key).await {
                refetch = Err(e);
            }
        }
        MutationReport {
            outcome,
            refetch: Some(refetch),
        }
    }
}
