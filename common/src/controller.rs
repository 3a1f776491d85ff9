//! State machine behind the Products page.
//!
//! The controller never talks to the network. Actions that need the backend
//! return a [`MutationRequest`]; the caller runs it through a
//! [`ServerStateCache`](crate::cache::ServerStateCache) and hands the
//! [`MutationReport`] back to [`ProductsController::finish`].

use crate::cache::{Mutation, MutationKind, MutationReport};
use crate::config::DashboardConfig;
use crate::draft::{Draft, DraftField};
use crate::error::ApiError;
use crate::preview::PreviewMinter;
use crate::product::{Product, ProductId};
use crate::stock::{StockPolicy, StockStatus};
use crate::toast::ToastQueue;
use crate::upload::ImageFile;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this product?";
pub const FETCH_FAILED: &str = "Failed to load products";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Create,
    Edit(ProductId),
}

/// Interactive yes/no prompt.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<T: FnMut(&str) -> bool> Confirm for T {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A backend write the controller wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest<F> {
    /// Draft session that issued the request; `None` for deletes.
    pub session: Option<u64>,
    pub mutation: Mutation<F>,
}

impl<F> MutationRequest<F> {
    pub fn kind(&self) -> MutationKind {
        self.mutation.kind()
    }
}

pub struct ProductsController<F, M>
where
    F: ImageFile,
    M: PreviewMinter<F>,
{
    minter: M,
    draft: Option<Draft<F>>,
    next_session: u64,
    toasts: ToastQueue,
    policy: StockPolicy,
    report_fetch_errors: bool,
}

impl<F, M> ProductsController<F, M>
where
    F: ImageFile,
    M: PreviewMinter<F>,
{
    pub fn new(minter: M, config: &DashboardConfig) -> Self {
        Self {
            minter,
            draft: None,
            next_session: 0,
            toasts: ToastQueue::new(),
            policy: config.stock_policy(),
            report_fetch_errors: config.report_fetch_errors,
        }
    }

    pub fn modal_state(&self) -> ModalState {
        match &self.draft {
            None => ModalState::Closed,
            Some(d) => match d.editing_target() {
                Some(id) => ModalState::Edit(id.clone()),
                None => ModalState::Create,
            },
        }
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft(&self) -> Option<&Draft<F>> {
        self.draft.as_ref()
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastQueue {
        &mut self.toasts
    }

    pub fn stock_status(&self, product: &Product) -> StockStatus {
        product.stock_status(&self.policy)
    }

    fn next_session(&mut self) -> u64 {
        self.next_session += 1;
        self.next_session
    }

    pub fn open_create(&mut self) {
        self.close_modal();
        let session = self.next_session();
        tracing::debug!("Opening create modal (session {session})");
        self.draft = Some(Draft::create(session));
    }

    pub fn open_edit(&mut self, product: &Product) {
        self.close_modal();
        let session = self.next_session();
        tracing::debug!("Opening edit modal for {} (session {session})", product.id);
        self.draft = Some(Draft::edit(session, product));
    }

    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
        if let Some(draft) = self.draft.take() {
            self.draft = Some(draft.with_field(field, value));
        }
    }

    /// Handle a picker batch. Returns whether it was accepted.
    pub fn select_images(&mut self, files: Vec<F>) -> bool {
        if files.is_empty() {
            return false;
        }
        let Some(draft) = self.draft.as_mut() else {
            tracing::debug!("Ignoring image selection with no open modal");
            return false;
        };
        match draft.replace_images(files, &mut self.minter) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Image batch rejected: {e}");
                self.toasts.error(e.to_string());
                false
            }
        }
    }

    /// Validate the open Draft and produce the create/update request.
    pub fn submit(&mut self) -> Option<MutationRequest<F>> {
        let draft = self.draft.as_ref()?;
        let form = match draft.to_form() {
            Ok(form) => form,
            Err(e) => {
                tracing::debug!("Submit rejected: {e}");
                self.toasts.error(e.to_string());
                return None;
            }
        };
        let mutation = match draft.editing_target() {
            Some(id) => Mutation::Update {
                id: id.clone(),
                form,
            },
            None => Mutation::Create(form),
        };
        Some(MutationRequest {
            session: Some(draft.session()),
            mutation,
        })
    }

    /// Ask for confirmation, then produce the delete request.
    pub fn request_delete<C: Confirm>(
        &mut self,
        id: &ProductId,
        confirm: &mut C,
    ) -> Option<MutationRequest<F>> {
        if !confirm.confirm(DELETE_PROMPT) {
            tracing::debug!("Delete of {id} declined");
            return None;
        }
        Some(MutationRequest {
            session: None,
            mutation: Mutation::Delete(id.clone()),
        })
    }

    /// Apply the result of a request issued by this controller.
    pub fn finish(&mut self, session: Option<u64>, kind: MutationKind, report: MutationReport) {
        match report.outcome {
            Ok(_) => {
                self.toasts.success(kind.success_message());
                let current = self.draft.as_ref().map(Draft::session);
                if session.is_some() && session == current {
                    self.close_modal();
                } else if session.is_some() {
                    tracing::debug!("{kind:?} finished after its modal closed");
                }
            }
            Err(e) => {
                let message = match kind {
                    MutationKind::Delete => kind.failure_message().to_string(),
                    _ => e.toast_message(kind.failure_message()),
                };
                self.toasts.error(message);
            }
        }
        if let Some(Err(e)) = report.refetch {
            self.fetch_failed(&e);
        }
    }

    /// Surface a failed list fetch. The list keeps its last good value.
    pub fn fetch_failed(&mut self, error: &ApiError) {
        if self.report_fetch_errors {
            self.toasts.error(FETCH_FAILED);
        } else {
            tracing::debug!("Product fetch failed quietly: {error}");
        }
    }

    /// Release the Draft's previews, reset it and hide the modal.
    /// Returns how many preview URLs were released.
    pub fn close_modal(&mut self) -> usize {
        match self.draft.take() {
            Some(draft) => {
                let session = draft.session();
                let released = draft.discard(&mut self.minter);
                tracing::debug!("Closed modal (session {session}), released {released} previews");
                released
            }
            None => 0,
        }
    }
}

impl<F, M> Drop for ProductsController<F, M>
where
    F: ImageFile,
    M: PreviewMinter<F>,
{
    fn drop(&mut self) {
        self.close_modal();
    }
}
