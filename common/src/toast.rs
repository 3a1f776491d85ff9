use std::collections::VecDeque;

/// Toasts kept at once; the oldest is dropped past this.
pub const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn class(&self) -> &'static str {
        match self.kind {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
        }
    }
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    items: VecDeque<Toast>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let toast = Toast {
            id: self.next_id,
            kind,
            message: message.into(),
        };
        match kind {
            ToastKind::Success => tracing::debug!("toast: {}", toast.message),
            ToastKind::Error => tracing::debug!("error toast: {}", toast.message),
        }
        self.items.push_back(toast);
        while self.items.len() > MAX_TOASTS {
            self.items.pop_front();
        }
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
