//! Transient user-visible notifications.

use std::collections::VecDeque;

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

/// Bounded queue of toasts waiting to be shown. Oldest entries fall off
/// when it is full.
#[derive(Debug)]
pub struct Notifications {
    queue: Mutex<VecDeque<Toast>>,
    capacity: usize,
}

impl Notifications {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "error toast");
        self.push(ToastKind::Error, message);
    }

    fn push(&self, kind: ToastKind, message: String) {
        let mut queue = self.queue.lock();
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(Toast { kind, message });
    }

    /// Take everything queued so far.
    pub fn drain(&self) -> Vec<Toast> {
        self.queue.lock().drain(..).collect()
    }

    pub fn last(&self) -> Option<Toast> {
        self.queue.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(16)
    }
}
