use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Severity of a user-visible message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

/// A one-shot message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            ToastLevel::Info => write!(f, "[info] {}", self.message),
            ToastLevel::Error => write!(f, "[error] {}", self.message),
        }
    }
}

/// Sink for user-visible messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Collects toasts in a shared buffer for the presentation layer to drain.
#[derive(Clone, Default)]
pub struct ToastBuffer {
    buffer: Arc<Mutex<Vec<Toast>>>,
}

impl ToastBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while pushing cannot leave the Vec half-written, so the
    // buffer stays usable after poisoning.
    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        self.buffer.lock().unwrap_or_else(|poisoned| {
            log::error!("toast buffer lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Remove and return all pending toasts.
    pub fn drain(&self) -> Vec<Toast> {
        self.lock().drain(..).collect()
    }

    /// Pending toasts, without removing them.
    pub fn snapshot(&self) -> Vec<Toast> {
        self.lock().clone()
    }

    pub fn errors(&self) -> Vec<Toast> {
        self.snapshot()
            .into_iter()
            .filter(|toast| toast.level == ToastLevel::Error)
            .collect()
    }
}

impl Notifier for ToastBuffer {
    fn notify(&self, toast: Toast) {
        self.lock().push(toast);
    }
}

/// A notifier that writes toasts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Info => log::info!("{}", toast.message),
            ToastLevel::Error => log::warn!("{}", toast.message),
        }
    }
}

impl<N: Notifier> Notifier for Arc<N> {
    fn notify(&self, toast: Toast) {
        (**self).notify(toast)
    }
}
