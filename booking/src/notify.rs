//! User-facing toast notifications.

use std::fmt;

/// Toast severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToastLevel {
    /// Something completed
    Success,
    /// Something failed; the message carries the error text
    Error,
    /// Neutral information
    Info,
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A transient message shown to the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    /// Severity
    pub level: ToastLevel,
    /// Short headline
    pub title: String,
    /// Detail line
    pub message: String,
}

impl Toast {
    /// Success toast
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Error toast
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Informational toast
    #[must_use]
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Where toasts go
pub trait Notifier: Send + Sync {
    /// Show a toast
    fn notify(&self, toast: Toast);
}

/// Notifier that writes toasts to the tracing log
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => tracing::warn!(title = %toast.title, "{}", toast.message),
            ToastLevel::Success | ToastLevel::Info => {
                tracing::info!(level = %toast.level, title = %toast.title, "{}", toast.message);
            },
        }
    }
}
