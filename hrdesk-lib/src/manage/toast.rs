use std::time::Duration;

/// Default duration for toast notifications.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(4);

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A transient notification produced by a table operation.
///
/// The table only queues toasts; the front end drains them with
/// [`ManagementTable::take_toasts`](super::ManagementTable::take_toasts) and
/// decides how to show them.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    /// Severity.
    pub level: ToastLevel,
    /// Text to display.
    pub message: String,
    /// How long to show the toast.
    pub duration: Duration,
}

impl Toast {
    fn with_level(level: ToastLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            duration: DEFAULT_TOAST_DURATION,
        }
    }

    /// Create an info toast.
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(ToastLevel::Info, message)
    }

    /// Create a success toast.
    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(ToastLevel::Success, message)
    }

    /// Create an error toast.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(ToastLevel::Error, message)
    }
}
