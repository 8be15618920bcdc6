//! User-facing notifications

pub const MSG_UPDATE_SUCCESS: &str = "Balance updated successfully";
pub const MSG_UPDATE_FAILED: &str = "Failed to update balance";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

/// Rendering is up to the host (toast, console, log).
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Notifier for headless hosts: writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => tracing::info!(notification = "success", "{}", message),
            NotificationKind::Failure => tracing::warn!(notification = "failure", "{}", message),
        }
    }
}
