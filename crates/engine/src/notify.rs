#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }
}

/// Fire-and-forget sink for user-facing messages.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl<T: Notifier> Notifier for std::rc::Rc<std::cell::RefCell<T>> {
    fn notify(&mut self, notification: Notification) {
        self.borrow_mut().notify(notification);
    }
}

/// Sends notifications to the log instead of a UI.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error => tracing::warn!(kind = notification.kind.as_str(), "{}", notification.message),
            _ => tracing::info!(kind = notification.kind.as_str(), "{}", notification.message),
        }
    }
}

/// Message shown when a layout write fails.
pub const SAVE_FAILED_MESSAGE: &str = "Couldn't save your aquarium. Your changes are kept on this device.";
