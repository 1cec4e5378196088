use std::io::Write as _;

use crate::foundation::error::{ErrorKind, MemeError};

/// Severity of a [`Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information.
    Info,
    /// An action completed.
    Success,
    /// An action failed.
    Error,
}

/// A message for the user. Delivering it never blocks the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Human-readable text.
    pub message: String,
    /// Error classification for [`NoticeLevel::Error`] notices.
    pub kind: Option<ErrorKind>,
}

impl Notice {
    /// Neutral information.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            kind: None,
        }
    }

    /// A completed action.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            kind: None,
        }
    }

    /// A failure.
    pub fn error(err: &MemeError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: err.to_string(),
            kind: Some(err.kind()),
        }
    }
}

/// Receives notices for display.
pub trait Notifier {
    /// Show `notice`.
    fn notify(&mut self, notice: Notice);
}

/// Prints notices to stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&mut self, notice: Notice) {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        let _ = writeln!(std::io::stderr().lock(), "[{tag}] {}", notice.message);
    }
}

/// Keeps every notice in memory.
#[derive(Clone, Debug, Default)]
pub struct CollectingNotifier {
    /// Notices in delivery order.
    pub notices: Vec<Notice>,
}

impl CollectingNotifier {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices of `level`, in order.
    pub fn with_level(&self, level: NoticeLevel) -> Vec<&Notice> {
        self.notices.iter().filter(|n| n.level == level).collect()
    }

    /// The most recent notice.
    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
