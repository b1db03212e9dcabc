#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    key: Option<String>,
    level: NotificationLevel,
    message: String,
    sticky: bool,
    posted_at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            key: None,
            level,
            message: message.into(),
            sticky: false,
            posted_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    /// Replaces any live notification posted under the same key.
    #[must_use]
    pub fn keyed(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Stays visible until dismissed explicitly.
    #[must_use]
    pub const fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    #[must_use]
    pub const fn level(&self) -> NotificationLevel {
        self.level
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn is_sticky(&self) -> bool {
        self.sticky
    }

    #[must_use]
    pub const fn posted_at(&self) -> DateTime<Utc> {
        self.posted_at
    }
}

pub trait Notifier {
    fn post(&self, notification: Notification);
    fn dismiss(&self, key: &str);
}

/// In-memory notification surface with keyed replacement.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    active: Mutex<Vec<Notification>>,
    posted: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications currently visible, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<Notification> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every notification ever posted, including replaced and dismissed ones.
    #[must_use]
    pub fn history(&self) -> Vec<Notification> {
        self.posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn find(&self, key: &str) -> Option<Notification> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|n| n.key() == Some(key))
            .cloned()
    }

    /// Drops non-sticky notifications, as a toast surface does on timeout.
    pub fn expire_transient(&self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(Notification::is_sticky);
    }
}

impl Notifier for NotificationCenter {
    fn post(&self, notification: Notification) {
        tracing::debug!(
            level = notification.level().as_str(),
            key = notification.key().unwrap_or("-"),
            "{}",
            notification.message()
        );

        self.posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());

        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(key) = notification.key() {
            active.retain(|n| n.key() != Some(key));
        }
        active.push(notification);
    }

    fn dismiss(&self, key: &str) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|n| n.key() != Some(key));
    }
}

/// Renders notifications as lines on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn post(&self, notification: Notification) {
        let marker = match notification.level() {
            NotificationLevel::Info => "..",
            NotificationLevel::Success => "ok",
            NotificationLevel::Warning => "!!",
            NotificationLevel::Error => "xx",
        };
        eprintln!("[{marker}] {}", notification.message());
    }

    fn dismiss(&self, key: &str) {
        tracing::trace!(key, "notification dismissed");
    }
}
