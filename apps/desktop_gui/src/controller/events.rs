//! UI/backend events and error modeling for desktop GUI controller.
//!
//! Booking failures travel inside [`CascadeEvent`] completions and surface as
//! notices. [`UiError`] only covers the plumbing between UI and backend worker.

use client_core::CascadeEvent;

pub enum UiEvent {
    Info(String),
    /// Completion of a backend command, fed straight into the cascade.
    Cascade(CascadeEvent),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorKind {
    BackendStartup,
    QueueFull,
    QueueDisconnected,
}

impl UiErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::BackendStartup => "Startup",
            Self::QueueFull => "Busy",
            Self::QueueDisconnected => "Backend",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    kind: UiErrorKind,
    message: String,
}

impl UiError {
    pub fn new(kind: UiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> UiErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Errors that leave the form unusable are pinned to the banner.
    pub fn is_blocking(&self) -> bool {
        self.kind != UiErrorKind::QueueFull
    }
}
