//! Diagnostics sink injected into every export call.
//!
//! The exporters never log through global state. Callers hand in a
//! [`Diagnostics`] implementation: [`LogDiagnostics`] forwards to `bevy::log`,
//! [`CollectedDiagnostics`] keeps the messages for interactive callers.

use std::cell::RefCell;

use bevy::log::{info, warn};

/// Receiver for non-fatal export messages.
pub trait Diagnostics {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Forwards diagnostics to `bevy::log`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
}

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
}

/// Records diagnostics in memory.
///
/// # Example
///
/// ```rust
/// use tiledmap_export_core::prelude::*;
///
/// let diagnostics = CollectedDiagnostics::new();
/// diagnostics.warn("ellipse `rock` is not a circle");
/// assert_eq!(diagnostics.warnings().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CollectedDiagnostics {
    entries: RefCell<Vec<Diagnostic>>,
}

impl CollectedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded message in arrival order.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Messages recorded at warning level.
    pub fn warnings(&self) -> Vec<String> {
        self.messages(DiagnosticLevel::Warning)
    }

    /// Messages recorded at info level.
    pub fn infos(&self) -> Vec<String> {
        self.messages(DiagnosticLevel::Info)
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        self.entries.take()
    }

    fn messages(&self, level: DiagnosticLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.clone())
            .collect()
    }

    fn push(&self, level: DiagnosticLevel, message: &str) {
        self.entries.borrow_mut().push(Diagnostic {
            level,
            message: message.to_string(),
        });
    }
}

impl Diagnostics for CollectedDiagnostics {
    fn info(&self, message: &str) {
        self.push(DiagnosticLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(DiagnosticLevel::Warning, message);
    }
}
