use std::fmt;

use chrono::{DateTime, Utc};

use crate::global_constants::{TRACE_ADVISORY_MARKER, TRACE_ERROR_MARKER};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub recorded_at: DateTime<Utc>,
    pub message: String,
}

impl TraceEntry {
    pub fn is_error(&self) -> bool {
        self.message.starts_with(TRACE_ERROR_MARKER)
    }

    pub fn is_advisory(&self) -> bool {
        self.message.starts_with(TRACE_ADVISORY_MARKER)
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.recorded_at.format("%H:%M:%S%.3f"),
            self.message
        )
    }
}

/// Append-only progress log of a single capture session.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticTrace {
    entries: Vec<TraceEntry>,
}

impl DiagnosticTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("[TRACE] {}", message);
        self.push(message);
    }

    pub fn record_advisory(&mut self, message: impl AsRef<str>) {
        let message = format!("{}: {}", TRACE_ADVISORY_MARKER, message.as_ref());
        log::warn!("[TRACE] {}", message);
        self.push(message);
    }

    pub fn record_error(&mut self, message: impl AsRef<str>) {
        let message = format!("{}: {}", TRACE_ERROR_MARKER, message.as_ref());
        log::error!("[TRACE] {}", message);
        self.push(message);
    }

    fn push(&mut self, message: String) {
        self.entries.push(TraceEntry {
            recorded_at: Utc::now(),
            message,
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn errors(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter().filter(|entry| entry.is_error())
    }

    pub fn advisories(&self) -> impl Iterator<Item = &TraceEntry> {
        self.entries.iter().filter(|entry| entry.is_advisory())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
