//! Leveled diagnostic events collected during one measurement.
//!
//! Events are kept on the result so callers can render them; each event is
//! also forwarded to the `log` facade under the [`LOG_TARGET`] target, so
//! they can be filtered apart from the per-module debug logging.

use serde::{Deserialize, Serialize};

/// `log` target of forwarded diagnostic events.
pub const LOG_TARGET: &str = "anthro";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
}

impl DiagnosticLevel {
    fn as_log(self) -> log::Level {
        match self {
            DiagnosticLevel::Debug => log::Level::Debug,
            DiagnosticLevel::Info => log::Level::Info,
            DiagnosticLevel::Warn => log::Level::Warn,
        }
    }
}

/// Pipeline stage an event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Calibrate,
    Landmarks,
    Height,
    Head,
    Wrist,
    WristFallback,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEvent {
    pub level: DiagnosticLevel,
    pub stage: Stage,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    events: Vec<DiagnosticEvent>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: DiagnosticLevel, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        log::log!(target: LOG_TARGET, level.as_log(), "[{stage:?}] {message}");
        self.events.push(DiagnosticEvent {
            level,
            stage,
            message,
        });
    }

    pub fn debug(&mut self, stage: Stage, message: impl Into<String>) {
        self.push(DiagnosticLevel::Debug, stage, message);
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        self.push(DiagnosticLevel::Info, stage, message);
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        self.push(DiagnosticLevel::Warn, stage, message);
    }

    pub fn events(&self) -> &[DiagnosticEvent] {
        &self.events
    }

    pub fn for_stage(&self, stage: Stage) -> impl Iterator<Item = &DiagnosticEvent> + '_ {
        self.events.iter().filter(move |e| e.stage == stage)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<DiagnosticEvent> {
        self.events
    }
}
