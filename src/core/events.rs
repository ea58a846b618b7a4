//! Structured diagnostics emitted while a conversion runs.
//!
//! Every stage reports through an injected [`EventSink`] instead of a global
//! logger. [`TracingSink`] forwards to `tracing`; [`MemorySink`] keeps the
//! events for front-ends and tests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Which report a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Progress and errors of the conversion.
    Conversion,
    /// Credit notes diverted from TRAF2000 output.
    CreditNotes,
}

/// One diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Invoice number the event refers to, if any.
    pub invoice: Option<String>,
    pub severity: Severity,
    pub channel: Channel,
    pub message: String,
}

impl Event {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            invoice: None,
            severity,
            channel: Channel::Conversion,
            message: message.into(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Attach the invoice number.
    pub fn invoice(mut self, number: impl Into<String>) -> Self {
        self.invoice = Some(number.into());
        self
    }

    /// Route the event to another report channel.
    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.invoice {
            Some(number) => write!(f, "[{}] {}: {}", self.severity, number, self.message),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

/// Receiver of diagnostic events.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: Event) {
        (**self).emit(event);
    }
}

/// Discards every event.
impl EventSink for () {
    fn emit(&mut self, _event: Event) {}
}

/// Forwards events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: Event) {
        let invoice = event.invoice.as_deref().unwrap_or("-");
        let channel = match event.channel {
            Channel::Conversion => "conversion",
            Channel::CreditNotes => "credit_notes",
        };
        match event.severity {
            Severity::Debug => tracing::debug!(invoice, channel, "{}", event.message),
            Severity::Info => tracing::info!(invoice, channel, "{}", event.message),
            Severity::Warning => tracing::warn!(invoice, channel, "{}", event.message),
            Severity::Error => tracing::error!(invoice, channel, "{}", event.message),
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Vec<Event>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events at or above the given severity.
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.severity >= severity)
    }

    /// Events of one channel, in emission order.
    pub fn channel(&self, channel: Channel) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.channel == channel)
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Sends every event to two sinks.
#[derive(Debug)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn emit(&mut self, event: Event) {
        self.0.emit(event.clone());
        self.1.emit(event);
    }
}
