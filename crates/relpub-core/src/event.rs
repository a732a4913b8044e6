//! Structured run narration.
//!
//! Pipeline components never write to a terminal. They append ordered
//! events to an [`EventLog`]; the CLI decides how (and whether) to render
//! them.

/// Severity of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    /// A step is starting.
    Process,
    /// Neutral information.
    Info,
    /// A step completed.
    Success,
    /// Something degraded but the run continues.
    Warning,
    /// A failure worth surfacing even when the run survives it.
    Error,
}

/// One narration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Severity.
    pub level: EventLevel,
    /// Human-readable message.
    pub message: String,
}

/// Append-only ordered list of events for one run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, level: EventLevel, message: impl Into<String>) {
        self.events.push(Event {
            level,
            message: message.into(),
        });
    }

    /// Append a `Process` event.
    pub fn process(&mut self, message: impl Into<String>) {
        self.push(EventLevel::Process, message);
    }

    /// Append an `Info` event.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(EventLevel::Info, message);
    }

    /// Append a `Success` event.
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(EventLevel::Success, message);
    }

    /// Append a `Warning` event.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(EventLevel::Warning, message);
    }

    /// Append an `Error` event.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(EventLevel::Error, message);
    }

    /// All events, in emission order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Whether any warning or error was recorded.
    pub fn has_warnings(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e.level, EventLevel::Warning | EventLevel::Error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_keep_order() {
        let mut log = EventLog::new();
        log.process("scanning");
        log.success("done");
        let messages: Vec<_> = log.events().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["scanning", "done"]);
    }

    #[test]
    fn test_has_warnings() {
        let mut log = EventLog::new();
        log.info("fine");
        assert!(!log.has_warnings());
        log.warning("degraded");
        assert!(log.has_warnings());
    }
}
