//! Append-only intrusion event log

use crate::detection::IntrusionEvent;

/// Ordered intrusion history
///
/// Insertion order is detection order. Entries are never removed or
/// reordered, and the log is unbounded for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<IntrusionEvent>,
}

impl EventLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append events in detection order
    pub fn append<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = IntrusionEvent>,
    {
        self.events.extend(events);
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// No events yet
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Most recent event
    pub fn last(&self) -> Option<&IntrusionEvent> {
        self.events.last()
    }

    /// Events, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &IntrusionEvent> {
        self.events.iter()
    }

    /// Owned copy of the events
    pub fn to_vec(&self) -> Vec<IntrusionEvent> {
        self.events.clone()
    }

    /// Description line per event, oldest first
    pub fn descriptions(&self) -> Vec<String> {
        self.events.iter().map(IntrusionEvent::describe).collect()
    }
}
