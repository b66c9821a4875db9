//! A resumable cursor over one visit's inbound execution event stream
//! (§4.5 "Event cursor", mirroring the frame-oriented replay reader this
//! crate's machinery descends from).

use odb_sequence::ExecutionEvent;

/// Consumes an in-memory `ExecutionEvent` buffer one event at a time.
///
/// The cursor's position is a plain `usize`, so a worker that crashes
/// mid-fold can be resumed by reopening at [`EventCursor::position`]
/// rather than re-folding events already seen (§5 "Cancellation").
/// Persisting and retrieving that position is the caller's
/// responsibility; this type only tracks it in memory.
#[derive(Clone, Debug)]
pub struct EventCursor {
    events: Vec<ExecutionEvent>,
    position: usize,
}

impl EventCursor {
    /// Open a cursor at the start of `events`.
    pub fn new(events: Vec<ExecutionEvent>) -> Self {
        Self { events, position: 0 }
    }

    /// Resume a cursor over `events` at a previously recorded `position`.
    ///
    /// `position` is clamped to `events.len()` so a buffer shorter than
    /// expected (e.g. truncated by a bug upstream) never panics; it just
    /// resumes at the end.
    pub fn resume_at(events: Vec<ExecutionEvent>, position: usize) -> Self {
        let position = position.min(events.len());
        Self { events, position }
    }

    /// The next unconsumed event, or `None` if the stream is exhausted.
    pub fn advance(&mut self) -> Option<&ExecutionEvent> {
        let event = self.events.get(self.position)?;
        self.position += 1;
        Some(event)
    }

    /// The cursor's current position, serializable for resumption.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Every event consumed so far.
    pub fn consumed(&self) -> &[ExecutionEvent] {
        &self.events[..self.position]
    }

    /// `true` if every event has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.events.len()
    }
}
