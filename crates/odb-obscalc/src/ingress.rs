//! Inbound invalidation signals (§1 "invalidation signal", §4.8
//! "three inputs: ... invalidation notifications from upstream").

use odb_core::ObservationId;
use odb_time::Timestamp;

/// Why an observation's entry was invalidated (§4.8 "observation edits,
/// target edits, execution events, ITC cache flushes, proposal
/// acceptance"). Carried for diagnostics only — every cause drives the
/// same state transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidationCause {
    /// The observation's own configuration changed.
    ObservationEdit,
    /// A target referenced by the observation's asterism changed.
    TargetEdit,
    /// A new execution event arrived for this observation.
    ExecutionEvent,
    /// The ITC cache was flushed, so a cached integration time can no
    /// longer be trusted.
    ItcCacheFlush,
    /// The observation's proposal was accepted or withdrawn.
    ProposalAcceptance,
    /// A periodic tick requesting a routine refresh.
    Tick,
}

/// One invalidation, queued for the engine to apply to its entry table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invalidation {
    /// The observation whose entry should move to `Pending`.
    pub observation_id: ObservationId,
    /// Why it was invalidated.
    pub cause: InvalidationCause,
    /// When the invalidation was received.
    pub received: Timestamp,
}

/// A bounded, non-blocking inbound channel of [`Invalidation`]s (§5
/// "Invalidations are non-blocking").
///
/// Backed by [`crossbeam_channel`] so a producer never blocks the
/// upstream collaborator emitting invalidations (observation edits,
/// target edits, the event stream, ...) on a slow or stalled engine.
pub struct IngressQueue {
    sender: crossbeam_channel::Sender<Invalidation>,
    receiver: crossbeam_channel::Receiver<Invalidation>,
}

impl IngressQueue {
    /// A queue holding at most `capacity` unapplied invalidations before
    /// [`Self::sender`] calls start blocking.
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self { sender, receiver }
    }

    /// A clonable handle producers use to push invalidations.
    pub fn sender(&self) -> crossbeam_channel::Sender<Invalidation> {
        self.sender.clone()
    }

    /// Drain every invalidation currently queued without blocking.
    pub fn drain(&self) -> Vec<Invalidation> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_everything_queued_without_blocking() {
        let queue = IngressQueue::bounded(8);
        let sender = queue.sender();
        for i in 0..3 {
            sender
                .send(Invalidation {
                    observation_id: ObservationId(i),
                    cause: InvalidationCause::ObservationEdit,
                    received: Timestamp::new(0).unwrap(),
                })
                .unwrap();
        }
        let drained = queue.drain();
        assert_eq!(drained.len(), 3);
        assert!(queue.drain().is_empty());
    }
}
