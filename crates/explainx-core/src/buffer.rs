//! The per-request trace buffer.
//!
//! `TraceBuffer` keeps records in call-start order. The recorder reserves a
//! slot when a traced call begins and fills it when the call returns, so a
//! nested call that finishes first still lands after its caller.
//!
//! All state sits behind one `Mutex`; `drain()` reads and clears under a
//! single lock acquisition, so no record can be lost or duplicated between
//! the read and the clear.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use explainx_contracts::record::CallRecord;

// ── Internal mutable state ────────────────────────────────────────────────────

enum Slot {
    /// Reserved at call entry, not yet finished.
    Pending { function: String },
    Done(CallRecord),
}

struct BufferState {
    slots: Vec<Slot>,
    /// Bumped by `reset()` and `drain()`. Tickets issued before the bump
    /// refer to slots that no longer exist.
    generation: u64,
}

/// A reserved position in the buffer, returned by `begin_call`.
#[derive(Debug)]
#[must_use = "a reserved slot stays pending until finish_call is given its ticket"]
pub struct SlotTicket {
    index: usize,
    generation: u64,
}

// ── Public buffer ─────────────────────────────────────────────────────────────

/// Ordered call records for one logical request.
pub struct TraceBuffer {
    state: Mutex<BufferState>,
}

impl TraceBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BufferState { slots: Vec::new(), generation: 0 }),
        }
    }

    // Tracing must never take a request down, so a poisoned lock is recovered
    // rather than propagated: the slot vector is valid after any panic.
    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Discard everything, including reserved slots.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.slots.clear();
        state.generation += 1;
    }

    /// Append an already-finished record at the end.
    pub fn append(&self, record: CallRecord) {
        self.lock().slots.push(Slot::Done(record));
    }

    /// Reserve the next position for a call that is starting now.
    pub fn begin_call(&self, function: &str) -> SlotTicket {
        let mut state = self.lock();
        state.slots.push(Slot::Pending { function: function.to_string() });
        SlotTicket {
            index: state.slots.len() - 1,
            generation: state.generation,
        }
    }

    /// Fill a slot reserved by `begin_call`.
    ///
    /// A ticket from before the last `reset()`/`drain()` no longer has a slot;
    /// its record is dropped.
    pub fn finish_call(&self, ticket: SlotTicket, record: CallRecord) {
        let mut state = self.lock();
        if ticket.generation != state.generation {
            warn!(
                function = %record.function(),
                "record finished after its buffer was drained; dropping it"
            );
            return;
        }
        match state.slots.get_mut(ticket.index) {
            Some(slot) if matches!(slot, Slot::Pending { .. }) => *slot = Slot::Done(record),
            _ => warn!(
                function = %record.function(),
                slot = ticket.index,
                "slot ticket does not match a pending slot; dropping record"
            ),
        }
    }

    /// Take every finished record in order and leave the buffer empty.
    ///
    /// Slots still pending (a traced call that panicked, or one still running
    /// on another thread) are discarded.
    pub fn drain(&self) -> Vec<CallRecord> {
        let mut state = self.lock();
        let slots = std::mem::take(&mut state.slots);
        state.generation += 1;
        drop(state);

        let mut records = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot {
                Slot::Done(record) => records.push(record),
                Slot::Pending { function } => warn!(
                    function = %function,
                    "discarding unfinished traced call at drain"
                ),
            }
        }

        debug!(record_count = records.len(), "trace buffer drained");
        records
    }

    /// Number of finished records.
    pub fn len(&self) -> usize {
        self.lock()
            .slots
            .iter()
            .filter(|s| matches!(s, Slot::Done(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
