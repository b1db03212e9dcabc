use crate::types::{OperationKind, PendingOperation, Settlement, TxHash, WriteStage};
use crate::{RegistryError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Slots {
    pending: HashMap<OperationKind, PendingOperation>,
    last_settled: HashMap<OperationKind, WriteStage>,
}

/// At most one in-flight write per operation kind. Later submissions are
/// rejected rather than queued.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    slots: Mutex<Slots>,
}

impl InFlightTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// # Errors
    /// Returns `Busy` when a write of the same kind is still in flight.
    pub fn try_begin(self: &Arc<Self>, kind: OperationKind) -> Result<InFlightSlot> {
        let mut slots = self.lock();
        if slots
            .pending
            .get(&kind)
            .is_some_and(|operation| operation.stage().is_in_flight())
        {
            return Err(RegistryError::Busy(kind.label().to_string()));
        }
        let operation = PendingOperation::new(kind);
        let correlation_id = operation.correlation_id().to_string();
        slots.pending.insert(kind, operation);
        drop(slots);

        Ok(InFlightSlot {
            tracker: Arc::clone(self),
            kind,
            correlation_id,
        })
    }

    #[must_use]
    pub fn pending(&self, kind: OperationKind) -> Option<PendingOperation> {
        self.lock().pending.get(&kind).cloned()
    }

    /// Current stage of the in-flight write, else the last settlement.
    #[must_use]
    pub fn stage(&self, kind: OperationKind) -> WriteStage {
        let slots = self.lock();
        slots
            .pending
            .get(&kind)
            .map(PendingOperation::stage)
            .or_else(|| slots.last_settled.get(&kind).copied())
            .unwrap_or(WriteStage::Idle)
    }
}

/// Occupies one kind until settled, or until dropped before broadcast.
///
/// Owns its tracker handle so confirmation can finish on a detached task.
#[derive(Debug)]
pub struct InFlightSlot {
    tracker: Arc<InFlightTracker>,
    kind: OperationKind,
    correlation_id: String,
}

impl InFlightSlot {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// # Errors
    /// Propagates illegal stage transitions.
    pub fn broadcast(&self, tx_hash: TxHash) -> Result<()> {
        let mut slots = self.tracker.lock();
        slots
            .pending
            .get_mut(&self.kind)
            .ok_or_else(|| missing_slot(self.kind))?
            .broadcast(tx_hash)
    }

    /// Releases the kind and returns the settled operation.
    ///
    /// # Errors
    /// Propagates illegal stage transitions; the kind is released either way.
    pub fn settle(self, settlement: Settlement) -> Result<PendingOperation> {
        let mut slots = self.tracker.lock();
        let mut operation = slots
            .pending
            .remove(&self.kind)
            .ok_or_else(|| missing_slot(self.kind))?;
        operation.settle(settlement)?;
        slots.last_settled.insert(self.kind, operation.stage());
        Ok(operation)
    }
}

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        let mut slots = self.tracker.lock();
        let unbroadcast = slots
            .pending
            .get(&self.kind)
            .is_some_and(|operation| operation.stage() == WriteStage::Submitting);
        if unbroadcast {
            slots.pending.remove(&self.kind);
            tracing::debug!(kind = %self.kind, correlation_id = %self.correlation_id, "in-flight slot released before broadcast");
        }
    }
}

fn missing_slot(kind: OperationKind) -> RegistryError {
    RegistryError::InvariantViolation(format!("no in-flight {kind} operation"))
}
