#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod in_flight;

#[cfg(test)]
mod tests;

pub use in_flight::{InFlightSlot, InFlightTracker};

use crate::authorization::require_admin;
use crate::notifications::{Notification, Notifier};
use crate::ports::RegistryContract;
use crate::types::{
    ConnectionState, OperationKind, PendingOperation, SearchOutcome, Settlement, StudentId,
    StudentName, TxHash, WriteStage,
};
use crate::{RegistryError, Result};
use std::sync::Arc;

const STUDENT_NOT_FOUND: &str = "Student not found";

/// Add, search and remove against the registry contract.
///
/// Writes move through `Submitting -> AwaitingConfirmation -> Settled`, with
/// one in-flight write per kind. Every fault posts exactly one notification
/// and releases the kind so the user can retry.
pub struct StudentDirectoryClient<P> {
    ports: Arc<P>,
    in_flight: Arc<InFlightTracker>,
}

impl<P> StudentDirectoryClient<P>
where
    P: RegistryContract + Notifier + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(ports: Arc<P>) -> Self {
        Self {
            ports,
            in_flight: Arc::new(InFlightTracker::new()),
        }
    }

    #[must_use]
    pub fn pending(&self, kind: OperationKind) -> Option<PendingOperation> {
        self.in_flight.pending(kind)
    }

    #[must_use]
    pub fn stage(&self, kind: OperationKind) -> WriteStage {
        self.in_flight.stage(kind)
    }

    /// Submits `addStudent` and waits for confirmation.
    ///
    /// # Errors
    /// `Validation` for a blank name, `NotConnected`/`Unauthorized` from the
    /// admin gate, `Busy` while another add is in flight, otherwise the
    /// classified contract or network fault.
    pub async fn add_student(
        &self,
        connection: &ConnectionState,
        name_input: &str,
    ) -> Result<PendingOperation> {
        let name = StudentName::parse(name_input).inspect_err(|err| self.reject(err))?;
        let from = self.gate(connection, OperationKind::Add)?;
        let slot = self.begin(OperationKind::Add)?;

        tracing::info!(
            correlation_id = slot.correlation_id(),
            from = %from,
            "submitting addStudent"
        );
        let submitted = self.ports.submit_add_student(from, &name).await;
        self.settle_write(slot, submitted).await
    }

    /// Parses `id_input` and removes that student.
    ///
    /// # Errors
    /// `Validation` for an empty or non-numeric id, otherwise as
    /// [`Self::remove_student_by_id`].
    pub async fn remove_student(
        &self,
        connection: &ConnectionState,
        id_input: &str,
    ) -> Result<PendingOperation> {
        let id = StudentId::parse(id_input).inspect_err(|err| self.reject(err))?;
        self.remove_student_by_id(connection, id).await
    }

    /// # Errors
    /// `NotConnected`/`Unauthorized` from the admin gate, `Busy` while
    /// another removal is in flight, otherwise the classified fault.
    pub async fn remove_student_by_id(
        &self,
        connection: &ConnectionState,
        id: StudentId,
    ) -> Result<PendingOperation> {
        let from = self.gate(connection, OperationKind::Remove)?;
        let slot = self.begin(OperationKind::Remove)?;

        tracing::info!(
            correlation_id = slot.correlation_id(),
            from = %from,
            student_id = %id,
            "submitting removeStudent"
        );
        let submitted = self.ports.submit_remove_student(from, id).await;
        self.settle_write(slot, submitted).await
    }

    /// Read-only lookup. A missing record is a normal `NotFound` outcome.
    ///
    /// # Errors
    /// `Validation` for an empty or non-numeric id, otherwise any fault other
    /// than `PersonNotFound`.
    pub async fn search(&self, id_input: &str) -> Result<SearchOutcome> {
        let id = StudentId::parse(id_input).inspect_err(|err| self.reject(err))?;

        tracing::debug!(student_id = %id, "fetching student");
        match self.ports.get_student_by_id(id).await {
            Ok(record) if record.exists => Ok(SearchOutcome::Found(record)),
            Ok(_) | Err(RegistryError::NotFound) => {
                self.ports.post(Notification::warning(STUDENT_NOT_FOUND));
                Ok(SearchOutcome::NotFound)
            }
            Err(err) => {
                tracing::warn!(student_id = %id, error = %err, "search failed");
                self.ports
                    .post(Notification::error(format!("Failed to search student: {err}")));
                Err(err)
            }
        }
    }

    fn reject(&self, err: &RegistryError) {
        self.ports.post(Notification::warning(err.to_string()));
    }

    fn gate<'c>(
        &self,
        connection: &'c ConnectionState,
        kind: OperationKind,
    ) -> Result<&'c crate::types::AccountAddress> {
        require_admin(connection).inspect_err(|err| {
            let message = match err {
                RegistryError::NotConnected => "Please connect your wallet".to_string(),
                _ => only_admin_message(kind),
            };
            self.ports.post(Notification::warning(message));
        })
    }

    fn begin(&self, kind: OperationKind) -> Result<InFlightSlot> {
        self.in_flight.try_begin(kind).inspect_err(|err| {
            tracing::debug!(kind = %kind, "rejected duplicate submission");
            self.ports.post(Notification::warning(err.to_string()));
        })
    }

    /// Once broadcast, confirmation runs on a detached task that owns the
    /// slot, so dropping the caller cannot release the kind or lose the
    /// settlement notification.
    async fn settle_write(
        &self,
        slot: InFlightSlot,
        submitted: Result<TxHash>,
    ) -> Result<PendingOperation> {
        let tx_hash = match submitted {
            Ok(tx_hash) => tx_hash,
            Err(err) => return finish(self.ports.as_ref(), slot, Err(err)),
        };

        let kind = slot.kind();
        slot.broadcast(tx_hash.clone())?;
        tracing::info!(
            correlation_id = slot.correlation_id(),
            tx_hash = %tx_hash,
            "{} broadcast, awaiting confirmation",
            kind.notification_key()
        );
        self.ports.post(
            Notification::info(progress_message(kind))
                .keyed(kind.notification_key())
                .sticky(),
        );

        let ports = Arc::clone(&self.ports);
        tokio::spawn(async move {
            let confirmed = ports.wait_for_confirmation(&tx_hash).await;
            finish(ports.as_ref(), slot, confirmed)
        })
        .await
        .map_err(|err| {
            RegistryError::InvariantViolation(format!("confirmation task failed: {err}"))
        })?
    }
}

fn finish<P: Notifier>(
    ports: &P,
    slot: InFlightSlot,
    confirmed: Result<()>,
) -> Result<PendingOperation> {
    let kind = slot.kind();
    let key = kind.notification_key();
    match confirmed {
        Ok(()) => {
            let operation = slot.settle(Settlement::Success)?;
            tracing::info!(correlation_id = operation.correlation_id(), "{key} confirmed");
            ports.post(Notification::success(success_message(kind)).keyed(key));
            Ok(operation)
        }
        Err(err) => {
            let correlation_id = slot.correlation_id().to_string();
            slot.settle(Settlement::Failure)?;
            tracing::warn!(correlation_id = %correlation_id, error = %err, "{key} failed");
            ports.post(Notification::error(failure_message(kind, &err)).keyed(key));
            Err(err)
        }
    }
}

fn only_admin_message(kind: OperationKind) -> String {
    match kind {
        OperationKind::Add => "Only admin can add students".to_string(),
        OperationKind::Remove => "Only admin can remove students".to_string(),
    }
}

const fn progress_message(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Add => "Adding student...",
        OperationKind::Remove => "Removing student...",
    }
}

const fn success_message(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Add => "Student added successfully!",
        OperationKind::Remove => "Student removed successfully!",
    }
}

/// User-facing text for a failed write. Known contract faults get fixed
/// wording; everything else carries the raw diagnostic.
#[must_use]
pub fn failure_message(kind: OperationKind, err: &RegistryError) -> String {
    match (kind, err) {
        (_, RegistryError::Unauthorized) => only_admin_message(kind),
        (OperationKind::Remove, RegistryError::NotFound) => STUDENT_NOT_FOUND.to_string(),
        (OperationKind::Add, _) => format!("Failed to add student: {err}"),
        (OperationKind::Remove, _) => format!("Failed to remove student: {err}"),
    }
}
