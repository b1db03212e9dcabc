use crate::notifications::Notifier;
use crate::types::{AccountAddress, RegistryEvent, StudentId, StudentName, StudentRecord, TxHash};
use crate::Result;
use std::future::Future;
use std::pin::Pin;

pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Account access through an external wallet.
///
/// Implementations report a declined prompt as `UserRejected` and a missing
/// provider as `WalletUnavailable`.
pub trait WalletProvider {
    fn is_available(&self) -> bool;

    /// Prompts the wallet for account access.
    fn request_accounts(&self) -> PortFuture<'_, Vec<AccountAddress>>;

    /// Accounts already authorized for this client; never prompts.
    fn accounts(&self) -> PortFuture<'_, Vec<AccountAddress>>;
}

/// Calls against the registry contract.
///
/// Contract reverts arrive already classified: `NotAdmin` as `Unauthorized`,
/// `PersonNotFound` as `NotFound`, anything else as `NetworkFault`.
pub trait RegistryContract {
    fn admin(&self) -> PortFuture<'_, AccountAddress>;

    fn get_student_by_id(&self, id: StudentId) -> PortFuture<'_, StudentRecord>;

    /// Broadcasts `addStudent` signed by `from`, resolving once the network
    /// accepted the transaction into its pending pool.
    fn submit_add_student<'a>(
        &'a self,
        from: &'a AccountAddress,
        name: &'a StudentName,
    ) -> PortFuture<'a, TxHash>;

    fn submit_remove_student<'a>(
        &'a self,
        from: &'a AccountAddress,
        id: StudentId,
    ) -> PortFuture<'a, TxHash>;

    /// Resolves when the transaction is confirmed; a revert or a dropped
    /// transaction is an error.
    fn wait_for_confirmation<'a>(&'a self, tx_hash: &'a TxHash) -> PortFuture<'a, ()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBatch {
    pub events: Vec<RegistryEvent>,
    pub next_block: u64,
}

pub trait RegistryEventSource {
    fn latest_block(&self) -> PortFuture<'_, u64>;

    /// Events emitted from `from_block` up to the current head, plus the
    /// block to resume from.
    fn events_since(&self, from_block: u64) -> PortFuture<'_, EventBatch>;
}

pub trait RegistryPorts: WalletProvider + RegistryContract + Notifier {}

impl<T> RegistryPorts for T where T: WalletProvider + RegistryContract + Notifier {}
