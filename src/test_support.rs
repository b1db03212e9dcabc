#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use crate::notifications::{Notification, NotificationCenter, Notifier};
use crate::ports::{
    EventBatch, PortFuture, RegistryContract, RegistryEventSource, WalletProvider,
};
use crate::types::{
    AccountAddress, RegistryEvent, StudentId, StudentName, StudentRecord, TxHash,
};
use crate::RegistryError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

pub const ADMIN: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const ADMIN_LOWER: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const STRANGER: &str = "0x5555555555555555555555555555555555555555";

pub fn address(raw: &str) -> AccountAddress {
    AccountAddress::parse(raw).expect("valid address")
}

/// Cloneable stand-in for `RegistryError`, which is not `Clone`.
#[derive(Debug, Clone)]
pub enum Fault {
    NotAdmin,
    PersonNotFound,
    Rejected,
    Network(String),
}

impl Fault {
    pub fn to_error(&self) -> RegistryError {
        match self {
            Self::NotAdmin => RegistryError::Unauthorized,
            Self::PersonNotFound => RegistryError::NotFound,
            Self::Rejected => RegistryError::UserRejected("User denied account access".to_string()),
            Self::Network(message) => RegistryError::NetworkFault(message.clone()),
        }
    }
}

#[derive(Debug)]
pub struct FakePorts {
    pub notifications: NotificationCenter,
    wallet_available: bool,
    authorized: Mutex<Vec<AccountAddress>>,
    wallet_accounts: Mutex<Vec<AccountAddress>>,
    request_fault: Mutex<Option<Fault>>,
    accounts_fault: Mutex<Option<Fault>>,
    admin: Mutex<Result<AccountAddress, Fault>>,
    students: Mutex<HashMap<u64, StudentRecord>>,
    lookup_fault: Mutex<Option<Fault>>,
    submit_fault: Mutex<Option<Fault>>,
    confirm_fault: Mutex<Option<Fault>>,
    calls: Mutex<Vec<String>>,
    tx_counter: Mutex<u64>,
    events: Mutex<Vec<(u64, RegistryEvent)>>,
    head: Mutex<u64>,
    pub submit_started: Notify,
    submit_gate: Option<Arc<Notify>>,
    pub confirm_started: Notify,
    confirm_gate: Option<Arc<Notify>>,
}

impl FakePorts {
    pub fn new() -> Self {
        Self {
            notifications: NotificationCenter::new(),
            wallet_available: true,
            authorized: Mutex::new(Vec::new()),
            wallet_accounts: Mutex::new(vec![address(ADMIN)]),
            request_fault: Mutex::new(None),
            accounts_fault: Mutex::new(None),
            admin: Mutex::new(Ok(address(ADMIN))),
            students: Mutex::new(HashMap::new()),
            lookup_fault: Mutex::new(None),
            submit_fault: Mutex::new(None),
            confirm_fault: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            tx_counter: Mutex::new(0),
            events: Mutex::new(Vec::new()),
            head: Mutex::new(0),
            submit_started: Notify::new(),
            submit_gate: None,
            confirm_started: Notify::new(),
            confirm_gate: None,
        }
    }

    pub fn without_wallet(mut self) -> Self {
        self.wallet_available = false;
        self
    }

    pub fn with_authorized(mut self, raw: &str) -> Self {
        self.authorized.get_mut().push(address(raw));
        self
    }

    pub fn with_wallet_account(mut self, raw: &str) -> Self {
        *self.wallet_accounts.get_mut() = vec![address(raw)];
        self
    }

    pub fn with_request_fault(mut self, fault: Fault) -> Self {
        *self.request_fault.get_mut() = Some(fault);
        self
    }

    pub fn with_accounts_fault(mut self, fault: Fault) -> Self {
        *self.accounts_fault.get_mut() = Some(fault);
        self
    }

    pub fn with_admin_fault(mut self, fault: Fault) -> Self {
        *self.admin.get_mut() = Err(fault);
        self
    }

    pub fn with_student(mut self, id: u64, name: &str, exists: bool) -> Self {
        self.students.get_mut().insert(
            id,
            StudentRecord {
                name: name.to_string(),
                id: StudentId::new(id),
                exists,
            },
        );
        self
    }

    pub fn with_lookup_fault(mut self, fault: Fault) -> Self {
        *self.lookup_fault.get_mut() = Some(fault);
        self
    }

    pub fn with_submit_fault(mut self, fault: Fault) -> Self {
        *self.submit_fault.get_mut() = Some(fault);
        self
    }

    pub fn with_confirm_fault(mut self, fault: Fault) -> Self {
        *self.confirm_fault.get_mut() = Some(fault);
        self
    }

    /// Submissions block until the returned handle is notified.
    pub fn with_submit_gate(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.submit_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// Confirmations block until the returned handle is notified.
    pub fn with_confirm_gate(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.confirm_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn with_event(mut self, block: u64, event: RegistryEvent) -> Self {
        self.events.get_mut().push((block, event));
        let head = self.head.get_mut();
        *head = (*head).max(block);
        self
    }

    pub fn with_head(mut self, block: u64) -> Self {
        *self.head.get_mut() = block;
        self
    }

    pub async fn push_event(&self, block: u64, event: RegistryEvent) {
        self.events.lock().await.push((block, event));
        let mut head = self.head.lock().await;
        *head = (*head).max(block);
    }

    pub async fn set_submit_fault(&self, fault: Option<Fault>) {
        *self.submit_fault.lock().await = fault;
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn calls_matching(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    async fn record(&self, call: impl Into<String>) {
        self.calls.lock().await.push(call.into());
    }

    async fn next_tx_hash(&self) -> TxHash {
        let mut counter = self.tx_counter.lock().await;
        *counter += 1;
        TxHash::new(format!("0x{:064x}", *counter))
    }

    async fn submit(&self, call: String) -> crate::Result<TxHash> {
        self.record(call).await;
        self.submit_started.notify_one();
        if let Some(gate) = &self.submit_gate {
            gate.notified().await;
        }
        if let Some(fault) = self.submit_fault.lock().await.clone() {
            return Err(fault.to_error());
        }
        Ok(self.next_tx_hash().await)
    }
}

impl Notifier for FakePorts {
    fn post(&self, notification: Notification) {
        self.notifications.post(notification);
    }

    fn dismiss(&self, key: &str) {
        self.notifications.dismiss(key);
    }
}

impl WalletProvider for FakePorts {
    fn is_available(&self) -> bool {
        self.wallet_available
    }

    fn request_accounts(&self) -> PortFuture<'_, Vec<AccountAddress>> {
        Box::pin(async move {
            self.record("request_accounts").await;
            if let Some(fault) = self.request_fault.lock().await.clone() {
                return Err(fault.to_error());
            }
            let accounts = self.wallet_accounts.lock().await.clone();
            *self.authorized.lock().await = accounts.clone();
            Ok(accounts)
        })
    }

    fn accounts(&self) -> PortFuture<'_, Vec<AccountAddress>> {
        Box::pin(async move {
            self.record("accounts").await;
            if let Some(fault) = self.accounts_fault.lock().await.clone() {
                return Err(fault.to_error());
            }
            Ok(self.authorized.lock().await.clone())
        })
    }
}

impl RegistryContract for FakePorts {
    fn admin(&self) -> PortFuture<'_, AccountAddress> {
        Box::pin(async move {
            self.record("admin").await;
            self.admin.lock().await.clone().map_err(|fault| fault.to_error())
        })
    }

    fn get_student_by_id(&self, id: StudentId) -> PortFuture<'_, StudentRecord> {
        Box::pin(async move {
            self.record(format!("get_student_by_id:{id}")).await;
            if let Some(fault) = self.lookup_fault.lock().await.clone() {
                return Err(fault.to_error());
            }
            Ok(self
                .students
                .lock()
                .await
                .get(&id.value())
                .cloned()
                .unwrap_or(StudentRecord {
                    name: String::new(),
                    id,
                    exists: false,
                }))
        })
    }

    fn submit_add_student<'a>(
        &'a self,
        _from: &'a AccountAddress,
        name: &'a StudentName,
    ) -> PortFuture<'a, TxHash> {
        Box::pin(async move { self.submit(format!("add_student:{name}")).await })
    }

    fn submit_remove_student<'a>(
        &'a self,
        _from: &'a AccountAddress,
        id: StudentId,
    ) -> PortFuture<'a, TxHash> {
        Box::pin(async move { self.submit(format!("remove_student:{id}")).await })
    }

    fn wait_for_confirmation<'a>(&'a self, tx_hash: &'a TxHash) -> PortFuture<'a, ()> {
        Box::pin(async move {
            self.record(format!("wait:{tx_hash}")).await;
            self.confirm_started.notify_one();
            if let Some(gate) = &self.confirm_gate {
                gate.notified().await;
            }
            match self.confirm_fault.lock().await.clone() {
                Some(fault) => Err(fault.to_error()),
                None => Ok(()),
            }
        })
    }
}

impl RegistryEventSource for FakePorts {
    fn latest_block(&self) -> PortFuture<'_, u64> {
        Box::pin(async move { Ok(*self.head.lock().await) })
    }

    fn events_since(&self, from_block: u64) -> PortFuture<'_, EventBatch> {
        Box::pin(async move {
            self.record(format!("events_since:{from_block}")).await;
            let head = *self.head.lock().await;
            let events = self
                .events
                .lock()
                .await
                .iter()
                .filter(|(block, _)| *block >= from_block && *block <= head)
                .map(|(_, event)| event.clone())
                .collect();
            Ok(EventBatch {
                events,
                next_block: head.max(from_block.saturating_sub(1)) + 1,
            })
        })
    }
}
