use super::identifiers::{AccountAddress, StudentId, TxHash};
use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    address: Option<AccountAddress>,
    connected: bool,
    is_admin: bool,
}

impl ConnectionState {
    #[must_use]
    pub const fn disconnected() -> Self {
        Self {
            address: None,
            connected: false,
            is_admin: false,
        }
    }

    #[must_use]
    pub const fn address(&self) -> Option<&AccountAddress> {
        self.address.as_ref()
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Records a connected account. Admin status is dropped whenever the
    /// address changes and must be recomputed against the contract.
    pub fn connect(&mut self, address: AccountAddress) {
        if self.address.as_ref() != Some(&address) {
            self.is_admin = false;
        }
        self.address = Some(address);
        self.connected = true;
    }

    pub fn disconnect(&mut self) {
        *self = Self::disconnected();
    }

    pub fn set_admin(&mut self, is_admin: bool) {
        self.is_admin = is_admin && self.connected;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub name: String,
    pub id: StudentId,
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    Found(StudentRecord),
    NotFound,
}

impl SearchOutcome {
    #[must_use]
    pub const fn record(&self) -> Option<&StudentRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Add,
    Remove,
}

impl OperationKind {
    /// Stable key shared by every notification this kind posts.
    #[must_use]
    pub const fn notification_key(self) -> &'static str {
        match self {
            Self::Add => "addStudent",
            Self::Remove => "removeStudent",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Add => "Add student",
            Self::Remove => "Remove student",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.notification_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Settlement {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteStage {
    Idle,
    Submitting,
    AwaitingConfirmation,
    Settled(Settlement),
}

impl WriteStage {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Settled(Settlement::Success) => "settled_success",
            Self::Settled(Settlement::Failure) => "settled_failure",
        }
    }

    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting | Self::AwaitingConfirmation)
    }

    /// # Errors
    /// Returns an invariant violation for any edge outside
    /// `Idle -> Submitting -> AwaitingConfirmation -> Settled`, where both
    /// in-flight stages may settle as a failure.
    pub fn advance(self, next: Self) -> Result<Self> {
        let allowed = matches!(
            (self, next),
            (Self::Idle | Self::Settled(_), Self::Submitting)
                | (Self::Submitting, Self::AwaitingConfirmation)
                | (Self::Submitting, Self::Settled(Settlement::Failure))
                | (Self::AwaitingConfirmation, Self::Settled(_))
        );

        if allowed {
            Ok(next)
        } else {
            Err(RegistryError::InvariantViolation(format!(
                "illegal write transition {} -> {}",
                self.as_str(),
                next.as_str()
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOperation {
    kind: OperationKind,
    correlation_id: String,
    stage: WriteStage,
    tx_hash: Option<TxHash>,
}

impl PendingOperation {
    #[must_use]
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            correlation_id: uuid::Uuid::new_v4().to_string(),
            stage: WriteStage::Submitting,
            tx_hash: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    #[must_use]
    pub const fn stage(&self) -> WriteStage {
        self.stage
    }

    #[must_use]
    pub const fn tx_hash(&self) -> Option<&TxHash> {
        self.tx_hash.as_ref()
    }

    /// # Errors
    /// Propagates illegal stage transitions.
    pub fn broadcast(&mut self, tx_hash: TxHash) -> Result<()> {
        self.stage = self.stage.advance(WriteStage::AwaitingConfirmation)?;
        self.tx_hash = Some(tx_hash);
        Ok(())
    }

    /// # Errors
    /// Propagates illegal stage transitions.
    pub fn settle(&mut self, settlement: Settlement) -> Result<()> {
        self.stage = self.stage.advance(WriteStage::Settled(settlement))?;
        Ok(())
    }
}

/// Events the registry contract emits on successful writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    StudentAdded {
        id: StudentId,
        name: String,
        student_id: StudentId,
    },
    StudentRemoved {
        id: StudentId,
    },
}
