mod identifiers;
mod state;


pub use identifiers::{AccountAddress, StudentId, StudentName, TxHash};
pub use state::{
    ConnectionState, OperationKind, PendingOperation, RegistryEvent, SearchOutcome, Settlement,
    StudentRecord, WriteStage,
};
