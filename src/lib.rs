pub mod authorization;
pub mod chain;
pub mod client;
pub mod connection;
pub mod directory;
pub mod error;
pub mod live_refresh;
pub mod notifications;
pub mod ports;
pub mod types;

#[cfg(test)]
mod test_support;

pub use chain::{ChainSettings, EthersRegistryPorts};
pub use client::{ContractClient, Session, ViewState};
pub use error::{RegistryError, Result};
pub use live_refresh::LiveRefresh;
pub use notifications::{ConsoleNotifier, Notification, NotificationCenter, Notifier};
pub use types::*;
