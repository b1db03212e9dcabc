#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod contract;
pub mod fault;
mod gateway;

pub use gateway::EthersRegistryPorts;

use crate::types::AccountAddress;
use serde::Serialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x25C15Ad14AF3842232d999DC6f2164D340F51951";
pub const DEFAULT_CONFIRMATIONS: usize = 1;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Where the registry lives and how writes are confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSettings {
    /// Absent when no wallet provider is configured.
    pub rpc_url: Option<Url>,
    pub contract_address: AccountAddress,
    pub confirmations: usize,
    #[serde(with = "millis")]
    pub poll_interval: Duration,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            rpc_url: None,
            contract_address: AccountAddress::from_static(DEFAULT_CONTRACT_ADDRESS),
            confirmations: DEFAULT_CONFIRMATIONS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(value.as_millis())
    }
}
