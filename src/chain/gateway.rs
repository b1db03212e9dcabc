use super::contract::{StudentSystem, StudentSystemEvents};
use super::fault::{classify_contract, classify_provider};
use super::ChainSettings;
use crate::notifications::{Notification, Notifier};
use crate::ports::{EventBatch, PortFuture, RegistryContract, RegistryEventSource, WalletProvider};
use crate::types::{
    AccountAddress, RegistryEvent, StudentId, StudentName, StudentRecord, TxHash,
};
use crate::{RegistryError, Result};
use ethers::providers::{Http, Middleware, PendingTransaction, Provider, RpcError};
use ethers::types::{Address, H256, U256, U64};
use std::str::FromStr;
use std::sync::Arc;

/// JSON-RPC "method not found", returned by nodes without EIP-1102.
const METHOD_NOT_FOUND: i64 = -32601;

struct ChainConnection {
    provider: Arc<Provider<Http>>,
    contract: StudentSystem<Provider<Http>>,
}

/// Registry ports backed by a JSON-RPC node whose unlocked accounts act as
/// the wallet.
pub struct EthersRegistryPorts<N> {
    chain: Option<ChainConnection>,
    settings: ChainSettings,
    notifier: N,
}

impl<N: Notifier> EthersRegistryPorts<N> {
    /// Builds the provider without touching the network.
    ///
    /// # Errors
    /// `ConfigError` when the contract address cannot be used.
    pub fn new(settings: ChainSettings, notifier: N) -> Result<Self> {
        let chain = match &settings.rpc_url {
            Some(url) => {
                let provider = Provider::<Http>::try_from(url.as_str())
                    .map_err(|e| RegistryError::ConfigError(format!("Invalid RPC URL: {e}")))?
                    .interval(settings.poll_interval);
                let provider = Arc::new(provider);
                let address = to_address(&settings.contract_address)
                    .map_err(|_| RegistryError::ConfigError("Invalid contract address".to_string()))?;
                let contract = StudentSystem::new(address, Arc::clone(&provider));
                Some(ChainConnection { provider, contract })
            }
            None => None,
        };

        Ok(Self {
            chain,
            settings,
            notifier,
        })
    }

    #[must_use]
    pub const fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    fn chain(&self) -> Result<&ChainConnection> {
        self.chain.as_ref().ok_or(RegistryError::WalletUnavailable)
    }
}

fn to_address(address: &AccountAddress) -> Result<Address> {
    Address::from_str(address.value())
        .map_err(|e| RegistryError::InvariantViolation(format!("unparseable address: {e}")))
}

fn from_address(address: Address) -> Result<AccountAddress> {
    AccountAddress::parse(&format!("{address:?}"))
}

fn to_student_id(value: U256) -> Result<StudentId> {
    if value > U256::from(u64::MAX) {
        return Err(RegistryError::NetworkFault(format!(
            "student id {value} exceeds supported range"
        )));
    }
    Ok(StudentId::new(value.as_u64()))
}

fn to_event(event: StudentSystemEvents) -> Result<RegistryEvent> {
    Ok(match event {
        StudentSystemEvents::StudentAddedFilter(added) => RegistryEvent::StudentAdded {
            id: to_student_id(added.id)?,
            name: added.name,
            student_id: to_student_id(added.student_id)?,
        },
        StudentSystemEvents::StudentRemovedFilter(removed) => RegistryEvent::StudentRemoved {
            id: to_student_id(removed.id)?,
        },
    })
}

/// Malformed events are logged and skipped so the cursor still advances.
fn decode_events(raw: Vec<StudentSystemEvents>) -> Vec<RegistryEvent> {
    raw.into_iter()
        .filter_map(|event| {
            to_event(event)
                .inspect_err(|err| {
                    tracing::warn!(error = %err, "skipping malformed registry event");
                })
                .ok()
        })
        .collect()
}

impl<N: Notifier> Notifier for EthersRegistryPorts<N> {
    fn post(&self, notification: Notification) {
        self.notifier.post(notification);
    }

    fn dismiss(&self, key: &str) {
        self.notifier.dismiss(key);
    }
}

impl<N: Notifier + Send + Sync> WalletProvider for EthersRegistryPorts<N> {
    fn is_available(&self) -> bool {
        self.chain.is_some()
    }

    fn request_accounts(&self) -> PortFuture<'_, Vec<AccountAddress>> {
        Box::pin(async move {
            let chain = self.chain()?;
            let requested = chain
                .provider
                .request::<_, Vec<Address>>("eth_requestAccounts", ())
                .await;
            let accounts = match requested {
                Ok(accounts) => accounts,
                Err(err)
                    if RpcError::as_error_response(&err)
                        .is_some_and(|response| response.code == METHOD_NOT_FOUND) =>
                {
                    tracing::debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                    chain
                        .provider
                        .get_accounts()
                        .await
                        .map_err(|e| classify_provider(&e))?
                }
                Err(err) => return Err(classify_provider(&err)),
            };
            accounts.into_iter().map(from_address).collect()
        })
    }

    fn accounts(&self) -> PortFuture<'_, Vec<AccountAddress>> {
        Box::pin(async move {
            let accounts = self
                .chain()?
                .provider
                .get_accounts()
                .await
                .map_err(|e| classify_provider(&e))?;
            accounts.into_iter().map(from_address).collect()
        })
    }
}

impl<N: Notifier + Send + Sync> RegistryContract for EthersRegistryPorts<N> {
    fn admin(&self) -> PortFuture<'_, AccountAddress> {
        Box::pin(async move {
            let admin = self
                .chain()?
                .contract
                .admin()
                .call()
                .await
                .map_err(|e| classify_contract(&e))?;
            from_address(admin)
        })
    }

    fn get_student_by_id(&self, id: StudentId) -> PortFuture<'_, StudentRecord> {
        Box::pin(async move {
            let record = self
                .chain()?
                .contract
                .get_student_by_id(U256::from(id.value()))
                .call()
                .await
                .map_err(|e| classify_contract(&e))?;
            Ok(StudentRecord {
                name: record.name,
                id: to_student_id(record.id)?,
                exists: record.exists,
            })
        })
    }

    fn submit_add_student<'a>(
        &'a self,
        from: &'a AccountAddress,
        name: &'a StudentName,
    ) -> PortFuture<'a, TxHash> {
        Box::pin(async move {
            let call = self
                .chain()?
                .contract
                .add_student(name.value().to_string())
                .from(to_address(from)?);
            let pending = call.send().await.map_err(|e| classify_contract(&e))?;
            Ok(TxHash::new(format!("{:?}", pending.tx_hash())))
        })
    }

    fn submit_remove_student<'a>(
        &'a self,
        from: &'a AccountAddress,
        id: StudentId,
    ) -> PortFuture<'a, TxHash> {
        Box::pin(async move {
            let call = self
                .chain()?
                .contract
                .remove_student(U256::from(id.value()))
                .from(to_address(from)?);
            let pending = call.send().await.map_err(|e| classify_contract(&e))?;
            Ok(TxHash::new(format!("{:?}", pending.tx_hash())))
        })
    }

    fn wait_for_confirmation<'a>(&'a self, tx_hash: &'a TxHash) -> PortFuture<'a, ()> {
        Box::pin(async move {
            let chain = self.chain()?;
            let hash = H256::from_str(tx_hash.value()).map_err(|e| {
                RegistryError::InvariantViolation(format!("unparseable tx hash: {e}"))
            })?;

            let receipt = PendingTransaction::new(hash, chain.provider.as_ref())
                .confirmations(self.settings.confirmations)
                .interval(self.settings.poll_interval)
                .await
                .map_err(|e| classify_provider(&e))?
                .ok_or_else(|| {
                    RegistryError::NetworkFault("transaction dropped from mempool".to_string())
                })?;

            if receipt.status == Some(U64::zero()) {
                tracing::warn!(tx_hash = %tx_hash, "transaction reverted on chain");
                return Err(RegistryError::NetworkFault(format!(
                    "transaction {tx_hash} reverted"
                )));
            }
            tracing::debug!(
                tx_hash = %tx_hash,
                block = ?receipt.block_number,
                "transaction confirmed"
            );
            Ok(())
        })
    }
}

impl<N: Notifier + Send + Sync> RegistryEventSource for EthersRegistryPorts<N> {
    fn latest_block(&self) -> PortFuture<'_, u64> {
        Box::pin(async move {
            let head = self
                .chain()?
                .provider
                .get_block_number()
                .await
                .map_err(|e| classify_provider(&e))?;
            Ok(head.as_u64())
        })
    }

    fn events_since(&self, from_block: u64) -> PortFuture<'_, EventBatch> {
        Box::pin(async move {
            let chain = self.chain()?;
            let head = chain
                .provider
                .get_block_number()
                .await
                .map_err(|e| classify_provider(&e))?
                .as_u64();
            if head < from_block {
                return Ok(EventBatch {
                    events: Vec::new(),
                    next_block: from_block,
                });
            }

            let raw = chain
                .contract
                .events()
                .from_block(from_block)
                .to_block(head)
                .query()
                .await
                .map_err(|e| classify_contract(&e))?;
            let events = decode_events(raw);

            Ok(EventBatch {
                events,
                next_block: head.saturating_add(1),
            })
        })
    }
}
