use crate::RegistryError;
use ethers::contract::ContractError;
use ethers::providers::{Middleware, MiddlewareError, ProviderError, RpcError};
use ethers::utils::id;

/// EIP-1193 code a wallet returns when the user declines a request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Maps revert data to the contract's custom errors.
#[must_use]
pub fn classify_revert(data: &[u8], raw: &str) -> RegistryError {
    match data.get(..4) {
        Some(selector) if selector == id("NotAdmin()") => RegistryError::Unauthorized,
        Some(selector) if selector == id("PersonNotFound()") => RegistryError::NotFound,
        _ => RegistryError::NetworkFault(raw.to_string()),
    }
}

/// Maps a JSON-RPC error response, looking for revert data and wallet rejection.
#[must_use]
pub fn classify_rpc(code: i64, revert: Option<&[u8]>, raw: &str) -> RegistryError {
    if code == USER_REJECTED_CODE {
        return RegistryError::UserRejected(raw.to_string());
    }
    revert.map_or_else(
        || RegistryError::NetworkFault(raw.to_string()),
        |data| classify_revert(data, raw),
    )
}

#[must_use]
pub fn classify_provider(err: &ProviderError) -> RegistryError {
    let raw = err.to_string();
    match RpcError::as_error_response(err) {
        Some(response) => {
            let revert = response.as_revert_data();
            classify_rpc(response.code, revert.as_deref(), &response.message)
        }
        None => RegistryError::NetworkFault(raw),
    }
}

#[must_use]
pub fn classify_contract<M: Middleware>(err: &ContractError<M>) -> RegistryError {
    if let Some(data) = err.as_revert() {
        return classify_revert(data, &err.to_string());
    }
    match err {
        ContractError::ProviderError { e } => classify_provider(e),
        ContractError::MiddlewareError { e } => match MiddlewareError::as_error_response(e) {
            Some(response) => {
                let revert = response.as_revert_data();
                classify_rpc(response.code, revert.as_deref(), &response.message)
            }
            None => RegistryError::NetworkFault(e.to_string()),
        },
        other => RegistryError::NetworkFault(other.to_string()),
    }
}
