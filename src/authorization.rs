use crate::types::{AccountAddress, ConnectionState};
use crate::{RegistryError, Result};

/// Advisory admin gate used to enable add/remove affordances.
///
/// The contract performs the authoritative check; this only avoids
/// submitting transactions that are bound to revert.
#[must_use]
pub const fn can_administer(state: &ConnectionState) -> bool {
    state.is_connected() && state.is_admin()
}

/// # Errors
/// `NotConnected` without an account, `Unauthorized` for a non-admin account.
pub fn require_admin(state: &ConnectionState) -> Result<&AccountAddress> {
    let address = state
        .address()
        .filter(|_| state.is_connected())
        .ok_or(RegistryError::NotConnected)?;

    if can_administer(state) {
        Ok(address)
    } else {
        Err(RegistryError::Unauthorized)
    }
}
