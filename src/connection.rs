use crate::notifications::{Notification, Notifier};
use crate::ports::{RegistryContract, WalletProvider};
use crate::types::ConnectionState;
use crate::{RegistryError, Result};
use std::sync::Arc;

/// Tracks the wallet account and its advisory admin status.
pub struct ConnectionManager<P> {
    ports: Arc<P>,
}

impl<P> ConnectionManager<P>
where
    P: WalletProvider + RegistryContract + Notifier + Send + Sync,
{
    #[must_use]
    pub const fn new(ports: Arc<P>) -> Self {
        Self { ports }
    }

    /// Adopts an already-authorized account without prompting.
    ///
    /// # Errors
    /// Returns the provider fault when the account query fails.
    pub async fn check_existing_connection(&self, state: &mut ConnectionState) -> Result<()> {
        if !self.ports.is_available() {
            tracing::debug!("no wallet provider, staying disconnected");
            return Ok(());
        }

        let accounts = self.ports.accounts().await.inspect_err(|err| {
            tracing::error!(error = %err, "checking wallet connection failed");
            self.ports
                .post(Notification::error("Error checking wallet connection"));
        })?;

        match accounts.into_iter().next() {
            Some(account) => {
                tracing::info!(account = %account, "found authorized account");
                state.connect(account);
                self.refresh_admin_status(state).await;
            }
            None => {
                if let Some(address) = state.address() {
                    tracing::info!(account = %address, "account no longer authorized");
                }
                state.disconnect();
            }
        }
        Ok(())
    }

    /// Prompts the wallet for account access.
    ///
    /// # Errors
    /// `WalletUnavailable` without a provider, `UserRejected` when the user
    /// declines, otherwise the provider fault.
    pub async fn request_connection(&self, state: &mut ConnectionState) -> Result<()> {
        if !self.ports.is_available() {
            self.ports
                .post(Notification::error("Please install a wallet provider!"));
            return Err(RegistryError::WalletUnavailable);
        }

        let accounts = match self.ports.request_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                tracing::error!(error = %err, "wallet connection failed");
                let message = match &err {
                    RegistryError::WalletUnavailable => "Please install a wallet provider!",
                    RegistryError::UserRejected(_) => "Wallet connection request rejected",
                    _ => "Failed to connect wallet",
                };
                self.ports.post(Notification::error(message));
                return Err(err);
            }
        };

        let Some(account) = accounts.into_iter().next() else {
            self.ports
                .post(Notification::error("Wallet connection request rejected"));
            return Err(RegistryError::UserRejected(
                "wallet returned no accounts".to_string(),
            ));
        };

        state.connect(account);
        self.ports
            .post(Notification::success("Wallet connected successfully!"));
        self.refresh_admin_status(state).await;
        Ok(())
    }

    /// Compares the connected account with the contract admin.
    ///
    /// Never fails: a fault leaves the account marked as non-admin.
    pub async fn refresh_admin_status(&self, state: &mut ConnectionState) -> bool {
        let Some(address) = state.address().cloned() else {
            state.set_admin(false);
            return false;
        };

        match self.ports.admin().await {
            Ok(admin) => state.set_admin(admin == address),
            Err(err) => {
                tracing::warn!(error = %err, account = %address, "admin lookup failed, treating account as non-admin");
                state.set_admin(false);
            }
        }
        state.is_admin()
    }

    pub fn disconnect(&self, state: &mut ConnectionState) {
        if let Some(address) = state.address() {
            tracing::info!(account = %address, "disconnecting");
        }
        state.disconnect();
    }
}
