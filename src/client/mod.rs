#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod view;


pub use view::ViewState;

use crate::authorization::can_administer;
use crate::connection::ConnectionManager;
use crate::directory::StudentDirectoryClient;
use crate::ports::RegistryPorts;
use crate::types::{ConnectionState, PendingOperation, RegistryEvent, SearchOutcome};
use crate::{RegistryError, Result};
use serde::Serialize;
use std::sync::Arc;

/// Session-scoped state handed explicitly to every operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    pub connection: ConnectionState,
    pub view: ViewState,
}

/// Single entry point tying the wallet connection, the directory operations
/// and the view-model together.
pub struct ContractClient<P> {
    connection: ConnectionManager<P>,
    directory: StudentDirectoryClient<P>,
    session: Session,
}

impl<P> ContractClient<P>
where
    P: RegistryPorts + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(ports: Arc<P>) -> Self {
        Self {
            connection: ConnectionManager::new(Arc::clone(&ports)),
            directory: StudentDirectoryClient::new(ports),
            session: Session::default(),
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.session.view
    }

    #[must_use]
    pub const fn directory(&self) -> &StudentDirectoryClient<P> {
        &self.directory
    }

    #[must_use]
    pub const fn can_administer(&self) -> bool {
        can_administer(&self.session.connection)
    }

    /// # Errors
    /// Propagates the provider fault from the account query.
    pub async fn startup(&mut self) -> Result<()> {
        self.connection
            .check_existing_connection(&mut self.session.connection)
            .await
    }

    /// # Errors
    /// See [`ConnectionManager::request_connection`].
    pub async fn connect(&mut self) -> Result<()> {
        self.connection
            .request_connection(&mut self.session.connection)
            .await
    }

    pub fn disconnect(&mut self) {
        self.connection.disconnect(&mut self.session.connection);
    }

    /// Adds the student named in the name input.
    ///
    /// # Errors
    /// See [`StudentDirectoryClient::add_student`].
    pub async fn add_student(&mut self) -> Result<PendingOperation> {
        let result = self
            .directory
            .add_student(
                &self.session.connection,
                &self.session.view.student_name_input,
            )
            .await;

        match &result {
            Ok(_) => {
                let view = &mut self.session.view;
                view.student_name_input.clear();
                view.close_modal();
                view.invalidate_directory();
            }
            Err(RegistryError::Unauthorized) => self.regate().await,
            Err(_) => {}
        }
        result
    }

    /// Looks up the id in the search input and shows the record if found.
    ///
    /// # Errors
    /// See [`StudentDirectoryClient::search`].
    pub async fn search(&mut self) -> Result<SearchOutcome> {
        let result = self
            .directory
            .search(&self.session.view.search_id_input)
            .await;

        if !matches!(result, Err(RegistryError::Validation(_))) {
            self.session.view.clear_selection();
        }
        if let Ok(SearchOutcome::Found(record)) = &result {
            self.session.view.show(record.clone());
        }
        result
    }

    /// Removes the currently displayed student.
    ///
    /// # Errors
    /// `Validation` when nothing is selected, otherwise see
    /// [`StudentDirectoryClient::remove_student_by_id`].
    pub async fn remove_selected(&mut self) -> Result<PendingOperation> {
        let Some(id) = self.session.view.selected().map(|record| record.id) else {
            return Err(RegistryError::Validation(
                "No student selected".to_string(),
            ));
        };

        let result = self
            .directory
            .remove_student_by_id(&self.session.connection, id)
            .await;

        match &result {
            Ok(_) => {
                let view = &mut self.session.view;
                view.clear_selection();
                view.close_modal();
                view.invalidate_directory();
            }
            Err(RegistryError::Unauthorized) => self.regate().await,
            Err(_) => {}
        }
        result
    }

    /// Applies a contract event observed by live refresh.
    pub fn apply_event(&mut self, event: &RegistryEvent) {
        let view = &mut self.session.view;
        view.invalidate_directory();

        if let RegistryEvent::StudentRemoved { id } = event {
            if view.selected().is_some_and(|record| record.id == *id) {
                view.clear_selection();
                view.close_modal();
            }
        }
    }

    async fn regate(&mut self) {
        if self.session.connection.is_connected() {
            self.connection
                .refresh_admin_status(&mut self.session.connection)
                .await;
        }
    }
}
