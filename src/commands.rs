use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::{load_settings, Overrides};
use crate::output::emit_output;
use registry::{
    ChainSettings, ConsoleNotifier, ContractClient, EthersRegistryPorts, LiveRefresh,
    RegistryError, RegistryEvent, Result, SearchOutcome, Session, StudentId, StudentName,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

type Client = ContractClient<EthersRegistryPorts<ConsoleNotifier>>;

/// Name reported in output envelopes.
pub const fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Status => "status",
        Commands::Connect => "connect",
        Commands::Add { .. } => "add",
        Commands::Search { .. } => "search",
        Commands::Remove { .. } => "remove",
        Commands::Watch { .. } => "watch",
    }
}

/// Rejects malformed arguments before any configuration or network work.
pub fn validate(command: &Commands) -> Result<()> {
    match command {
        Commands::Add { name } => StudentName::parse(name).map(|_| ()),
        Commands::Search { id } | Commands::Remove { id } => StudentId::parse(id).map(|_| ()),
        Commands::Status | Commands::Connect | Commands::Watch { .. } => Ok(()),
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    validate(&cli.command)?;

    let settings = load_settings(
        cli.config,
        Overrides {
            rpc_url: cli.rpc_url,
            contract_address: cli.contract_address,
        },
    )
    .await?;
    tracing::debug!(
        rpc_configured = settings.rpc_url.is_some(),
        contract = %settings.contract_address,
        "settings resolved"
    );

    let ports = Arc::new(EthersRegistryPorts::new(settings.clone(), ConsoleNotifier)?);
    let mut client = ContractClient::new(Arc::clone(&ports));
    let output = cli.output;

    match cli.command {
        Commands::Status => {
            client.startup().await?;
            emit_output(output, "status", &status_payload(client.session(), &settings));
            Ok(())
        }
        Commands::Connect => {
            client.connect().await?;
            emit_output(output, "connect", &status_payload(client.session(), &settings));
            Ok(())
        }
        Commands::Add { name } => {
            ensure_connected(&mut client).await?;
            client.view_mut().student_name_input = name;
            let operation = client.add_student().await?;
            emit_output(
                output,
                "add",
                &json!({
                    "message": "Student added successfully!",
                    "operation": operation,
                }),
            );
            Ok(())
        }
        Commands::Search { id } => {
            let record = lookup(&mut client, id).await?;
            let message = format!("#{} {}", record.id, record.name);
            emit_output(output, "search", &json!({ "message": message, "student": record }));
            Ok(())
        }
        Commands::Remove { id } => {
            ensure_connected(&mut client).await?;
            lookup(&mut client, id).await?;
            let operation = client.remove_selected().await?;
            emit_output(
                output,
                "remove",
                &json!({
                    "message": "Student removed successfully!",
                    "operation": operation,
                }),
            );
            Ok(())
        }
        Commands::Watch { duration_ms } => watch(&mut client, ports, output, duration_ms).await,
    }
}

async fn ensure_connected(client: &mut Client) -> Result<()> {
    client.startup().await?;
    if !client.session().connection.is_connected() {
        client.connect().await?;
    }
    Ok(())
}

async fn lookup(client: &mut Client, id: String) -> Result<registry::StudentRecord> {
    client.view_mut().search_id_input = id;
    match client.search().await? {
        SearchOutcome::Found(record) => Ok(record),
        SearchOutcome::NotFound => Err(RegistryError::NotFound),
    }
}

async fn watch(
    client: &mut Client,
    ports: Arc<EthersRegistryPorts<ConsoleNotifier>>,
    output: OutputFormat,
    duration_ms: u64,
) -> Result<()> {
    let period = ports.settings().poll_interval;
    let mut refresh = LiveRefresh::new(ports);
    let from = refresh.start().await?;
    tracing::info!(from_block = from, "watching registry events");

    let shutdown = async move {
        if duration_ms == 0 {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "ctrl-c handler unavailable");
            }
        } else {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }
    };

    refresh
        .run(period, shutdown, |event| {
            client.apply_event(&event);
            emit_output(output, "watch", &event_payload(&event));
        })
        .await
}

fn event_payload(event: &RegistryEvent) -> serde_json::Value {
    let message = match event {
        RegistryEvent::StudentAdded { id, name, .. } => format!("added #{id} {name}"),
        RegistryEvent::StudentRemoved { id } => format!("removed #{id}"),
    };
    json!({ "message": message, "event": event })
}

fn status_payload(session: &Session, settings: &ChainSettings) -> serde_json::Value {
    let connection = &session.connection;
    let message = match connection.address() {
        Some(address) if connection.is_admin() => format!("{} (admin)", address.short()),
        Some(address) => address.short(),
        None if settings.rpc_url.is_none() => "No wallet provider configured".to_string(),
        None => "Not connected".to_string(),
    };
    json!({
        "message": message,
        "connection": connection,
        "contract": settings.contract_address,
    })
}
