#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use registry::chain::{DEFAULT_CONFIRMATIONS, DEFAULT_CONTRACT_ADDRESS, DEFAULT_POLL_INTERVAL};
use registry::{AccountAddress, ChainSettings, RegistryError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = ".registry/config.toml";
pub const RPC_URL_ENV: &str = "REGISTRY_RPC_URL";
pub const CONTRACT_ADDRESS_ENV: &str = "REGISTRY_CONTRACT_ADDRESS";

/// Values as written in the config file, before validation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub rpc_url: Option<String>,
    pub contract_address: Option<String>,
    pub confirmations: Option<String>,
    pub poll_interval_ms: Option<String>,
}

/// Flags that override every other source.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub contract_address: Option<String>,
}

pub async fn load_settings(path: Option<PathBuf>, overrides: Overrides) -> Result<ChainSettings> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let file = read_file_config(&config_path, explicit).await?;
    resolve(overrides, &file)
}

async fn read_file_config(path: &Path, explicit: bool) -> Result<FileConfig> {
    if !path.exists() {
        if explicit {
            return Err(RegistryError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(FileConfig::default());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RegistryError::ConfigError(format!("Failed to read config: {e}")))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(parse_config_content(&content))
}

/// Applies flag > environment > file > default precedence.
pub fn resolve(overrides: Overrides, file: &FileConfig) -> Result<ChainSettings> {
    let rpc_url = overrides
        .rpc_url
        .or_else(|| env_setting(RPC_URL_ENV))
        .or_else(|| file.rpc_url.clone())
        .filter(|value| !value.trim().is_empty())
        .map(|value| parse_rpc_url(&value))
        .transpose()?;

    let contract_address = overrides
        .contract_address
        .or_else(|| env_setting(CONTRACT_ADDRESS_ENV))
        .or_else(|| file.contract_address.clone())
        .unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string());
    let contract_address = AccountAddress::parse(&contract_address)
        .map_err(|e| RegistryError::ConfigError(format!("Invalid contract address: {e}")))?;

    let confirmations = file
        .confirmations
        .as_deref()
        .map(|raw| parse_number("confirmations", raw))
        .transpose()?
        .map_or(DEFAULT_CONFIRMATIONS, |n| usize::try_from(n).unwrap_or(usize::MAX));

    let poll_interval = file
        .poll_interval_ms
        .as_deref()
        .map(|raw| parse_number("poll_interval_ms", raw))
        .transpose()?
        .map_or(DEFAULT_POLL_INTERVAL, Duration::from_millis);

    Ok(ChainSettings {
        rpc_url,
        contract_address,
        confirmations,
        poll_interval,
    })
}

fn parse_rpc_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| RegistryError::ConfigError(format!("Invalid RPC URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(RegistryError::ConfigError(format!(
            "Unsupported RPC URL scheme: {other}"
        ))),
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| RegistryError::ConfigError(format!("{key} must be a non-negative integer: {raw}")))
}

/// Reads `key = value` lines. Unknown keys are ignored and the last
/// occurrence of a key wins.
pub fn parse_config_content(content: &str) -> FileConfig {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .fold(FileConfig::default(), |mut config, (key, value)| {
            let value = unquote(value);
            match key.trim() {
                "rpc_url" => config.rpc_url = Some(expand_env_vars(value)),
                "contract_address" => config.contract_address = Some(expand_env_vars(value)),
                "confirmations" => config.confirmations = Some(value.to_string()),
                "poll_interval_ms" => config.poll_interval_ms = Some(value.to_string()),
                other => tracing::debug!(key = other, "ignoring unknown config key"),
            }
            config
        })
}

fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(trimmed)
}

/// Expands `${VAR}` and `${VAR:-default}`. Substituted text is not rescanned
/// and an unterminated reference is kept as written.
fn expand_env_vars(input: &str) -> String {
    let mut expanded = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        expanded.push_str(&rest[..start]);
        let reference = &rest[start + 2..start + 2 + len];
        let (name, default) = reference.split_once(":-").unwrap_or((reference, ""));
        expanded.push_str(&env_setting(name).unwrap_or_else(|| default.to_string()));
        rest = &rest[start + 3 + len..];
    }
    expanded.push_str(rest);
    expanded
}

/// A set, non-blank environment value, trimmed.
fn env_setting(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}
