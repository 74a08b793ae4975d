//! CLI command implementations.

pub mod auth;
pub mod cart;
pub mod listings;

use thiserror::Error;
use tunda_client::{ClientConfig, ClientError, ConfigError, TundaClient};

/// Errors shared by every command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The client could not be assembled.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// An API call failed.
    #[error(transparent)]
    Api(#[from] tunda_client::ApiError),

    /// Durable storage failed.
    #[error(transparent)]
    Storage(#[from] tunda_client::StorageError),
}

/// Build the client from the environment and restore the stored session.
pub async fn build_client() -> Result<TundaClient, CommandError> {
    let config = ClientConfig::from_env()?;
    let client = TundaClient::new(&config)?;
    client.session().initialize().await;
    Ok(client)
}
