//! Milvus client factory.
//!
//! Builds a client for a transport name from the connection settings,
//! applying the token, database and timeout.

use crate::client::MilvusClient;
use crate::providers::{MockClient, RestClient};
use sectiondb_core::{AppError, AppResult, MilvusSettings};
use std::sync::Arc;
use std::time::Duration;

/// Create a Milvus client.
///
/// # Arguments
/// * `transport` - Transport identifier ("rest", "mock")
/// * `settings` - Address, credentials and timeout
///
/// # Errors
/// Returns error if the transport is unknown or the HTTP client cannot be built.
pub fn create_client(
    transport: &str,
    settings: &MilvusSettings,
) -> AppResult<Arc<dyn MilvusClient>> {
    match transport.to_lowercase().as_str() {
        "rest" | "http" => {
            let mut client = RestClient::new(&settings.addr);
            if let Some(token) = &settings.token {
                client = client.with_token(token);
            }
            if let Some(database) = &settings.database {
                client = client.with_database(database);
            }
            if settings.timeout_secs > 0 {
                client = client.with_timeout(Duration::from_secs(settings.timeout_secs))?;
            }

            tracing::debug!("Created REST client for {}", client.base_url());
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockClient::new())),
        _ => Err(AppError::Config(format!(
            "Unknown Milvus transport: {}. Supported: rest, mock",
            transport
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rest_client() {
        let client = create_client("rest", &MilvusSettings::default()).unwrap();
        assert_eq!(client.transport_name(), "rest");
    }

    #[test]
    fn test_create_mock_client() {
        let client = create_client("mock", &MilvusSettings::default()).unwrap();
        assert_eq!(client.transport_name(), "mock");
    }

    #[test]
    fn test_unknown_transport() {
        match create_client("grpc", &MilvusSettings::default()) {
            Err(err) => assert!(err.to_string().contains("Unknown Milvus transport")),
            Ok(_) => panic!("Expected error for unknown transport"),
        }
    }
}
