//! HTTP client initialization.

use reqwest::ClientBuilder;

use crate::config::HTTP_REQUEST_TIMEOUT;
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used for the vendor downloads.
///
/// Creates a `reqwest::Client` configured with:
/// - An overall per-request timeout (`HTTP_REQUEST_TIMEOUT`); a timeout fails the
///   request exactly like a connection failure
/// - A User-Agent naming this tool and its version
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client() -> Result<reqwest::Client, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(HTTP_REQUEST_TIMEOUT)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()?;
    Ok(client)
}
