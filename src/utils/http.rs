// src/utils/http.rs

//! HTTP client utilities.

use crate::error::Result;
use crate::models::SourceConfig;

/// Create the shared asynchronous HTTP client.
///
/// No request timeout is set; transport defaults apply.
pub fn create_client(config: &SourceConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .build()?;
    Ok(client)
}
