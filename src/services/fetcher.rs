// src/services/fetcher.rs

//! Careers page fetcher.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};

/// Source of the raw careers page markup.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page once and return its body.
    async fn fetch(&self) -> Result<String>;
}

/// Fetches the careers page over HTTP.
pub struct HttpFetcher {
    client: Client,
    url: String,
}

impl HttpFetcher {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PageSource for HttpFetcher {
    async fn fetch(&self) -> Result<String> {
        log::debug!("Fetching {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::fetch_transport(&self.url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::fetch_status(&self.url, status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::fetch_transport(&self.url, e))?;

        log::debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body)
    }
}
