//! Persistence bridge: loads and saves whole layouts on the layout service.
//!
//! DESIGN
//! ======
//! A layout is always read and written as a complete ordered element list.
//! Save replaces the stored layout; there is no per-element patching. The
//! [`LayoutService`] trait is the seam the editor session talks to, so tests
//! and alternative backends can stand in for [`HttpLayoutService`].
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-2xx responses, and undecodable bodies are all
//! returned as [`BridgeError`]. Field-level oddities inside a decodable body
//! (string numbers, missing rotation, legacy id fields) are not errors; they
//! are normalized in [`crate::wire`].

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

use plot_canvas::doc::Element;

use crate::config::BridgeConfig;
use crate::wire::{self, WireError};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request could not be sent or the body could not be read.
    #[error("layout request failed: {0}")]
    Request(String),

    /// The layout service answered with a non-success status.
    #[error("layout service returned status {status}")]
    Status { status: u16, body: String },

    /// The response body is not JSON.
    #[error("layout response parse failed: {0}")]
    Parse(String),

    /// The response body is JSON but holds no element list.
    #[error(transparent)]
    Shape(#[from] WireError),
}

impl BridgeError {
    /// Whether the layout was not found, as opposed to any other failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

// =============================================================================
// LAYOUT SERVICE TRAIT
// =============================================================================

/// Whole-layout load and save. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LayoutService: Send + Sync {
    /// Fetch the layout for `id`, normalized, in z-order.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] if the layout cannot be fetched or decoded.
    async fn load_layout(&self, id: &str) -> Result<Vec<Element>, BridgeError>;

    /// Replace the stored layout for `id` with `elements`.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] if the service does not accept the layout.
    async fn save_layout(&self, id: &str, elements: &[Element]) -> Result<(), BridgeError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpLayoutService {
    http: reqwest::Client,
    config: BridgeConfig,
}

impl HttpLayoutService {
    /// Build a client with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::HttpClientBuild`] if the TLS backend cannot be initialized.
    pub fn new(config: BridgeConfig) -> Result<Self, BridgeError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| BridgeError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl LayoutService for HttpLayoutService {
    async fn load_layout(&self, id: &str) -> Result<Vec<Element>, BridgeError> {
        let url = self.config.layout_url(id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| BridgeError::Request(e.to_string()))?;

        let text = read_success_body(response).await?;
        let body: serde_json::Value = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| BridgeError::Parse(e.to_string()))?
        };

        let elements = wire::parse_layout(body)?;
        tracing::info!(%id, count = elements.len(), "layout loaded");
        Ok(elements)
    }

    async fn save_layout(&self, id: &str, elements: &[Element]) -> Result<(), BridgeError> {
        let url = self.config.layout_url(id);
        let response = self
            .http
            .post(&url)
            .json(&wire::save_payload(elements))
            .send()
            .await
            .map_err(|e| BridgeError::Request(e.to_string()))?;

        read_success_body(response).await?;
        tracing::info!(%id, count = elements.len(), "layout saved");
        Ok(())
    }
}

/// Read the body, turning a non-2xx status into [`BridgeError::Status`].
async fn read_success_body(response: reqwest::Response) -> Result<String, BridgeError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| BridgeError::Request(e.to_string()))?;

    if !status.is_success() {
        return Err(BridgeError::Status { status: status.as_u16(), body: text });
    }
    Ok(text)
}
