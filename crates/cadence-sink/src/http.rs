// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP implementation of the message sink.
//!
//! Delivers messages by POSTing `{"message": ...}` to an endpoint URL
//! template, with the credential token as an `access_token` query
//! parameter. The `{target}` placeholder in the template is replaced with
//! the loader's target identifier per delivery.

use std::time::Duration;

use async_trait::async_trait;
use cadence_core::types::SinkReceipt;
use cadence_core::{CadenceError, MessageSink, NameResolver};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Request body sent for each delivery.
#[derive(Debug, Serialize)]
struct DeliveryBody<'a> {
    message: &'a str,
}

/// Response body fields the sink cares about. Everything else is ignored.
#[derive(Debug, Deserialize)]
struct DeliveryResponse {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NameResponse {
    #[serde(default)]
    name: Option<String>,
}

/// Message sink that POSTs to a `{target}`-templated HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint_template: String,
}

impl HttpSink {
    /// Build the sink over the given endpoint template.
    ///
    /// The template must contain a `{target}` placeholder; config
    /// validation enforces this before the sink is constructed.
    pub fn new(endpoint_template: impl Into<String>) -> Result<Self, CadenceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| CadenceError::Sink {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            endpoint_template: endpoint_template.into(),
        })
    }

    fn url_for(&self, target: &str) -> String {
        self.endpoint_template.replace("{target}", target)
    }
}

#[async_trait]
impl MessageSink for HttpSink {
    async fn deliver(
        &self,
        target: &str,
        body: &str,
        credential: &str,
    ) -> Result<SinkReceipt, CadenceError> {
        let url = self.url_for(target);
        let response = self
            .client
            .post(&url)
            .query(&[("access_token", credential)])
            .json(&DeliveryBody { message: body })
            .send()
            .await
            .map_err(|e| CadenceError::Sink {
                message: format!("delivery request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, target, "sink rejected delivery");
            return Err(CadenceError::Sink {
                message: format!("sink returned {status}: {text}"),
                source: None,
            });
        }

        // Some sinks return an id for the delivery; tolerate any body shape.
        let receipt = response
            .json::<DeliveryResponse>()
            .await
            .map(|r| SinkReceipt { id: r.id })
            .unwrap_or_default();
        debug!(target, id = ?receipt.id, "delivery accepted");
        Ok(receipt)
    }
}

/// Name resolver that GETs a profile endpoint with the credential token.
///
/// Used only to label credentials in loader logs; any failure resolves
/// to `None`.
#[derive(Debug, Clone)]
pub struct HttpNameResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNameResolver {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, CadenceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CadenceError::Sink {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl NameResolver for HttpNameResolver {
    async fn resolve_name(&self, credential: &str) -> Option<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("access_token", credential)])
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            debug!(status = %response.status(), "name lookup rejected");
            return None;
        }
        response.json::<NameResponse>().await.ok()?.name
    }
}
