// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory message sink for tests.

use async_trait::async_trait;
use cadence_core::types::SinkReceipt;
use cadence_core::{CadenceError, MessageSink};
use tokio::sync::Mutex;

/// One captured delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub target: String,
    pub body: String,
    pub credential: String,
}

/// Message sink that records every delivery and fails on scripted
/// attempt indices (zero-based, in arrival order).
#[derive(Debug, Default)]
pub struct MockSink {
    deliveries: Mutex<Vec<Delivery>>,
    fail_on: Vec<usize>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the deliveries at the given zero-based attempt indices.
    pub fn failing_on(indices: &[usize]) -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            fail_on: indices.to_vec(),
        }
    }

    /// All captured deliveries, in arrival order. Failed attempts are
    /// captured too.
    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }

    /// Number of captured deliveries.
    pub async fn delivery_count(&self) -> usize {
        self.deliveries.lock().await.len()
    }
}

#[async_trait]
impl MessageSink for MockSink {
    async fn deliver(
        &self,
        target: &str,
        body: &str,
        credential: &str,
    ) -> Result<SinkReceipt, CadenceError> {
        let mut deliveries = self.deliveries.lock().await;
        let attempt = deliveries.len();
        deliveries.push(Delivery {
            target: target.to_string(),
            body: body.to_string(),
            credential: credential.to_string(),
        });
        if self.fail_on.contains(&attempt) {
            return Err(CadenceError::Sink {
                message: "scripted failure".to_string(),
                source: None,
            });
        }
        Ok(SinkReceipt {
            id: Some(format!("receipt-{attempt}")),
        })
    }
}

/// Name resolver returning a fixed name for every credential.
#[derive(Debug, Clone)]
pub struct FixedNameResolver(pub String);

#[async_trait]
impl cadence_core::NameResolver for FixedNameResolver {
    async fn resolve_name(&self, _credential: &str) -> Option<String> {
        Some(self.0.clone())
    }
}
