// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete bot stack over a mock sink and a
//! temp-dir identity store. `send()` drives the full identity, dialogue,
//! and scheduler pipeline the way the HTTP gateway would.

use std::sync::Arc;

use cadence_core::types::UserKey;
use cadence_core::{CadenceError, NameResolver};
use cadence_dialogue::{ChatEngine, ReplyCatalog};
use cadence_identity::{IdentityResolver, RequestCredentials};
use cadence_scheduler::{LoaderRunner, SchedulerPolicies};
use cadence_session::{SessionStore, StoreLimits};

use crate::mock_sink::MockSink;

/// Builder for test environments with configurable options.
pub struct TestHarnessBuilder {
    policies: SchedulerPolicies,
    limits: StoreLimits,
    fail_on: Vec<usize>,
    require_identifier: bool,
    name_resolver: Option<Arc<dyn NameResolver>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            policies: SchedulerPolicies::default(),
            limits: StoreLimits::default(),
            fail_on: Vec::new(),
            require_identifier: false,
            name_resolver: None,
        }
    }

    /// Override the scheduler policies.
    pub fn with_policies(mut self, policies: SchedulerPolicies) -> Self {
        self.policies = policies;
        self
    }

    /// Override the session store limits.
    pub fn with_limits(mut self, limits: StoreLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Script sink failures on the given attempt indices.
    pub fn with_sink_failures(mut self, indices: &[usize]) -> Self {
        self.fail_on = indices.to_vec();
        self
    }

    /// Reject requests without an identifier or session token.
    pub fn with_required_identifier(mut self) -> Self {
        self.require_identifier = true;
        self
    }

    /// Install a credential-name resolver.
    pub fn with_name_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.name_resolver = Some(resolver);
        self
    }

    /// Build the harness, creating the temp identity store.
    pub fn build(self) -> Result<TestHarness, CadenceError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| CadenceError::Storage {
            source: e.into(),
        })?;
        let resolver = Arc::new(IdentityResolver::open(
            &temp_dir.path().join("ids.json"),
            self.require_identifier,
        )?);

        let sink = Arc::new(if self.fail_on.is_empty() {
            MockSink::new()
        } else {
            MockSink::failing_on(&self.fail_on)
        });
        let engine = Arc::new(ChatEngine::new(
            Arc::new(SessionStore::new(self.limits)),
            LoaderRunner::new(sink.clone(), self.policies),
            ReplyCatalog::default(),
            chrono_tz::Tz::UTC,
            self.name_resolver,
        ));

        Ok(TestHarness {
            engine,
            resolver,
            sink,
            _temp_dir: temp_dir,
        })
    }
}

/// A fully wired bot stack over mock collaborators.
pub struct TestHarness {
    pub engine: Arc<ChatEngine>,
    pub resolver: Arc<IdentityResolver>,
    pub sink: Arc<MockSink>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Resolve `identifier` and run one chat turn, returning the reply.
    pub async fn send(&self, identifier: &str, message: &str) -> Result<String, CadenceError> {
        let key = self.resolve(identifier).await?;
        self.engine.handle_message(&key, message).await
    }

    /// Resolve an identifier to its user key.
    pub async fn resolve(&self, identifier: &str) -> Result<UserKey, CadenceError> {
        let identity = self
            .resolver
            .resolve(&RequestCredentials {
                identifier: Some(identifier.to_string()),
                session: None,
            })
            .await?;
        Ok(identity.key)
    }

    /// The user's transcript lines.
    pub async fn history(&self, identifier: &str) -> Result<Vec<String>, CadenceError> {
        let key = self.resolve(identifier).await?;
        Ok(self.engine.history(&key).await)
    }
}
