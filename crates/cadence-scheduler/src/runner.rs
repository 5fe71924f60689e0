// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The loader runner: one background task per running loader.
//!
//! A run works from an immutable [`LoaderPlan`] snapshot taken at start,
//! so dialogue-side edits never race an in-flight run. Each tick picks the
//! next credential/message pair per the iteration strategy, delivers
//! through the sink with a per-send timeout, then waits the configured
//! delay. The first delivery happens as soon as the run starts. All
//! outcomes land in the loader's capped log.

use std::sync::Arc;
use std::time::Duration;

use cadence_core::types::{
    ExhaustionPolicy, FailurePolicy, IterationStrategy, LogEntry, LogOutcome,
};
use cadence_core::{CadenceError, MessageSink};
use cadence_session::{Loader, LoaderPlan};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Scheduler policies, snapshotted from config at startup.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerPolicies {
    pub strategy: IterationStrategy,
    pub on_failure: FailurePolicy,
    pub exhaustion: ExhaustionPolicy,
    pub send_timeout: Duration,
}

impl Default for SchedulerPolicies {
    fn default() -> Self {
        Self {
            strategy: IterationStrategy::default(),
            on_failure: FailurePolicy::default(),
            exhaustion: ExhaustionPolicy::default(),
            send_timeout: Duration::from_secs(30),
        }
    }
}

/// Spawns and supervises loader runs.
#[derive(Clone)]
pub struct LoaderRunner {
    sink: Arc<dyn MessageSink>,
    policies: SchedulerPolicies,
}

impl LoaderRunner {
    pub fn new(sink: Arc<dyn MessageSink>, policies: SchedulerPolicies) -> Self {
        Self { sink, policies }
    }

    /// Start a background run for the loader.
    ///
    /// Fails if the loader is incompletely configured or already running.
    /// On success the loader is marked running with a fresh cancellation
    /// token, and the task runs until cancelled, aborted by policy, or
    /// finished by exhaustion.
    pub async fn start(&self, handle: Arc<Mutex<Loader>>) -> Result<JoinHandle<()>, CadenceError> {
        let (plan, cancel) = {
            let mut loader = handle.lock().await;
            if loader.active {
                return Err(CadenceError::Validation(format!(
                    "{} loader {} is already running",
                    loader.kind, loader.index
                )));
            }
            let plan = loader.plan().ok_or_else(|| {
                CadenceError::Validation(format!(
                    "{} loader {} is not fully configured",
                    loader.kind, loader.index
                ))
            })?;
            loader.active = true;
            loader.awaiting = cadence_core::Awaiting::Running;
            loader.cancel = CancellationToken::new();
            (plan, loader.cancel.clone())
        };

        info!(
            kind = %plan.kind,
            index = plan.index,
            credentials = plan.credentials.len(),
            messages = plan.messages.len(),
            delay_secs = plan.delay_secs,
            "loader started"
        );

        let sink = self.sink.clone();
        let policies = self.policies;
        Ok(tokio::spawn(run_loop(sink, policies, handle, plan, cancel)))
    }
}

async fn run_loop(
    sink: Arc<dyn MessageSink>,
    policies: SchedulerPolicies,
    handle: Arc<Mutex<Loader>>,
    plan: LoaderPlan,
    cancel: CancellationToken,
) {
    let delay = Duration::from_secs(plan.delay_secs);
    let pass_len = match policies.strategy {
        IterationStrategy::Lockstep => plan.messages.len(),
        IterationStrategy::Nested => plan.credentials.len() * plan.messages.len(),
    };

    let mut tick: usize = 0;
    loop {
        if cancel.is_cancelled() {
            let mut loader = handle.lock().await;
            loader.push_log(LogEntry::now(LogOutcome::Stopped, "stopped by request"));
            break;
        }

        let (credential, message) = match policies.strategy {
            IterationStrategy::Lockstep => (
                &plan.credentials[tick % plan.credentials.len()],
                &plan.messages[tick % plan.messages.len()],
            ),
            IterationStrategy::Nested => (
                &plan.credentials[(tick / plan.messages.len()) % plan.credentials.len()],
                &plan.messages[tick % plan.messages.len()],
            ),
        };

        let detail = format!(
            "{} -> {} ({})",
            preview(message),
            plan.target_id,
            credential.label()
        );

        let result = deliver_with_timeout(
            sink.as_ref(),
            &plan.target_id,
            message,
            &credential.token,
            policies.send_timeout,
        )
        .await;

        let failed = result.is_err();
        {
            let mut loader = handle.lock().await;
            match result {
                Ok(_) => loader.push_log(LogEntry::now(LogOutcome::Sent, detail)),
                Err(e) => {
                    warn!(
                        kind = %plan.kind,
                        index = plan.index,
                        error = %e,
                        "delivery failed"
                    );
                    loader.push_log(LogEntry::now(LogOutcome::Failed, format!("{detail}: {e}")));
                }
            }
        }

        if failed && policies.on_failure == FailurePolicy::Abort {
            let mut loader = handle.lock().await;
            loader.push_log(LogEntry::now(LogOutcome::Stopped, "aborted after failure"));
            break;
        }

        tick += 1;
        if policies.exhaustion == ExhaustionPolicy::Stop && tick >= pass_len {
            let mut loader = handle.lock().await;
            loader.push_log(LogEntry::now(LogOutcome::Completed, "message list exhausted"));
            break;
        }

        tokio::select! {
            () = cancel.cancelled() => {
                let mut loader = handle.lock().await;
                loader.push_log(LogEntry::now(LogOutcome::Stopped, "stopped by request"));
                break;
            }
            () = tokio::time::sleep(delay) => {}
        }
    }

    let mut loader = handle.lock().await;
    loader.active = false;
    loader.awaiting = cadence_core::Awaiting::Stopped;
    info!(kind = %plan.kind, index = plan.index, "loader finished");
}

async fn deliver_with_timeout(
    sink: &dyn MessageSink,
    target: &str,
    body: &str,
    credential: &str,
    timeout: Duration,
) -> Result<(), CadenceError> {
    match tokio::time::timeout(timeout, sink.deliver(target, body, credential)).await {
        Ok(Ok(_receipt)) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(CadenceError::Timeout { duration: timeout }),
    }
}

/// First 40 characters of a message, for log labels.
fn preview(message: &str) -> String {
    let mut out: String = message.chars().take(40).collect();
    if message.chars().count() > 40 {
        out.push('…');
    }
    out
}
