// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message-sink capability: the third-party API that actually
//! delivers a message to a target.

use async_trait::async_trait;

use crate::error::CadenceError;
use crate::types::SinkReceipt;

/// Delivers one message body to a target on behalf of a credential.
///
/// Implementations are opaque to the rest of the system: the scheduler
/// treats any error as a per-attempt failure and applies its configured
/// failure policy. Correctness of the remote API is out of scope.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Deliver `body` to `target` authenticated by `credential`.
    async fn deliver(
        &self,
        target: &str,
        body: &str,
        credential: &str,
    ) -> Result<SinkReceipt, CadenceError>;
}
