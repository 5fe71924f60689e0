// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dialogue state machine.
//!
//! Interprets one chat turn against the loader currently collecting input.
//! Confirmed fields are immutable through this path: each state only
//! mutates the field it is collecting, and malformed input re-prompts in
//! the same state without advancing.

use std::sync::Arc;

use cadence_core::types::{Awaiting, Credential};
use cadence_core::NameResolver;
use cadence_scheduler::LoaderRunner;
use cadence_session::Loader;
use tokio::sync::Mutex;
use tracing::debug;

use crate::reply::ReplyCatalog;

/// Advance the loader's dialogue by one turn and produce the reply.
pub async fn step(
    handle: &Arc<Mutex<Loader>>,
    input: &str,
    replies: &ReplyCatalog,
    runner: &LoaderRunner,
    name_resolver: Option<&dyn NameResolver>,
) -> String {
    let input = input.trim();
    let is_done = input.eq_ignore_ascii_case("done");

    let mut loader = handle.lock().await;
    debug!(kind = %loader.kind, index = loader.index, state = %loader.awaiting, "dialogue turn");

    match loader.awaiting {
        Awaiting::Tokens => {
            if is_done {
                if loader.credentials.is_empty() {
                    return replies.need_tokens();
                }
                loader.awaiting = Awaiting::Target;
                return replies.prompt_target();
            }
            let mut added = 0;
            for token in split_items(input) {
                let mut credential = Credential::new(token);
                if let Some(resolver) = name_resolver {
                    credential.display_name = resolver.resolve_name(&credential.token).await;
                }
                loader.credentials.push(credential);
                added += 1;
            }
            if added == 0 {
                return replies.need_tokens();
            }
            let total = loader.credentials.len();
            replies.tokens_added(added, total)
        }

        Awaiting::Target => {
            if input.is_empty() {
                return replies.need_target();
            }
            loader.target_id = Some(input.to_string());
            loader.awaiting = Awaiting::Messages;
            replies.target_set(input)
        }

        Awaiting::Messages => {
            if is_done {
                if loader.messages.is_empty() {
                    return replies.need_messages();
                }
                loader.awaiting = Awaiting::Delay;
                return replies.prompt_delay();
            }
            let items = split_items(input);
            let added = items.len();
            if added == 0 {
                return replies.need_messages();
            }
            loader.messages.extend(items);
            let total = loader.messages.len();
            replies.messages_added(added, total)
        }

        Awaiting::Delay => match parse_delay(input) {
            Some(delay_secs) => {
                loader.delay_secs = Some(delay_secs);
                loader.awaiting = Awaiting::Ready;
                replies.ready(delay_secs)
            }
            None => replies.bad_delay(input),
        },

        Awaiting::Ready => {
            if !input.eq_ignore_ascii_case("start") {
                return replies.not_started();
            }
            let (kind, index) = (loader.kind, loader.index);
            // The runner takes the loader lock itself.
            drop(loader);
            match runner.start(handle.clone()).await {
                Ok(_task) => replies.started(kind, index),
                Err(e) => e.to_string(),
            }
        }

        // Running and stopped loaders never reach the interpreter; the
        // engine sends their input to the command router.
        Awaiting::Running | Awaiting::Stopped => replies.unrecognized(),
    }
}

/// Split collection input on commas and newlines, dropping empty pieces.
fn split_items(input: &str) -> Vec<String> {
    input
        .split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Delays must be strictly positive whole seconds.
fn parse_delay(input: &str) -> Option<u64> {
    input.parse::<u64>().ok().filter(|d| *d > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cadence_core::types::{LoaderKind, SinkReceipt};
    use cadence_core::{CadenceError, MessageSink};
    use cadence_scheduler::SchedulerPolicies;

    struct NullSink;

    #[async_trait]
    impl MessageSink for NullSink {
        async fn deliver(
            &self,
            _target: &str,
            _body: &str,
            _credential: &str,
        ) -> Result<SinkReceipt, CadenceError> {
            Ok(SinkReceipt::default())
        }
    }

    fn runner() -> LoaderRunner {
        LoaderRunner::new(Arc::new(NullSink), SchedulerPolicies::default())
    }

    fn fresh_loader() -> Arc<Mutex<Loader>> {
        Arc::new(Mutex::new(Loader::new(LoaderKind::Post, 1, 0, 100)))
    }

    async fn turn(handle: &Arc<Mutex<Loader>>, runner: &LoaderRunner, input: &str) -> String {
        step(handle, input, &ReplyCatalog::default(), runner, None).await
    }

    #[tokio::test]
    async fn tokens_split_on_comma_and_newline() {
        let handle = fresh_loader();
        let runner = runner();

        turn(&handle, &runner, "tokA,tokB").await;
        turn(&handle, &runner, "tokC\ntokD").await;

        let loader = handle.lock().await;
        let tokens: Vec<&str> = loader.credentials.iter().map(|c| c.token.as_str()).collect();
        assert_eq!(tokens, vec!["tokA", "tokB", "tokC", "tokD"]);
        assert_eq!(loader.awaiting, Awaiting::Tokens);
    }

    #[tokio::test]
    async fn done_with_no_tokens_is_rejected() {
        let handle = fresh_loader();
        let runner = runner();

        let reply = turn(&handle, &runner, "done").await;
        assert!(reply.contains("at least one token"));
        assert_eq!(handle.lock().await.awaiting, Awaiting::Tokens);
    }

    #[tokio::test]
    async fn done_is_case_insensitive_and_trimmed() {
        let handle = fresh_loader();
        let runner = runner();

        turn(&handle, &runner, "tokA").await;
        turn(&handle, &runner, "  DONE  ").await;
        assert_eq!(handle.lock().await.awaiting, Awaiting::Target);
    }

    #[tokio::test]
    async fn target_taken_verbatim_trimmed() {
        let handle = fresh_loader();
        let runner = runner();

        turn(&handle, &runner, "tokA").await;
        turn(&handle, &runner, "done").await;
        turn(&handle, &runner, "  pid123  ").await;

        let loader = handle.lock().await;
        assert_eq!(loader.target_id.as_deref(), Some("pid123"));
        assert_eq!(loader.awaiting, Awaiting::Messages);
    }

    #[tokio::test]
    async fn empty_target_reprompts() {
        let handle = fresh_loader();
        let runner = runner();

        turn(&handle, &runner, "tokA").await;
        turn(&handle, &runner, "done").await;
        let reply = turn(&handle, &runner, "   ").await;
        assert!(reply.contains("cannot be empty"));
        assert_eq!(handle.lock().await.awaiting, Awaiting::Target);
    }

    #[tokio::test]
    async fn done_with_no_messages_is_rejected() {
        let handle = fresh_loader();
        let runner = runner();

        turn(&handle, &runner, "tokA").await;
        turn(&handle, &runner, "done").await;
        turn(&handle, &runner, "pid123").await;
        let reply = turn(&handle, &runner, "done").await;
        assert!(reply.contains("at least one message"));
        assert_eq!(handle.lock().await.awaiting, Awaiting::Messages);
    }

    #[tokio::test]
    async fn invalid_delay_stays_in_delay_state() {
        let handle = fresh_loader();
        let runner = runner();

        turn(&handle, &runner, "tokA").await;
        turn(&handle, &runner, "done").await;
        turn(&handle, &runner, "pid123").await;
        turn(&handle, &runner, "hello").await;
        turn(&handle, &runner, "done").await;

        for bad in ["abc", "-3", "0", "1.5", ""] {
            let reply = turn(&handle, &runner, bad).await;
            assert!(reply.contains("not a valid delay"), "input {bad:?}: {reply}");
            assert_eq!(handle.lock().await.awaiting, Awaiting::Delay);
        }

        let reply = turn(&handle, &runner, "2").await;
        assert!(reply.contains("'start'"));
        let loader = handle.lock().await;
        assert_eq!(loader.delay_secs, Some(2));
        assert_eq!(loader.awaiting, Awaiting::Ready);
    }

    #[tokio::test]
    async fn ready_rejects_everything_but_start() {
        let handle = fresh_loader();
        let runner = runner();

        turn(&handle, &runner, "tokA").await;
        turn(&handle, &runner, "done").await;
        turn(&handle, &runner, "pid123").await;
        turn(&handle, &runner, "hi").await;
        turn(&handle, &runner, "done").await;
        turn(&handle, &runner, "1").await;

        let reply = turn(&handle, &runner, "launch it").await;
        assert!(reply.contains("incomplete"));
        assert_eq!(handle.lock().await.awaiting, Awaiting::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn start_hands_off_to_scheduler() {
        let handle = fresh_loader();
        let runner = runner();

        turn(&handle, &runner, "tokA").await;
        turn(&handle, &runner, "done").await;
        turn(&handle, &runner, "pid123").await;
        turn(&handle, &runner, "hi").await;
        turn(&handle, &runner, "done").await;
        turn(&handle, &runner, "1").await;

        let reply = turn(&handle, &runner, "start").await;
        assert!(reply.contains("running"));
        {
            let loader = handle.lock().await;
            assert!(loader.active);
            assert_eq!(loader.awaiting, Awaiting::Running);
        }
        handle.lock().await.stop();
    }

    /// Confirmed fields stay immutable through later dialogue turns: once
    /// the target is set, token input no longer reaches the token list.
    #[tokio::test]
    async fn confirmed_fields_are_immutable() {
        let handle = fresh_loader();
        let runner = runner();

        turn(&handle, &runner, "tokA").await;
        turn(&handle, &runner, "done").await;
        turn(&handle, &runner, "pid123").await;
        turn(&handle, &runner, "tokB,tokC").await;

        let loader = handle.lock().await;
        assert_eq!(loader.credentials.len(), 1);
        // The later turn was collected as messages, not tokens.
        assert_eq!(loader.messages, vec!["tokB", "tokC"]);
    }
}
