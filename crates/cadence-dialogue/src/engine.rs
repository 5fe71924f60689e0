// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The chat engine: one entry point per inbound chat turn.
//!
//! Looks up the user's session, feeds the turn to the dialogue
//! interpreter when a loader is collecting input, and to the command
//! router otherwise. Each turn fully resolves to a reply before
//! returning; only loader starts leave work running in the background.

use std::sync::Arc;
use std::time::Duration;

use cadence_core::types::{LoaderKind, LogQuery, UserKey};
use cadence_core::{CadenceError, NameResolver};
use cadence_scheduler::LoaderRunner;
use cadence_session::{SessionStore, Speaker, UserState};
use tracing::debug;

use crate::interpreter;
use crate::reply::ReplyCatalog;
use crate::router::{Command, parse_command};

/// Recency window for the `console <index>` query.
const CONSOLE_WINDOW: Duration = Duration::from_secs(30 * 60);

/// Entry count for the short `<kind> loader console` query.
const CONSOLE_TAIL: usize = 5;

/// Drives the dialogue/router pipeline over the session store.
pub struct ChatEngine {
    store: Arc<SessionStore>,
    runner: LoaderRunner,
    replies: ReplyCatalog,
    timezone: chrono_tz::Tz,
    name_resolver: Option<Arc<dyn NameResolver>>,
}

impl ChatEngine {
    pub fn new(
        store: Arc<SessionStore>,
        runner: LoaderRunner,
        replies: ReplyCatalog,
        timezone: chrono_tz::Tz,
        name_resolver: Option<Arc<dyn NameResolver>>,
    ) -> Self {
        Self {
            store,
            runner,
            replies,
            timezone,
            name_resolver,
        }
    }

    /// Handle one chat turn for a resolved user, returning the reply.
    pub async fn handle_message(
        &self,
        key: &UserKey,
        message: &str,
    ) -> Result<String, CadenceError> {
        let state_handle = self.store.get_or_create(key);
        let mut state = state_handle.lock().await;
        let limits = self.store.limits();

        state.push_transcript(Speaker::User, message.trim().to_string(), &limits);

        let reply = match state.collecting_loader().await {
            Some(loader) => {
                interpreter::step(
                    &loader,
                    message,
                    &self.replies,
                    &self.runner,
                    self.name_resolver.as_deref(),
                )
                .await
            }
            None => match self.replies.canned_reply(&message.trim().to_lowercase()) {
                Some(reply) => reply,
                None => {
                    let command = parse_command(message);
                    debug!(user = %key, ?command, "routing command");
                    self.execute(command, &mut state).await
                }
            },
        };

        state.push_transcript(Speaker::Bot, reply.clone(), &limits);
        Ok(reply)
    }

    /// The user's transcript, oldest first. Unknown users have none.
    pub async fn history(&self, key: &UserKey) -> Vec<String> {
        match self.store.get(key) {
            Some(handle) => {
                let state = handle.lock().await;
                state.transcript().map(|entry| entry.to_string()).collect()
            }
            None => Vec::new(),
        }
    }

    async fn execute(&self, command: Command, state: &mut UserState) -> String {
        match command {
            Command::Owner => self.replies.owner_name(),
            Command::Greeting => self.replies.greeting(),
            Command::Attribution => self.replies.attribution(),

            Command::Time => {
                let now = chrono::Utc::now().with_timezone(&self.timezone);
                self.replies
                    .time(&now.format("%Y-%m-%d %H:%M:%S %Z").to_string())
            }

            Command::Clear => {
                state.clear_transcript();
                self.replies.cleared()
            }

            Command::Create(kind) => {
                match state.create_loader(kind, &self.store.limits()).await {
                    Ok(handle) => {
                        let index = handle.lock().await.index;
                        self.replies.activation_prompt(kind, index)
                    }
                    Err(e) => e.to_string(),
                }
            }

            Command::StopKind(kind) => match state.current_loader(kind).await {
                Some(handle) => {
                    let mut loader = handle.lock().await;
                    loader.stop();
                    self.replies.stopped(kind, loader.index)
                }
                None => self.replies.no_loader(kind),
            },

            Command::StopIndex(index) => {
                match state.loader_at(LoaderKind::Post, index).await {
                    Some(handle) => {
                        let mut loader = handle.lock().await;
                        loader.stop();
                        self.replies.stopped(LoaderKind::Post, loader.index)
                    }
                    None => self.replies.no_loader_at(LoaderKind::Post, index),
                }
            }

            Command::ConsoleIndex(index) => {
                match state.loader_at(LoaderKind::Post, index).await {
                    Some(handle) => {
                        let query = LogQuery {
                            limit: None,
                            since: Some(CONSOLE_WINDOW),
                        };
                        self.render_log(&handle, &query).await
                    }
                    None => self.replies.no_loader_at(LoaderKind::Post, index),
                }
            }

            Command::Console { kind, full } => match state.current_loader(kind).await {
                Some(handle) => {
                    let query = if full {
                        LogQuery::full()
                    } else {
                        LogQuery::last(CONSOLE_TAIL)
                    };
                    self.render_log(&handle, &query).await
                }
                None => self.replies.no_loader(kind),
            },

            Command::Status(kind) => match state.current_loader(kind).await {
                Some(handle) => {
                    let loader = handle.lock().await;
                    self.replies.status(kind, loader.index, loader.active)
                }
                None => self.replies.no_loader(kind),
            },

            Command::Unrecognized => self.replies.unrecognized(),
        }
    }

    async fn render_log(
        &self,
        handle: &Arc<tokio::sync::Mutex<cadence_session::Loader>>,
        query: &LogQuery,
    ) -> String {
        let loader = handle.lock().await;
        let lines = loader.log_lines(query);
        if lines.is_empty() {
            self.replies.empty_log()
        } else {
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cadence_core::types::SinkReceipt;
    use cadence_core::MessageSink;
    use cadence_scheduler::SchedulerPolicies;
    use cadence_session::StoreLimits;
    use std::sync::Mutex as StdMutex;

    struct RecordingSink {
        deliveries: StdMutex<Vec<(String, String, String)>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                deliveries: StdMutex::new(Vec::new()),
            }
        }

        fn recorded(&self) -> Vec<(String, String, String)> {
            self.deliveries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageSink for RecordingSink {
        async fn deliver(
            &self,
            target: &str,
            body: &str,
            credential: &str,
        ) -> Result<SinkReceipt, CadenceError> {
            self.deliveries.lock().unwrap().push((
                target.to_string(),
                body.to_string(),
                credential.to_string(),
            ));
            Ok(SinkReceipt::default())
        }
    }

    fn engine_with_sink(sink: Arc<RecordingSink>) -> ChatEngine {
        engine_with_replies(sink, ReplyCatalog::default())
    }

    fn engine_with_replies(sink: Arc<RecordingSink>, replies: ReplyCatalog) -> ChatEngine {
        ChatEngine::new(
            Arc::new(SessionStore::new(StoreLimits::default())),
            LoaderRunner::new(sink, SchedulerPolicies::default()),
            replies,
            chrono_tz::Tz::UTC,
            None,
        )
    }

    fn engine() -> ChatEngine {
        engine_with_sink(Arc::new(RecordingSink::new()))
    }

    async fn say(engine: &ChatEngine, key: &UserKey, message: &str) -> String {
        engine.handle_message(key, message).await.unwrap()
    }

    #[tokio::test]
    async fn canned_commands_reply() {
        let engine = engine();
        let key = UserKey("u1".to_string());

        assert_eq!(say(&engine, &key, "owner name").await, "Jerry");
        assert_eq!(say(&engine, &key, "hlo").await, "hey");
        assert!(say(&engine, &key, "who made you").await.contains("Jerry"));
        assert!(say(&engine, &key, "time").await.contains("current time"));
        assert!(say(&engine, &key, "gibberish").await.contains("unrecognized"));
    }

    #[tokio::test]
    async fn default_canned_phrases_reply() {
        let engine = engine();
        let key = UserKey("u1".to_string());

        let reply = say(&engine, &key, "hlo aap kaise ho").await;
        assert!(reply.contains("here to help"), "got: {reply}");
        let reply = say(&engine, &key, "apko kisne create kiya").await;
        assert!(reply.contains("created by Jerry"), "got: {reply}");
    }

    #[tokio::test]
    async fn configured_canned_phrases_replace_defaults() {
        let replies =
            ReplyCatalog::default().with_canned([("Good Morning", "morning to you too")]);
        let engine = engine_with_replies(Arc::new(RecordingSink::new()), replies);
        let key = UserKey("u1".to_string());

        // Triggers match trimmed and case-insensitively, like commands.
        assert_eq!(
            say(&engine, &key, "  good morning  ").await,
            "morning to you too"
        );
        // The default phrase list was replaced.
        let reply = say(&engine, &key, "hlo aap kaise ho").await;
        assert!(reply.contains("unrecognized"));
        // Commands still route.
        assert_eq!(say(&engine, &key, "hlo").await, "hey");
    }

    #[tokio::test]
    async fn transcript_records_both_sides_and_clears() {
        let engine = engine();
        let key = UserKey("u1".to_string());

        say(&engine, &key, "hlo").await;
        let history = engine.history(&key).await;
        assert_eq!(history.len(), 2);
        assert!(history[0].contains("you: hlo"));
        assert!(history[1].contains("bot: hey"));

        say(&engine, &key, "clear").await;
        // The clear turn itself is recorded after the wipe.
        let history = engine.history(&key).await;
        assert_eq!(history.len(), 1);
        assert!(history[0].contains("cleared"));
    }

    #[tokio::test]
    async fn unknown_user_has_empty_history() {
        let engine = engine();
        assert!(engine.history(&UserKey("nobody".to_string())).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn full_configuration_scenario() {
        let sink = Arc::new(RecordingSink::new());
        let engine = engine_with_sink(sink.clone());
        let key = UserKey("u1".to_string());

        let reply = say(&engine, &key, "post loader").await;
        assert!(reply.contains("activated"));

        let reply = say(&engine, &key, "tokA,tokB").await;
        assert!(reply.contains("2 token(s)"));

        let reply = say(&engine, &key, "done").await;
        assert!(reply.contains("target id"));

        let reply = say(&engine, &key, "pid123").await;
        assert!(reply.contains("messages"));

        say(&engine, &key, "hello,world").await;
        let reply = say(&engine, &key, "done").await;
        assert!(reply.contains("delay"));

        let reply = say(&engine, &key, "2").await;
        assert!(reply.contains("'start'"));

        let reply = say(&engine, &key, "start").await;
        assert!(reply.contains("running"));

        // Let a few cycles run, then stop through the router.
        tokio::time::sleep(Duration::from_secs(7)).await;
        let reply = say(&engine, &key, "stop post loader").await;
        assert!(reply.contains("stopped"));

        let recorded = sink.recorded();
        assert!(!recorded.is_empty());
        assert!(recorded.iter().all(|(target, _, _)| target == "pid123"));
        assert!(
            recorded
                .iter()
                .any(|(_, body, _)| body == "hello" || body == "world")
        );

        // No further sends after stopping.
        let sent = recorded.len();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(sink.recorded().len(), sent);
    }

    #[tokio::test(start_paused = true)]
    async fn status_and_console_track_the_run() {
        let engine = engine();
        let key = UserKey("u1".to_string());

        assert!(
            say(&engine, &key, "post loader status")
                .await
                .contains("no post loader")
        );

        say(&engine, &key, "post loader").await;
        say(&engine, &key, "tokA").await;
        say(&engine, &key, "done").await;
        say(&engine, &key, "pid1").await;
        say(&engine, &key, "hi").await;
        say(&engine, &key, "done").await;
        say(&engine, &key, "9").await;

        // Fully configured but not launched: the loader still owns input,
        // so router commands get the launch re-prompt instead.
        let reply = say(&engine, &key, "post loader status").await;
        assert!(reply.contains("incomplete"));

        say(&engine, &key, "start").await;
        tokio::time::sleep(Duration::from_secs(1)).await;

        // The first delivery goes out at start, well before the delay.
        let reply = say(&engine, &key, "post loader status").await;
        assert!(reply.contains("active"));
        let reply = say(&engine, &key, "post loader full console").await;
        assert!(reply.contains("sent"), "got: {reply}");

        say(&engine, &key, "stop post loader").await;
    }

    #[tokio::test(start_paused = true)]
    async fn two_kinds_run_independently() {
        let sink = Arc::new(RecordingSink::new());
        let engine = engine_with_sink(sink.clone());
        let key = UserKey("u1".to_string());

        for (kind, target) in [("post", "p1"), ("convo", "c1")] {
            say(&engine, &key, &format!("{kind} loader")).await;
            say(&engine, &key, "tokA").await;
            say(&engine, &key, "done").await;
            say(&engine, &key, target).await;
            say(&engine, &key, "msg").await;
            say(&engine, &key, "done").await;
            say(&engine, &key, "2").await;
            say(&engine, &key, "start").await;
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
        say(&engine, &key, "stop convo loader").await;

        let reply = say(&engine, &key, "post loader status").await;
        assert!(reply.contains("active"), "got: {reply}");
        let reply = say(&engine, &key, "convo loader status").await;
        assert!(reply.contains("stopped"), "got: {reply}");

        say(&engine, &key, "stop post loader").await;
    }

    #[tokio::test]
    async fn collecting_loader_owns_input_over_router() {
        let engine = engine();
        let key = UserKey("u1".to_string());

        say(&engine, &key, "post loader").await;
        // "time" would be a router command, but the collecting loader
        // swallows it as a token.
        say(&engine, &key, "time").await;
        say(&engine, &key, "done").await;

        let reply = say(&engine, &key, "sometarget").await;
        assert!(reply.contains("messages"));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_loader_by_index_targets_post_kind() {
        let engine = engine();
        let key = UserKey("u1".to_string());

        say(&engine, &key, "post loader").await;
        say(&engine, &key, "tokA").await;
        say(&engine, &key, "done").await;
        say(&engine, &key, "p1").await;
        say(&engine, &key, "m").await;
        say(&engine, &key, "done").await;
        say(&engine, &key, "5").await;
        say(&engine, &key, "start").await;

        let reply = say(&engine, &key, "stop loader 1").await;
        assert!(reply.contains("post loader 1 stopped"));
        let reply = say(&engine, &key, "post loader status").await;
        assert!(reply.contains("stopped"));
    }

    #[tokio::test]
    async fn stop_index_not_found_replies_without_mutation() {
        let engine = engine();
        let key = UserKey("u1".to_string());

        let reply = say(&engine, &key, "stop loader 7").await;
        assert!(reply.contains("no post loader 7"));
    }
}
