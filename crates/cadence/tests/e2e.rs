// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over the full identity, dialogue, and scheduler stack.

use std::sync::Arc;
use std::time::Duration;

use cadence_core::types::{ExhaustionPolicy, FailurePolicy, IterationStrategy};
use cadence_scheduler::SchedulerPolicies;
use cadence_test_utils::{FixedNameResolver, TestHarness};

async fn configure_loader(
    harness: &TestHarness,
    user: &str,
    kind: &str,
    target: &str,
    messages: &str,
    delay: &str,
) {
    for turn in [
        &format!("{kind} loader") as &str,
        "tokA,tokB",
        "done",
        target,
        messages,
        "done",
        delay,
    ] {
        harness.send(user, turn).await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn full_loader_scenario() {
    let harness = TestHarness::builder().build().unwrap();

    let reply = harness.send("alice", "post loader").await.unwrap();
    assert!(reply.contains("activated"));

    let reply = harness.send("alice", "tokA,tokB").await.unwrap();
    assert!(reply.contains("2 token(s)"));

    let reply = harness.send("alice", "done").await.unwrap();
    assert!(reply.contains("target id"));

    let reply = harness.send("alice", "pid123").await.unwrap();
    assert!(reply.contains("messages"));

    harness.send("alice", "hello,world").await.unwrap();
    let reply = harness.send("alice", "done").await.unwrap();
    assert!(reply.contains("delay"));

    let reply = harness.send("alice", "2").await.unwrap();
    assert!(reply.contains("'start'"));

    let reply = harness.send("alice", "start").await.unwrap();
    assert!(reply.contains("running"));

    tokio::time::sleep(Duration::from_secs(9)).await;
    let reply = harness.send("alice", "stop post loader").await.unwrap();
    assert!(reply.contains("stopped"));

    let deliveries = harness.sink.deliveries().await;
    assert!(!deliveries.is_empty());
    assert!(deliveries.iter().all(|d| d.target == "pid123"));
    assert!(
        deliveries
            .iter()
            .any(|d| d.body == "hello" || d.body == "world")
    );
    // Lockstep round-robin over both tokens.
    assert_eq!(deliveries[0].credential, "tokA");
    assert_eq!(deliveries[1].credential, "tokB");

    // Stopped means stopped: no further deliveries.
    let sent = deliveries.len();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(harness.sink.delivery_count().await, sent);
}

#[tokio::test(start_paused = true)]
async fn independent_loaders_per_kind() {
    let harness = TestHarness::builder().build().unwrap();

    configure_loader(&harness, "alice", "post", "p1", "pm", "3").await;
    harness.send("alice", "start").await.unwrap();
    configure_loader(&harness, "alice", "convo", "c1", "cm", "3").await;
    harness.send("alice", "start").await.unwrap();

    tokio::time::sleep(Duration::from_secs(7)).await;
    harness.send("alice", "stop convo loader").await.unwrap();

    let reply = harness.send("alice", "post loader status").await.unwrap();
    assert!(reply.contains("active"), "got: {reply}");
    let reply = harness.send("alice", "convo loader status").await.unwrap();
    assert!(reply.contains("stopped"), "got: {reply}");

    harness.send("alice", "stop post loader").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failure_is_logged_and_loop_continues() {
    let harness = TestHarness::builder()
        .with_sink_failures(&[0])
        .build()
        .unwrap();

    configure_loader(&harness, "alice", "post", "p1", "m1,m2", "1").await;
    harness.send("alice", "start").await.unwrap();
    tokio::time::sleep(Duration::from_secs(4)).await;
    harness.send("alice", "stop post loader").await.unwrap();

    // The scripted failure did not halt the loop.
    assert!(harness.sink.delivery_count().await >= 2);

    let console = harness.send("alice", "post loader full console").await.unwrap();
    assert!(console.contains("failed"));
    assert!(console.contains("sent"));
}

#[tokio::test(start_paused = true)]
async fn exhaustion_stop_policy_completes_naturally() {
    let harness = TestHarness::builder()
        .with_policies(SchedulerPolicies {
            strategy: IterationStrategy::Lockstep,
            on_failure: FailurePolicy::Continue,
            exhaustion: ExhaustionPolicy::Stop,
            send_timeout: Duration::from_secs(5),
        })
        .build()
        .unwrap();

    configure_loader(&harness, "alice", "post", "p1", "m1,m2", "1").await;
    harness.send("alice", "start").await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    // One pass over two messages, then done.
    assert_eq!(harness.sink.delivery_count().await, 2);
    let reply = harness.send("alice", "post loader status").await.unwrap();
    assert!(reply.contains("stopped"));
    let console = harness.send("alice", "post loader full console").await.unwrap();
    assert!(console.contains("completed"));
}

#[tokio::test(start_paused = true)]
async fn resolved_names_label_log_entries() {
    let harness = TestHarness::builder()
        .with_name_resolver(Arc::new(FixedNameResolver("Jerry".to_string())))
        .build()
        .unwrap();

    configure_loader(&harness, "alice", "post", "p1", "m1", "1").await;
    harness.send("alice", "start").await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;
    harness.send("alice", "stop post loader").await.unwrap();

    let console = harness.send("alice", "post loader full console").await.unwrap();
    assert!(console.contains("Jerry"), "got: {console}");
}

#[tokio::test]
async fn identity_is_deterministic_and_isolated() {
    let harness = TestHarness::builder().build().unwrap();

    let key_a1 = harness.resolve("alice").await.unwrap();
    let key_a2 = harness.resolve("alice").await.unwrap();
    let key_b = harness.resolve("bob").await.unwrap();
    assert_eq!(key_a1, key_a2);
    assert_ne!(key_a1, key_b);

    // Separate users see separate sessions.
    harness.send("alice", "post loader").await.unwrap();
    let reply = harness.send("bob", "post loader status").await.unwrap();
    assert!(reply.contains("no post loader"));

    // Alice's loader is collecting; Bob's turns still hit the router.
    let reply = harness.send("bob", "hlo").await.unwrap();
    assert_eq!(reply, "hey");
}

#[tokio::test]
async fn history_round_trip() {
    let harness = TestHarness::builder().build().unwrap();

    harness.send("alice", "hlo").await.unwrap();
    harness.send("alice", "owner name").await.unwrap();

    let history = harness.history("alice").await.unwrap();
    assert_eq!(history.len(), 4);
    assert!(history[0].contains("you: hlo"));
    assert!(history[1].contains("bot: hey"));
    assert!(history[3].contains("Jerry"));
}
