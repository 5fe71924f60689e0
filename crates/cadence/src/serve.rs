// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadence serve` command implementation.
//!
//! Wires the identity resolver, session store, dialogue engine, loader
//! scheduler, and HTTP sink together, then serves the chat API until a
//! shutdown signal arrives.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use cadence_config::model::CadenceConfig;
use cadence_core::{CadenceError, NameResolver};
use cadence_dialogue::{ChatEngine, ReplyCatalog};
use cadence_gateway::{GatewayState, ServerConfig, start_server};
use cadence_identity::IdentityResolver;
use cadence_scheduler::{LoaderRunner, SchedulerPolicies};
use cadence_session::{SessionStore, StoreLimits};
use cadence_sink::{HttpNameResolver, HttpSink};
use tracing::info;

use crate::shutdown;

/// Runs the `cadence serve` command.
pub async fn run_serve(config: CadenceConfig) -> Result<(), CadenceError> {
    init_tracing(&config.agent.log_level);

    info!(agent = %config.agent.name, "starting cadence serve");

    let resolver = Arc::new(IdentityResolver::open(
        Path::new(&config.identity.store_path),
        config.identity.require_identifier,
    )?);

    let store = Arc::new(SessionStore::new(StoreLimits {
        max_loaders_per_kind: config.session.max_loaders_per_kind,
        max_log_entries: config.session.max_log_entries,
        max_transcript_entries: config.session.max_transcript_entries,
    }));

    let sink = Arc::new(HttpSink::new(config.sink.endpoint.clone())?);
    let runner = LoaderRunner::new(
        sink,
        SchedulerPolicies {
            strategy: config.scheduler.strategy,
            on_failure: config.scheduler.on_failure,
            exhaustion: config.scheduler.exhaustion,
            send_timeout: Duration::from_secs(config.scheduler.send_timeout_secs),
        },
    );

    let name_resolver: Option<Arc<dyn NameResolver>> = if config.sink.resolve_names {
        Some(Arc::new(HttpNameResolver::new(
            config.sink.name_endpoint.clone(),
        )?))
    } else {
        None
    };

    // Config validation already checked the timezone string.
    let timezone = chrono_tz::Tz::from_str(&config.agent.timezone)
        .map_err(|e| CadenceError::Config(format!("invalid timezone: {e}")))?;

    let engine = Arc::new(ChatEngine::new(
        store,
        runner,
        ReplyCatalog::new(&config.agent.owner, &config.replies.greeting)
            .with_canned(config.replies.canned.clone()),
        timezone,
        name_resolver,
    ));

    let cancel = shutdown::install_signal_handler();

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    let state = GatewayState {
        engine,
        resolver,
        start_time: std::time::Instant::now(),
    };

    start_server(&server_config, state, cancel).await?;

    info!("cadence serve shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cadence={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
