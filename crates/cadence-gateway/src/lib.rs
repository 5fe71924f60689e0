// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Cadence loader bot.
//!
//! Exposes the chat pipeline over a small REST surface: POST /chat,
//! GET /chat/history, and GET /health.

pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, build_router, start_server};
