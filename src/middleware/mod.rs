// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules.

pub mod invocation;
pub mod tasks_auth;

pub use invocation::{request_span, with_invocation_context};
pub use tasks_auth::require_task_queue;
