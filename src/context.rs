// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-invocation observability context.

use tracing::Span;
use uuid::Uuid;

/// Correlation ID plus the span that carries it.
///
/// Built once per invocation. Work instrumented with [`InvocationContext::span`]
/// logs with the `correlation_id` field, including log lines emitted by the
/// collaborators it calls.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    correlation_id: Uuid,
    span: Span,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::with_correlation_id(Uuid::new_v4())
    }

    pub fn with_correlation_id(correlation_id: Uuid) -> Self {
        let span = tracing::info_span!("invocation", correlation_id = %correlation_id);
        Self {
            correlation_id,
            span,
        }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::new()
    }
}
