// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-request invocation context.

use crate::context::InvocationContext;
use axum::{body::Body, extract::Request, http, middleware::Next, response::Response};
use tracing::{Instrument, Span};

/// Create the request's [`InvocationContext`] and run the rest of the stack
/// inside its span.
///
/// Installed outside `TraceLayer`, so the request and response lines share the
/// correlation ID with the handler's own logs.
pub async fn with_invocation_context(mut request: Request, next: Next) -> Response {
    let ctx = InvocationContext::new();
    let span = ctx.span().clone();
    request.extensions_mut().insert(ctx);
    next.run(request).instrument(span).await
}

/// `TraceLayer` span carrying the request's correlation ID.
pub fn request_span(request: &http::Request<Body>) -> Span {
    let correlation_id = request
        .extensions()
        .get::<InvocationContext>()
        .map(|ctx| ctx.correlation_id().to_string())
        .unwrap_or_default();

    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        correlation_id = %correlation_id,
    )
}
