//! Authorization hook
//!
//! Every route passes through here. No policy is enforced yet; requests are
//! forwarded unchanged.

use axum::{extract::Request, middleware::Next, response::Response};

pub async fn authorize(request: Request, next: Next) -> Response {
    tracing::trace!(
        method = %request.method(),
        path = %request.uri().path(),
        "authorization pass-through"
    );
    next.run(request).await
}
