use std::time::Duration;

use axum::{
    http::{
        header::{CONTENT_TYPE, RETRY_AFTER},
        HeaderName, HeaderValue, Method,
    },
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use super::request_id::REQUEST_ID_HEADER;

/// Only origins from the allow-list receive CORS headers. Everything else is
/// left to the browser to reject.
pub fn add<S: Clone + Send + Sync + 'static>(
    allowed_origins: &[String],
) -> impl FnOnce(Router<S>) -> Router<S> {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin.trim_end_matches('/'))
                .inspect_err(|err| warn!(origin, "ignoring invalid cors origin: {err}"))
                .ok()
        })
        .collect::<Vec<_>>();

    let layer = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER), RETRY_AFTER])
        .max_age(Duration::from_secs(3600));

    |router| router.layer(layer)
}
