use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags each request and its response with an `x-request-id`, reusing the
/// client's id when it sent a usable one.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .filter(|v| v.to_str().is_ok_and(|s| !s.is_empty() && s.len() <= 128))
        .cloned()
        .unwrap_or_else(|| {
            // A hyphenated UUID is always a valid header value
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    req.headers_mut()
        .insert(REQUEST_ID_HEADER, request_id.clone());

    let mut response = next.run(req).await;

    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);

    response
}
