use axum::http::{header, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Build the CORS layer. Origins are mirrored so the session cookie can be
/// sent with credentialed requests.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
