pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::auth_service::AuthService;
use crate::services::image_service::ImageService;
use crate::services::storage::StorageService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::images::upload_image,
        api::handlers::images::list_images,
        api::handlers::images::get_image,
        api::handlers::images::update_image,
        api::handlers::images::delete_image,
        api::handlers::images::list_tags,
        api::handlers::users::get_current_user,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::CurrentUser,
            models::ImageRecord,
            models::UpdateImageRequest,
            models::UploadForm,
            models::UploadResponse,
            models::MessageResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "auth", description = "Session identity"),
        (name = "images", description = "Image upload, search and management"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub auth_service: Arc<AuthService>,
    pub image_service: Arc<ImageService>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        let auth_service = Arc::new(AuthService::new(db.clone(), config.clone()));
        let image_service = Arc::new(ImageService::new(db.clone(), storage.clone()));

        Self {
            db,
            storage,
            auth_service,
            image_service,
            config,
        }
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("⚠️  Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/images", get(api::handlers::images::list_images))
        .route(
            "/api/images/:id",
            get(api::handlers::images::get_image)
                .put(api::handlers::images::update_image)
                .delete(api::handlers::images::delete_image),
        )
        .route("/api/tags", get(api::handlers::images::list_tags))
        .route("/api/user", get(api::handlers::users::get_current_user))
        .route(
            "/upload",
            post(api::handlers::images::upload_image)
                .layer(DefaultBodyLimit::max(state.config.max_upload_size)),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            api::middleware::auth::auth_middleware,
        ));

    let page_routes = Router::new()
        .route("/", get(api::handlers::pages::gallery))
        .route_layer(from_fn_with_state(
            state.clone(),
            api::middleware::auth::page_auth_middleware,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/login",
            get(api::handlers::pages::login_page).post(api::handlers::auth::login),
        )
        .route(
            "/register",
            get(api::handlers::pages::register_page).post(api::handlers::auth::register),
        )
        .route("/logout", get(api::handlers::auth::logout))
        .merge(api_routes)
        .merge(page_routes)
        .layer(cors_layer(&state.config))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}
