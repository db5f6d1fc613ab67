use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Users
        .route("/users", get(handlers::list_users))
        .route("/users/{id}", get(handlers::get_user))
        // Pets
        .route("/pets", get(handlers::list_pets))
        .route("/pets/{id}", get(handlers::get_pet))
        // Adoption applications
        .route("/applications", get(handlers::list_applications))
        .route("/applications/{id}", get(handlers::get_application))
        .route(
            "/applications/{id}/decision",
            post(handlers::decide_application),
        )
        // Vaccinations
        .route("/vaccinations", get(handlers::list_vaccinations))
        // Dashboard
        .route("/dashboard", get(handlers::dashboard))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}
