use std::path::Path;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod images;
pub mod meals;
pub mod vendors;

use crate::state::AppState;
use crate::variant::ServiceVariant;

/// Build the full application router for one service variant.
pub fn build_router(
    state: AppState,
    variant: ServiceVariant,
    cors: CorsLayer,
    assets_dir: &Path,
) -> Router {
    let entry = ServeFile::new(assets_dir.join(variant.entry_page()));

    let api = Router::new()
        .route("/api/vendors", get(vendors::list).post(vendors::create))
        .route(
            "/api/vendors/:index",
            put(vendors::update).delete(vendors::remove),
        )
        .route("/api/meals", get(meals::list).post(meals::create))
        .route(
            "/api/meals/:index",
            put(meals::update).delete(meals::remove),
        );

    let mut router = Router::new()
        .route_service("/", entry.clone())
        .nest_service("/img", ServeDir::new(state.images.dir()))
        .merge(api);

    if variant == ServiceVariant::Manage {
        router = router
            // the management page is also reachable by filename
            .route_service("/eat_manage.html", entry)
            .route("/api/upload_image", post(images::upload));
    }

    router
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
