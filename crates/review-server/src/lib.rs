pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // State
        .route("/api/state", get(routes::state::get_state))
        // Batch moves
        .route("/api/batch/selection", put(routes::batch::put_selection))
        .route("/api/batch/preview", post(routes::batch::preview))
        .route("/api/batch/execute", post(routes::batch::execute))
        .route("/api/batch/cancel", post(routes::batch::cancel))
        .route(
            "/api/batch/report/refresh",
            post(routes::batch::refresh_report),
        )
        .route(
            "/api/batch/report/export",
            get(routes::batch::export_report),
        )
        // Assets and decisions
        .route("/api/assets", get(routes::assets::list_assets))
        .route("/api/assets/refresh", post(routes::assets::refresh_assets))
        .route("/api/decisions", post(routes::assets::decide))
        // Purge
        .route("/api/purge/{id}/preview", post(routes::purge::preview))
        .route("/api/purge/{id}", post(routes::purge::execute))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the dashboard server.
pub async fn serve(app_state: AppState, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    serve_on(app_state, listener, open_browser).await
}

/// Start the dashboard server on a pre-bound listener.
///
/// Lets the caller read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();

    // A failed initial load is logged; the dashboard still starts.
    if let Err(e) = routes::assets::refresh_assets(axum::extract::State(app_state.clone())).await
    {
        tracing::warn!(error = ?e.0, "initial asset load failed");
    }

    let app = build_router(app_state);
    tracing::info!("review dashboard listening on http://localhost:{actual_port}");

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
