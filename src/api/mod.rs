mod handlers;

use axum::{routing::post, Router};
use tower_http::trace::TraceLayer;

use crate::db::Database;

pub use handlers::handle_rpc;

pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/mcp", post(handlers::mcp))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}
