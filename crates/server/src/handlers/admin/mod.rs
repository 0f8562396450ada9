/// Company contract listing route.
mod list;

/// Company contract details route.
mod details;

/// Draft contract deletion route.
mod delete;

/// Company dashboard statistics route.
mod stats;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use db::DatabaseConnection;

/// Create a router with company-scoped management routes.
///
/// Every route requires an authenticated user; results are always
/// limited to the caller's own company.
pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/contracts", get(list::list))
        .route(
            "/contracts/:id",
            get(details::details).delete(delete::delete),
        )
        .route("/stats", get(stats::stats))
        .route_layer(from_fn_with_state(
            database,
            crate::auth::require_authentication::<false, false, _>,
        ))
}
