/// Company listing route.
mod companies;

/// Cross-company contract listing route.
mod contracts;

/// Platform statistics route.
mod stats;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};
use db::DatabaseConnection;

/// Create a router with platform-wide management routes.
///
/// Every route requires the super admin role.
pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/companies", get(companies::companies))
        .route("/contracts", get(contracts::contracts))
        .route("/stats", get(stats::stats))
        .route_layer(from_fn_with_state(
            database,
            crate::auth::require_authentication::<true, false, _>,
        ))
}
