/// Company registration route.
mod signup;

/// User authentication route.
mod login;

/// Current user details route.
mod me;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use db::DatabaseConnection;

/// Create a router that provides an API server with authentication routes.
pub(crate) fn routes(database: Arc<DatabaseConnection>) -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/signup", post(signup::signup))
        .route("/login", post(login::login))
        .merge(
            Router::new().route("/me", get(me::me)).route_layer(
                from_fn_with_state(database, crate::auth::require_authentication::<false, false, _>),
            ),
        )
}
