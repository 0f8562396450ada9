mod auth;
mod handlers;
mod pagination;
mod validation;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{Router, Server};
use common::{
    config::Config,
    ledger::{Anchor, LedgerClient},
    logging,
};
use db::{Database, DatabaseConnection};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::new()?;

    logging::init(&config);

    let Some(server_config) = config.server.as_ref() else {
        return Err(anyhow::Error::msg("unable to load server config"));
    };

    info!("connecting to database");
    let database = Arc::new(Database::connect(&config.database.url).await?);

    let ledger = Arc::new(LedgerClient::new(&config.ledger)?);
    info!(address = ledger.address(), "ledger operator account loaded");

    let server = Server::bind(&server_config.address);

    server
        .serve(app_router(database, ledger).into_make_service())
        .await?;

    Ok(())
}

fn app_router(database: Arc<DatabaseConnection>, ledger: Arc<dyn Anchor>) -> Router {
    Router::new()
        .nest("/auth", handlers::auth::routes(database.clone()))
        .nest("/admin", handlers::admin::routes(database.clone()))
        .nest("/superAdmin", handlers::super_admin::routes(database.clone()))
        .with_state(database.clone())
        .nest(
            "/contracts",
            handlers::contracts::routes(database, ledger),
        )
}
