pub use crate::common::RouteResult;

use axum::Router;
use config::WebConfig;
use railway::{database::Database, Client};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod common;
pub mod config;
pub mod hateoas;
pub mod middleware;

#[derive(Clone)]
pub struct WebState<D>
where
    D: Database,
{
    pub client: Client<D>,
}

impl<D> WebState<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self {
            client: Client::new(database),
        }
    }
}

/// The complete application, without a listener attached.
pub fn app<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .nest_service("/api", api::routes(state))
        .fallback(common::route_not_found)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server<D: Database>(
    state: WebState<D>,
    config: WebConfig,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(&config.bind_address).await?;
    tracing::info!("listening on {}", config.bind_address);
    axum::serve(listener, app(state).into_make_service()).await?;

    Ok(())
}
