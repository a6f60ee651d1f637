use axum::{
    routing::{get, on},
    Router,
};
use railway::database::Database;

use crate::{
    common::{route_not_found, METHOD_FILTER_ALL},
    WebState,
};

mod crews;
mod journeys;
mod orders;
mod routes;
mod stations;
mod tickets;
mod train_types;
mod trains;

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::resource!("/v1{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/", get(route_not_found))
        .nest_service("/stations", stations::routes(state.clone()))
        .nest_service("/train-types", train_types::routes(state.clone()))
        .nest_service("/crews", crews::routes(state.clone()))
        .nest_service("/routes", routes::routes(state.clone()))
        .nest_service("/trains", trains::routes(state.clone()))
        .nest_service("/journeys", journeys::routes(state.clone()))
        .nest_service("/orders", orders::routes(state.clone()))
        .nest_service("/tickets", tickets::routes(state))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}
