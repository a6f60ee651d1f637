use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use model::{
    route::{Route, RouteDetail},
    station::Station,
};
use railway::database::Database;
use serde::Serialize;
use utility::{id::Id, let_also::LetAlso};

use super::stations;
use crate::{
    common::{
        route_not_found, schema, HateoasResult, JsonBody, RouteErrorResponse, RouteResult,
        VecResponse, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/routes{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Route>))
        .route("/:id", get(get_route::<D>).delete(delete_route::<D>))
        .route("/", get(get_routes::<D>).post(create_route::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RouteListDto {
    id: Id<Route>,
    source: Id<Station>,
    destination: Id<Station>,
    full_route: String,
    distance: f64,
    distance_km: f64,
}

impl From<RouteDetail> for RouteListDto {
    fn from(route: RouteDetail) -> Self {
        Self {
            id: route.id,
            source: route.source.id,
            destination: route.destination.id,
            full_route: route.full_route,
            distance: route.distance,
            distance_km: route.distance_km,
        }
    }
}

async fn get_routes<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<RouteListDto>>> {
    client
        .route_details()
        .await
        .map(|routes| {
            routes
                .into_iter()
                .map(|route| route_list_hateoas(route, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn get_route<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<RouteDetail> {
    client
        .route_detail(Id::new(id))
        .await
        .map(|route| route_hateoas(route, base_url).json())
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn create_route<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    JsonBody(route): JsonBody<Route>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<RouteDetail>>)> {
    client
        .create_route(route)
        .await
        .map(|route| (StatusCode::CREATED, route_hateoas(route, base_url).json()))
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::POST, &original_uri))
}

async fn delete_route<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
) -> RouteResult<StatusCode> {
    client
        .delete::<Route>(Id::new(id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::DELETE, &original_uri))
}

pub(crate) fn route_list_hateoas(
    route: RouteDetail,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<RouteListDto> {
    let id = route.id;
    hateoas::Response::builder(RouteListDto::from(route), base_url)
        .link("self", resource!("/{}", id))
        .build()
}

pub(crate) fn route_hateoas(
    route: RouteDetail,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<RouteDetail> {
    let id = route.id;
    let source = route.source.id;
    let destination = route.destination.id;
    hateoas::Response::builder(route, base_url)
        .link("self", resource!("/{}", id))
        .link("source", stations::resource!("/{}", source))
        .link("destination", stations::resource!("/{}", destination))
        .build()
}
