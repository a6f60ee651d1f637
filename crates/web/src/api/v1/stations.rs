use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use model::{station::Station, WithId};
use railway::database::Database;
use utility::{id::Id, let_also::LetAlso};

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
        crate::api::v1::resource!("/stations{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Station>))
        .route("/:id", get(get_station::<D>).delete(delete_station::<D>))
        .route("/", get(get_stations::<D>).post(create_station::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_stations<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Station>>>> {
    client
        .list::<Station>()
        .await
        .map(|stations| {
            stations
                .into_iter()
                .map(|station| station_hateoas(station, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn get_station<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<Station>> {
    client
        .get::<Station>(Id::new(id))
        .await
        .map(|station| station_hateoas(station, base_url).json())
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn create_station<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    JsonBody(station): JsonBody<Station>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<WithId<Station>>>)> {
    client
        .create_station(station)
        .await
        .map(|station| (StatusCode::CREATED, station_hateoas(station, base_url).json()))
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::POST, &original_uri))
}

async fn delete_station<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
) -> RouteResult<StatusCode> {
    client
        .delete::<Station>(Id::new(id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::DELETE, &original_uri))
}

pub(crate) fn station_hateoas(
    station: WithId<Station>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<Station>> {
    let id = station.id;
    hateoas::Response::builder(station, base_url)
        .link("self", resource!("/{}", id))
        .build()
}
