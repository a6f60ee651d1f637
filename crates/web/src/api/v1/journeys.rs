use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use model::{
    journey::{Journey, JourneyDetail},
    route::Route,
    train::Train,
};
use railway::database::Database;
use serde::Serialize;
use utility::{id::Id, let_also::LetAlso};

use super::{routes as route_paths, trains};
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
        crate::api::v1::resource!("/journeys{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Journey>))
        .route("/:id", get(get_journey::<D>).delete(delete_journey::<D>))
        .route("/", get(get_journeys::<D>).post(create_journey::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct JourneyListDto {
    id: Id<Journey>,
    route: Id<Route>,
    full_route: String,
    train: Id<Train>,
    train_name: String,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
}

impl From<JourneyDetail> for JourneyListDto {
    fn from(journey: JourneyDetail) -> Self {
        Self {
            id: journey.id,
            route: journey.route.id,
            full_route: journey.route.full_route,
            train: journey.train.id,
            train_name: journey.train.name,
            departure_time: journey.departure_time,
            arrival_time: journey.arrival_time,
        }
    }
}

async fn get_journeys<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<JourneyListDto>>> {
    client
        .journey_details()
        .await
        .map(|journeys| {
            journeys
                .into_iter()
                .map(|journey| journey_list_hateoas(journey, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn get_journey<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<JourneyDetail> {
    client
        .journey_detail(Id::new(id))
        .await
        .map(|journey| journey_hateoas(journey, base_url).json())
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn create_journey<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    JsonBody(journey): JsonBody<Journey>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<JourneyDetail>>)> {
    client
        .create_journey(journey)
        .await
        .map(|journey| (StatusCode::CREATED, journey_hateoas(journey, base_url).json()))
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::POST, &original_uri))
}

async fn delete_journey<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
) -> RouteResult<StatusCode> {
    client
        .delete::<Journey>(Id::new(id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::DELETE, &original_uri))
}

pub(crate) fn journey_list_hateoas(
    journey: JourneyDetail,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<JourneyListDto> {
    let id = journey.id;
    hateoas::Response::builder(JourneyListDto::from(journey), base_url)
        .link("self", resource!("/{}", id))
        .build()
}

pub(crate) fn journey_hateoas(
    journey: JourneyDetail,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<JourneyDetail> {
    let id = journey.id;
    let route = journey.route.id;
    let train = journey.train.id;
    hateoas::Response::builder(journey, base_url)
        .link("self", resource!("/{}", id))
        .link("route", route_paths::resource!("/{}", route))
        .link("train", trains::resource!("/{}", train))
        .build()
}
