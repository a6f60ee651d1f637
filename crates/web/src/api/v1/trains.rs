use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use model::{
    seat::Seat,
    train::{Train, TrainDetail},
    WithId,
};
use railway::{database::Database, RequestError};
use serde::Serialize;
use utility::{id::Id, let_also::LetAlso};

use super::train_types;
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
        crate::api::v1::resource!("/trains{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Train>))
        .route("/:id/seats", get(get_seats::<D>))
        .route("/:id/seats/:seat", get(get_seat::<D>))
        .route("/:id", get(get_train::<D>).delete(delete_train::<D>))
        .route("/", get(get_trains::<D>).post(create_train::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TrainListDto {
    id: Id<Train>,
    name: String,
    train_type: String,
    num_seats: i64,
    image: Option<String>,
}

impl From<TrainDetail> for TrainListDto {
    fn from(train: TrainDetail) -> Self {
        Self {
            id: train.id,
            name: train.name,
            train_type: train.train_type.content.name,
            num_seats: train.num_seats,
            image: train.image,
        }
    }
}

async fn get_trains<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<TrainListDto>>> {
    client
        .train_details()
        .await
        .map(|trains| {
            trains
                .into_iter()
                .map(|train| train_list_hateoas(train, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn get_train<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<TrainDetail> {
    client
        .train_detail(Id::new(id))
        .await
        .map(|train| train_hateoas(train, base_url).json())
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

/// Creates the train together with one seat per carriage place.
async fn create_train<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    JsonBody(train): JsonBody<Train>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<TrainDetail>>)> {
    client
        .create_train(train)
        .await
        .map(|train| (StatusCode::CREATED, train_hateoas(train, base_url).json()))
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::POST, &original_uri))
}

async fn delete_train<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
) -> RouteResult<StatusCode> {
    client
        .delete::<Train>(Id::new(id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::DELETE, &original_uri))
}

async fn get_seats<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Seat>>>> {
    client
        .train_seats(Id::new(id))
        .await
        .map(|seats| {
            seats
                .into_iter()
                .map(|seat| seat_hateoas(seat, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn get_seat<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path((train, seat)): Path<(i64, i64)>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<Seat>> {
    client
        .get_seat(Id::new(seat))
        .await
        .and_then(|seat| {
            // a seat is only addressable below its own train
            if seat.content.train.raw() == train {
                Ok(seat)
            } else {
                Err(RequestError::NotFound)
            }
        })
        .map(|seat| seat_hateoas(seat, base_url).json())
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

pub(crate) fn train_list_hateoas(
    train: TrainDetail,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<TrainListDto> {
    let id = train.id;
    hateoas::Response::builder(TrainListDto::from(train), base_url)
        .link("self", resource!("/{}", id))
        .link("seats", resource!("/{}/seats", id))
        .build()
}

pub(crate) fn train_hateoas(
    train: TrainDetail,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<TrainDetail> {
    let id = train.id;
    let train_type = train.train_type.id;
    hateoas::Response::builder(train, base_url)
        .link("self", resource!("/{}", id))
        .link("seats", resource!("/{}/seats", id))
        .link("train_type", train_types::resource!("/{}", train_type))
        .build()
}

pub(crate) fn seat_hateoas(
    seat: WithId<Seat>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<Seat>> {
    let id = seat.id;
    let train = seat.content.train;
    hateoas::Response::builder(seat, base_url)
        .link("self", resource!("/{}/seats/{}", train, id))
        .link("train", resource!("/{}", train))
        .build()
}
