use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use model::{train::TrainType, WithId};
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
        crate::api::v1::resource!("/train-types{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<TrainType>))
        .route("/:id", get(get_train_type::<D>).delete(delete_train_type::<D>))
        .route("/", get(get_train_types::<D>).post(create_train_type::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_train_types<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<TrainType>>>> {
    client
        .list::<TrainType>()
        .await
        .map(|train_types| {
            train_types
                .into_iter()
                .map(|train_type| train_type_hateoas(train_type, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn get_train_type<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<TrainType>> {
    client
        .get::<TrainType>(Id::new(id))
        .await
        .map(|train_type| train_type_hateoas(train_type, base_url).json())
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn create_train_type<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    JsonBody(train_type): JsonBody<TrainType>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<WithId<TrainType>>>)> {
    client
        .create_train_type(train_type)
        .await
        .map(|train_type| {
            (StatusCode::CREATED, train_type_hateoas(train_type, base_url).json())
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::POST, &original_uri))
}

/// Answers `409 Conflict` while trains of the type exist.
async fn delete_train_type<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
) -> RouteResult<StatusCode> {
    client
        .delete::<TrainType>(Id::new(id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::DELETE, &original_uri))
}

pub(crate) fn train_type_hateoas(
    train_type: WithId<TrainType>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<TrainType>> {
    let id = train_type.id;
    hateoas::Response::builder(train_type, base_url)
        .link("self", resource!("/{}", id))
        .build()
}
