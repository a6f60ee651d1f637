use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use model::{crew::Crew, WithId};
use railway::database::Database;
use schemars::JsonSchema;
use serde::Serialize;
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
        crate::api::v1::resource!("/crews{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Crew>))
        .route("/:id", get(get_crew::<D>).delete(delete_crew::<D>))
        .route("/", get(get_crews::<D>).post(create_crew::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub(crate) struct CrewDto {
    id: Id<Crew>,
    first_name: String,
    last_name: String,
    full_name: String,
}

impl From<WithId<Crew>> for CrewDto {
    fn from(crew: WithId<Crew>) -> Self {
        Self {
            id: crew.id,
            full_name: crew.content.full_name(),
            first_name: crew.content.first_name,
            last_name: crew.content.last_name,
        }
    }
}

async fn get_crews<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<CrewDto>>> {
    client
        .list::<Crew>()
        .await
        .map(|crews| {
            crews
                .into_iter()
                .map(|crew| crew_hateoas(crew, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn get_crew<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<CrewDto> {
    client
        .get::<Crew>(Id::new(id))
        .await
        .map(|crew| crew_hateoas(crew, base_url).json())
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn create_crew<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    JsonBody(crew): JsonBody<Crew>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<CrewDto>>)> {
    client
        .create_crew(crew)
        .await
        .map(|crew| (StatusCode::CREATED, crew_hateoas(crew, base_url).json()))
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::POST, &original_uri))
}

async fn delete_crew<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
) -> RouteResult<StatusCode> {
    client
        .delete::<Crew>(Id::new(id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::DELETE, &original_uri))
}

pub(crate) fn crew_hateoas(
    crew: WithId<Crew>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<CrewDto> {
    let id = crew.id;
    hateoas::Response::builder(CrewDto::from(crew), base_url)
        .link("self", resource!("/{}", id))
        .build()
}
