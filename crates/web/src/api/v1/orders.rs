use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::Method,
    routing::{get, on},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use model::order::{Order, OrderDetail};
use railway::database::Database;
use serde::Serialize;
use utility::{id::Id, let_also::LetAlso};

use super::tickets;
use crate::{
    common::{route_not_found, HateoasResult, RouteErrorResponse, VecResponse, METHOD_FILTER_ALL},
    hateoas,
    middleware::{
        base_url::{base_url_middleware, BaseUrl},
        requester::Authenticated,
    },
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/orders{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

/// Orders are created by reserving tickets, so there is no `POST` here.
pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/:id", get(get_order::<D>))
        .route("/", get(get_orders::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OrderListDto {
    id: Id<Order>,
    created_at: DateTime<Utc>,
    ticket_count: usize,
}

impl From<OrderDetail> for OrderListDto {
    fn from(order: OrderDetail) -> Self {
        Self {
            id: order.id,
            created_at: order.created_at,
            ticket_count: order.tickets.len(),
        }
    }
}

async fn get_orders<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Authenticated(requester): Authenticated,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<OrderListDto>>> {
    client
        .orders(&requester)
        .await
        .map(|orders| {
            orders
                .into_iter()
                .map(|order| order_list_hateoas(order, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn get_order<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Authenticated(requester): Authenticated,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<OrderDetail> {
    client
        .order_detail(&requester, Id::new(id))
        .await
        .map(|order| order_hateoas(order, base_url).json())
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

fn order_list_hateoas(
    order: OrderDetail,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<OrderListDto> {
    let id = order.id;
    hateoas::Response::builder(OrderListDto::from(order), base_url)
        .link("self", resource!("/{}", id))
        .build()
}

fn order_hateoas(order: OrderDetail, base_url: Arc<BaseUrl>) -> hateoas::Response<OrderDetail> {
    let id = order.id;
    hateoas::Response::builder(order, base_url)
        .link("self", resource!("/{}", id))
        .link("tickets", tickets::resource!("/"))
        .build()
}
