use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use model::{
    journey::Journey,
    order::Order,
    seat::Seat,
    ticket::{Ticket, TicketDetail, TicketRequest},
};
use railway::{database::Database, reservation::Reservation};
use serde::{Deserialize, Serialize};
use utility::{id::Id, let_also::LetAlso};

use super::{journeys, orders, trains};
use crate::{
    common::{
        route_not_found, schema, HateoasResult, JsonBody, RouteErrorResponse, RouteResult,
        VecResponse, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::{
        base_url::{base_url_middleware, BaseUrl},
        requester::Authenticated,
    },
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/tickets{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<TicketRequest>))
        .route("/:id", get(get_ticket::<D>))
        .route("/", get(get_tickets::<D>).post(reserve_tickets::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TicketBatch {
    tickets: Vec<TicketRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct TicketListDto {
    id: Id<Ticket>,
    order: Id<Order>,
    journey: Id<Journey>,
    full_route: String,
    train_name: String,
    departure_time: DateTime<Utc>,
    seat: Id<Seat>,
    carriage: i32,
    seat_number: i32,
}

impl From<TicketDetail> for TicketListDto {
    fn from(ticket: TicketDetail) -> Self {
        Self {
            id: ticket.id,
            order: ticket.order,
            journey: ticket.journey.id,
            full_route: ticket.journey.route.full_route,
            train_name: ticket.journey.train.name,
            departure_time: ticket.journey.departure_time,
            seat: ticket.seat.id,
            carriage: ticket.seat.content.carriage,
            seat_number: ticket.seat.content.seat_number,
        }
    }
}

async fn get_tickets<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Authenticated(requester): Authenticated,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<TicketListDto>>> {
    client
        .tickets(&requester)
        .await
        .map(|tickets| {
            tickets
                .into_iter()
                .map(|ticket| ticket_list_hateoas(ticket, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

async fn get_ticket<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Authenticated(requester): Authenticated,
    Path(id): Path<i64>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<TicketDetail> {
    client
        .ticket_detail(&requester, Id::new(id))
        .await
        .map(|ticket| ticket_hateoas(ticket, base_url).json())
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::GET, &original_uri))
}

/// Reserves every requested seat under one new order. A single unavailable
/// seat fails the whole batch with `400` naming that seat.
async fn reserve_tickets<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Authenticated(requester): Authenticated,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    JsonBody(batch): JsonBody<TicketBatch>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<Reservation>>)> {
    client
        .reserve_tickets(&requester, &batch.tickets)
        .await
        .map(|reservation| {
            let order = reservation.order.id;
            let response = hateoas::Response::builder(reservation, base_url)
                .link("order", orders::resource!("/{}", order))
                .build();
            (StatusCode::CREATED, Json(response))
        })
        .map_err(|why| RouteErrorResponse::from(why).at(&Method::POST, &original_uri))
}

fn ticket_list_hateoas(
    ticket: TicketDetail,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<TicketListDto> {
    let id = ticket.id;
    let order = ticket.order;
    hateoas::Response::builder(TicketListDto::from(ticket), base_url)
        .link("self", resource!("/{}", id))
        .link("order", orders::resource!("/{}", order))
        .build()
}

fn ticket_hateoas(ticket: TicketDetail, base_url: Arc<BaseUrl>) -> hateoas::Response<TicketDetail> {
    let id = ticket.id;
    let order = ticket.order;
    let journey = ticket.journey.id;
    let train = ticket.seat.content.train;
    let seat = ticket.seat.id;
    hateoas::Response::builder(ticket, base_url)
        .link("self", resource!("/{}", id))
        .link("order", orders::resource!("/{}", order))
        .link("journey", journeys::resource!("/{}", journey))
        .link("seat", trains::resource!("/{}/seats/{}", train, seat))
        .build()
}
