use model::{
    order::{Order, Requester},
    ticket::Ticket,
    WithId,
};
use railway::database::Result;
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{ticket::TicketRow, with_id, with_ids};

use super::convert_error;

/// Fails with `Conflict` if the seat already carries a ticket.
pub async fn insert<'c, E>(executor: E, ticket: Ticket) -> Result<WithId<Ticket>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO tickets(
            journey_id,
            seat_id,
            train_id,
            order_id
        )
        VALUES ($1, $2, $3, $4)
        RETURNING id, journey_id, seat_id, train_id, order_id;
        ",
    )
    .bind(ticket.journey.raw())
    .bind(ticket.seat.raw())
    .bind(ticket.train.raw())
    .bind(ticket.order.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: TicketRow| with_id(row))
}

pub async fn get<'c, E>(executor: E, id: Id<Ticket>) -> Result<WithId<Ticket>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, journey_id, seat_id, train_id, order_id
        FROM tickets
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: TicketRow| with_id(row))
}

pub async fn of_order<'c, E>(executor: E, order: Id<Order>) -> Result<Vec<WithId<Ticket>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, journey_id, seat_id, train_id, order_id
        FROM tickets
        WHERE order_id = $1
        ORDER BY id;
        ",
    )
    .bind(order.raw())
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|tickets: Vec<TicketRow>| Ok(with_ids(tickets)))
}

pub async fn of_requester<'c, E>(
    executor: E,
    requester: &Requester,
) -> Result<Vec<WithId<Ticket>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT t.id, t.journey_id, t.seat_id, t.train_id, t.order_id
        FROM tickets t
        JOIN orders o ON o.id = t.order_id
        WHERE o.requester = $1
        ORDER BY t.id;
        ",
    )
    .bind(requester.as_str())
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|tickets: Vec<TicketRow>| Ok(with_ids(tickets)))
}
