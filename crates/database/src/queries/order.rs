use model::{
    order::{Order, Requester},
    WithId,
};
use railway::database::Result;
use sqlx::{Executor, Postgres};
use utility::id::Id;

use crate::data_model::order::OrderRow;

use super::convert_error;

pub async fn insert<'c, E>(executor: E, order: Order) -> Result<WithId<Order>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: OrderRow = sqlx::query_as(
        "
        INSERT INTO orders(
            requester,
            created_at
        )
        VALUES ($1, $2)
        RETURNING id, requester, created_at;
        ",
    )
    .bind(order.user.as_str())
    .bind(order.created_at)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?;
    row.into_order()
}

pub async fn get<'c, E>(executor: E, id: Id<Order>) -> Result<WithId<Order>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: OrderRow =
        sqlx::query_as("SELECT id, requester, created_at FROM orders WHERE id = $1;")
            .bind(id.raw())
            .fetch_one(executor)
            .await
            .map_err(convert_error)?;
    row.into_order()
}

pub async fn of_requester<'c, E>(
    executor: E,
    requester: &Requester,
) -> Result<Vec<WithId<Order>>>
where
    E: Executor<'c, Database = Postgres>,
{
    let rows: Vec<OrderRow> = sqlx::query_as(
        "
        SELECT id, requester, created_at
        FROM orders
        WHERE requester = $1
        ORDER BY id;
        ",
    )
    .bind(requester.as_str())
    .fetch_all(executor)
    .await
    .map_err(convert_error)?;
    rows.into_iter().map(OrderRow::into_order).collect()
}
