use model::{route::Route, WithId};
use railway::database::Result;
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{route::RouteRow, with_id, with_ids};

use super::{convert_error, deleted_one};

pub async fn get<'c, E>(executor: E, id: Id<Route>) -> Result<WithId<Route>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as("SELECT id, source_id, destination_id FROM routes WHERE id = $1;")
        .bind(id.raw())
        .fetch_one(executor)
        .await
        .map_err(convert_error)
        .map(|row: RouteRow| with_id(row))
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Route>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as("SELECT id, source_id, destination_id FROM routes ORDER BY id;")
        .fetch_all(executor)
        .await
        .map_err(convert_error)?
        .let_owned(|routes: Vec<RouteRow>| Ok(with_ids(routes)))
}

pub async fn insert<'c, E>(executor: E, route: Route) -> Result<WithId<Route>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO routes(
            source_id,
            destination_id
        )
        VALUES ($1, $2)
        RETURNING id, source_id, destination_id;
        ",
    )
    .bind(route.source.raw())
    .bind(route.destination.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: RouteRow| with_id(row))
}

pub async fn delete<'c, E>(executor: E, id: Id<Route>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("DELETE FROM routes WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)
        .and_then(deleted_one)
}
