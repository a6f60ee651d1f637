use model::{crew::Crew, WithId};
use railway::database::Result;
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{crew::CrewRow, with_id, with_ids};

use super::{convert_error, deleted_one};

pub async fn get<'c, E>(executor: E, id: Id<Crew>) -> Result<WithId<Crew>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as("SELECT id, first_name, last_name FROM crews WHERE id = $1;")
        .bind(id.raw())
        .fetch_one(executor)
        .await
        .map_err(convert_error)
        .map(|row: CrewRow| with_id(row))
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Crew>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as("SELECT id, first_name, last_name FROM crews ORDER BY id;")
        .fetch_all(executor)
        .await
        .map_err(convert_error)?
        .let_owned(|crews: Vec<CrewRow>| Ok(with_ids(crews)))
}

pub async fn insert<'c, E>(executor: E, crew: Crew) -> Result<WithId<Crew>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO crews(
            first_name,
            last_name
        )
        VALUES ($1, $2)
        RETURNING id, first_name, last_name;
        ",
    )
    .bind(&crew.first_name)
    .bind(&crew.last_name)
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: CrewRow| with_id(row))
}

pub async fn delete<'c, E>(executor: E, id: Id<Crew>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("DELETE FROM crews WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)
        .and_then(deleted_one)
}
