use model::{train::TrainType, WithId};
use railway::database::Result;
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{train_type::TrainTypeRow, with_id, with_ids};

use super::{convert_error, deleted_one};

pub async fn get<'c, E>(executor: E, id: Id<TrainType>) -> Result<WithId<TrainType>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as("SELECT id, name FROM train_types WHERE id = $1;")
        .bind(id.raw())
        .fetch_one(executor)
        .await
        .map_err(convert_error)
        .map(|row: TrainTypeRow| with_id(row))
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<TrainType>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as("SELECT id, name FROM train_types ORDER BY id;")
        .fetch_all(executor)
        .await
        .map_err(convert_error)?
        .let_owned(|train_types: Vec<TrainTypeRow>| Ok(with_ids(train_types)))
}

pub async fn insert<'c, E>(executor: E, train_type: TrainType) -> Result<WithId<TrainType>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as("INSERT INTO train_types(name) VALUES ($1) RETURNING id, name;")
        .bind(&train_type.name)
        .fetch_one(executor)
        .await
        .map_err(convert_error)
        .map(|row: TrainTypeRow| with_id(row))
}

/// Fails with `Conflict` while trains of this type exist.
pub async fn delete<'c, E>(executor: E, id: Id<TrainType>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("DELETE FROM train_types WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)
        .and_then(deleted_one)
}
