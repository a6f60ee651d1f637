use model::{train::Train, WithId};
use railway::database::Result;
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{train::TrainRow, with_id, with_ids};

use super::{convert_error, deleted_one};

pub async fn get<'c, E>(executor: E, id: Id<Train>) -> Result<WithId<Train>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, name, carriage_num, places_in_carriage, train_type_id, image
        FROM trains
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: TrainRow| with_id(row))
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Train>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, name, carriage_num, places_in_carriage, train_type_id, image
        FROM trains
        ORDER BY id;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|trains: Vec<TrainRow>| Ok(with_ids(trains)))
}

/// Inserts the train row only. Seats are generated by the inventory.
pub async fn insert<'c, E>(executor: E, train: Train) -> Result<WithId<Train>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO trains(
            name,
            carriage_num,
            places_in_carriage,
            train_type_id,
            image
        )
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, carriage_num, places_in_carriage, train_type_id, image;
        ",
    )
    .bind(&train.name)
    .bind(train.carriage_num)
    .bind(train.places_in_carriage)
    .bind(train.train_type.raw())
    .bind(&train.image)
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: TrainRow| with_id(row))
}

pub async fn delete<'c, E>(executor: E, id: Id<Train>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("DELETE FROM trains WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)
        .and_then(deleted_one)
}
