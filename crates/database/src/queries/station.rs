use model::{station::Station, WithId};
use railway::database::Result;
use sqlx::{Executor, Postgres};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{station::StationRow, with_id, with_ids};

use super::{convert_error, deleted_one};

pub async fn get<'c, E>(executor: E, id: Id<Station>) -> Result<WithId<Station>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, name, latitude, longitude
        FROM stations
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: StationRow| with_id(row))
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Station>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, name, latitude, longitude
        FROM stations
        ORDER BY id;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|stations: Vec<StationRow>| Ok(with_ids(stations)))
}

pub async fn insert<'c, E>(executor: E, station: Station) -> Result<WithId<Station>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO stations(
            name,
            latitude,
            longitude
        )
        VALUES ($1, $2, $3)
        RETURNING id, name, latitude, longitude;
        ",
    )
    .bind(&station.name)
    .bind(station.latitude)
    .bind(station.longitude)
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: StationRow| with_id(row))
}

pub async fn delete<'c, E>(executor: E, id: Id<Station>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("DELETE FROM stations WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)
        .and_then(deleted_one)
}
