use model::{journey::Journey, WithId};
use railway::database::Result;
use sqlx::{Executor, Postgres};
use utility::{
    id::{Id, IdWrapper},
    let_also::LetAlso,
};

use crate::data_model::{journey::JourneyRow, with_id, with_ids};

use super::{convert_error, deleted_one};

pub async fn get<'c, E>(executor: E, id: Id<Journey>) -> Result<WithId<Journey>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            j.id, j.route_id, j.train_id, j.departure_time, j.arrival_time,
            COALESCE(
                ARRAY_AGG(jc.crew_id ORDER BY jc.crew_id)
                    FILTER (WHERE jc.crew_id IS NOT NULL),
                '{}'
            ) AS crew_ids
        FROM journeys j
        LEFT JOIN journey_crews jc ON jc.journey_id = j.id
        WHERE j.id = $1
        GROUP BY j.id;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: JourneyRow| with_id(row))
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Journey>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT
            j.id, j.route_id, j.train_id, j.departure_time, j.arrival_time,
            COALESCE(
                ARRAY_AGG(jc.crew_id ORDER BY jc.crew_id)
                    FILTER (WHERE jc.crew_id IS NOT NULL),
                '{}'
            ) AS crew_ids
        FROM journeys j
        LEFT JOIN journey_crews jc ON jc.journey_id = j.id
        GROUP BY j.id
        ORDER BY j.id;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|journeys: Vec<JourneyRow>| Ok(with_ids(journeys)))
}

/// Inserts the journey and its crew links in one statement.
pub async fn insert<'c, E>(executor: E, journey: Journey) -> Result<WithId<Journey>>
where
    E: Executor<'c, Database = Postgres>,
{
    let journey = journey.normalized();
    sqlx::query_as(
        "
        WITH journey AS (
            INSERT INTO journeys(
                route_id,
                train_id,
                departure_time,
                arrival_time
            )
            VALUES ($1, $2, $3, $4)
            RETURNING id, route_id, train_id, departure_time, arrival_time
        ), crews AS (
            INSERT INTO journey_crews(journey_id, crew_id)
            SELECT journey.id, crew_id
            FROM journey, UNNEST($5::BIGINT[]) AS crew_id
        )
        SELECT
            id, route_id, train_id, departure_time, arrival_time,
            $5::BIGINT[] AS crew_ids
        FROM journey;
        ",
    )
    .bind(journey.route.raw())
    .bind(journey.train.raw())
    .bind(journey.departure_time)
    .bind(journey.arrival_time)
    .bind(journey.crews.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: JourneyRow| with_id(row))
}

pub async fn delete<'c, E>(executor: E, id: Id<Journey>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query("DELETE FROM journeys WHERE id = $1;")
        .bind(id.raw())
        .execute(executor)
        .await
        .map_err(convert_error)
        .and_then(deleted_one)
}
