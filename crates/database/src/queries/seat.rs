use model::{seat::Seat, train::Train, WithId};
use railway::database::{DatabaseError, Result};
use sqlx::{Executor, Postgres};
use utility::{
    id::{Id, IdWrapper},
    let_also::LetAlso,
};

use crate::data_model::{
    seat::{SeatRow, TakenSeatRow},
    with_id, with_ids,
};

use super::{convert_error, insert_all_returning};

const COLUMNS: &[&str] = &["train_id", "carriage", "seat_number", "is_available"];
const RETURNING: &[&str] = &["id", "train_id", "carriage", "seat_number", "is_available"];

/// Inserts all seats in one statement. The caller keeps the batch below
/// `BULK_INSERT_MAX`.
pub async fn insert_all<'c, E>(executor: E, seats: &[Seat]) -> Result<Vec<WithId<Seat>>>
where
    E: Executor<'c, Database = Postgres>,
{
    insert_all_returning(executor, "seats", COLUMNS, RETURNING, seats, |query, seat| {
        query
            .bind(seat.train.raw())
            .bind(seat.carriage)
            .bind(seat.seat_number)
            .bind(seat.is_available)
    })
    .await
    .map_err(convert_error)?
    .let_owned(|seats: Vec<SeatRow>| Ok(with_ids(seats)))
}

pub async fn get<'c, E>(executor: E, id: Id<Seat>) -> Result<WithId<Seat>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, train_id, carriage, seat_number, is_available
        FROM seats
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .map(|row: SeatRow| with_id(row))
}

/// Row locks on all given seats, taken in ascending id order.
pub async fn lock<'c, E>(executor: E, ids: &[Id<Seat>]) -> Result<Vec<WithId<Seat>>>
where
    E: Executor<'c, Database = Postgres>,
{
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();
    let seats: Vec<SeatRow> = sqlx::query_as(
        "
        SELECT id, train_id, carriage, seat_number, is_available
        FROM seats
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE;
        ",
    )
    .bind(ids.as_slice().raw())
    .fetch_all(executor)
    .await
    .map_err(convert_error)?;

    if seats.len() != ids.len() {
        return Err(DatabaseError::NotFound);
    }
    Ok(with_ids(seats))
}

/// Flips an available seat to unavailable in a single statement. The outer
/// select still sees the row as it was before the update.
pub async fn mark_unavailable<'c, E>(executor: E, id: Id<Seat>) -> Result<WithId<Seat>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: Option<TakenSeatRow> = sqlx::query_as(
        "
        WITH taken AS (
            UPDATE seats
            SET is_available = FALSE
            WHERE id = $1 AND is_available
            RETURNING id
        )
        SELECT
            id, train_id, carriage, seat_number,
            EXISTS (SELECT 1 FROM taken) AS taken
        FROM seats
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?;

    match row {
        None => Err(DatabaseError::NotFound),
        Some(row) if !row.taken => Err(DatabaseError::Conflict),
        Some(row) => Ok(with_id(row.into_seat_row())),
    }
}

pub async fn of_train<'c, E>(executor: E, train: Id<Train>) -> Result<Vec<WithId<Seat>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, train_id, carriage, seat_number, is_available
        FROM seats
        WHERE train_id = $1
        ORDER BY carriage, seat_number;
        ",
    )
    .bind(train.raw())
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|seats: Vec<SeatRow>| Ok(with_ids(seats)))
}
