use async_trait::async_trait;
use model::{seat::Seat, train::Train, WithId};
use railway::database::{Result, SeatRepo};
use sqlx::prelude::FromRow;
use utility::id::Id;

use crate::{
    queries::seat::{get, insert_all, lock, mark_unavailable, of_train},
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct SeatRow {
    pub id: i64,
    pub train_id: i64,
    pub carriage: i32,
    pub seat_number: i32,
    pub is_available: bool,
}

impl DatabaseRow for SeatRow {
    type Model = Seat;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Seat {
            train: Id::new(self.train_id),
            carriage: self.carriage,
            seat_number: self.seat_number,
            is_available: self.is_available,
        }
    }
}

/// A seat row together with whether the statement just took it.
#[derive(Debug, Clone, FromRow)]
pub struct TakenSeatRow {
    pub id: i64,
    pub train_id: i64,
    pub carriage: i32,
    pub seat_number: i32,
    pub taken: bool,
}

impl TakenSeatRow {
    pub fn into_seat_row(self) -> SeatRow {
        SeatRow {
            id: self.id,
            train_id: self.train_id,
            carriage: self.carriage,
            seat_number: self.seat_number,
            is_available: !self.taken,
        }
    }
}

#[async_trait]
impl SeatRepo for PgDatabaseAutocommit {
    async fn insert_seats(&mut self, seats: &[Seat]) -> Result<Vec<WithId<Seat>>> {
        insert_all(&self.pool, seats).await
    }

    async fn get_seat(&mut self, id: Id<Seat>) -> Result<WithId<Seat>> {
        get(&self.pool, id).await
    }

    /// Outside of a transaction the locks are released right away.
    async fn lock_seats(&mut self, ids: &[Id<Seat>]) -> Result<Vec<WithId<Seat>>> {
        lock(&self.pool, ids).await
    }

    async fn mark_unavailable(&mut self, id: Id<Seat>) -> Result<WithId<Seat>> {
        mark_unavailable(&self.pool, id).await
    }

    async fn seats_of_train(&mut self, train: Id<Train>) -> Result<Vec<WithId<Seat>>> {
        of_train(&self.pool, train).await
    }
}

#[async_trait]
impl<'a> SeatRepo for PgDatabaseTransaction<'a> {
    async fn insert_seats(&mut self, seats: &[Seat]) -> Result<Vec<WithId<Seat>>> {
        insert_all(&mut *self.tx, seats).await
    }

    async fn get_seat(&mut self, id: Id<Seat>) -> Result<WithId<Seat>> {
        get(&mut *self.tx, id).await
    }

    async fn lock_seats(&mut self, ids: &[Id<Seat>]) -> Result<Vec<WithId<Seat>>> {
        lock(&mut *self.tx, ids).await
    }

    async fn mark_unavailable(&mut self, id: Id<Seat>) -> Result<WithId<Seat>> {
        mark_unavailable(&mut *self.tx, id).await
    }

    async fn seats_of_train(&mut self, train: Id<Train>) -> Result<Vec<WithId<Seat>>> {
        of_train(&mut *self.tx, train).await
    }
}
