//! Seat inventory: generating the seats of a new train and taking seats out
//! of sale during a reservation.

use model::{
    seat::{Seat, SeatLayout},
    train::{Train, TrainType},
    WithId,
};
use utility::id::Id;

use crate::{
    database::{DatabaseError, DatabaseOperations, Repo, SeatRepo},
    RequestError, RequestResult,
};

/// Inserts `train` together with its complete seat inventory.
///
/// Must run inside the transaction that is committed for the train, so that
/// a failure half way through never leaves a train with a partial inventory.
pub async fn create_train<T>(
    tx: &mut T,
    train: Train,
    bulk_insert_max: usize,
) -> RequestResult<(WithId<Train>, Vec<WithId<Seat>>)>
where
    T: DatabaseOperations + Send,
{
    let layout = train
        .seat_layout()
        .map_err(|why| RequestError::invalid(why.to_string()))?;

    // surface a missing train type as not found rather than a constraint error
    Repo::<TrainType>::get(&mut *tx, train.train_type).await?;

    let train = Repo::<Train>::insert(&mut *tx, train).await?;
    let seats = create_seats(tx, train.id, layout, bulk_insert_max).await?;
    Ok((train, seats))
}

/// Generates one available seat per position of `layout`.
pub async fn create_seats<T>(
    tx: &mut T,
    train: Id<Train>,
    layout: SeatLayout,
    bulk_insert_max: usize,
) -> RequestResult<Vec<WithId<Seat>>>
where
    T: SeatRepo + Send,
{
    let chunk_size = bulk_insert_max.max(1);
    let mut seats = layout.seats(train);
    let mut created = Vec::with_capacity(layout.len());
    loop {
        let chunk = seats.by_ref().take(chunk_size).collect::<Vec<_>>();
        if chunk.is_empty() {
            break;
        }
        created.extend(tx.insert_seats(&chunk).await?);
    }
    if created.len() != layout.len() {
        return Err(RequestError::Other(
            format!(
                "expected {} seats for train {}, created {}",
                layout.len(),
                train,
                created.len()
            )
            .into(),
        ));
    }
    Ok(created)
}

/// Takes a seat out of sale. A seat that is already unavailable is reported
/// as `SeatUnavailable`.
pub async fn take_seat<T>(tx: &mut T, seat: Id<Seat>) -> RequestResult<WithId<Seat>>
where
    T: SeatRepo + Send,
{
    tx.mark_unavailable(seat).await.map_err(|why| match why {
        DatabaseError::Conflict => RequestError::SeatUnavailable(seat),
        other => other.into(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use model::ExampleData;

    use super::*;
    use crate::{
        database::{Database, DatabaseTransaction},
        memory::MemoryDatabase,
    };

    async fn setup() -> (MemoryDatabase, Id<TrainType>) {
        let database = MemoryDatabase::new();
        let train_type = Repo::<TrainType>::insert(
            &mut database.auto(),
            TrainType::example_data(),
        )
        .await
        .unwrap();
        (database, train_type.id)
    }

    fn train(train_type: Id<TrainType>, carriages: i32, places: i32) -> Train {
        Train {
            name: "Test Train".to_owned(),
            carriage_num: carriages,
            places_in_carriage: places,
            train_type,
            image: None,
        }
    }

    #[tokio::test]
    async fn creates_one_seat_per_position() {
        let (database, train_type) = setup().await;
        let mut tx = database.transaction().await.unwrap();
        let (train, seats) = create_train(&mut tx, train(train_type, 5, 10), 7)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(seats.len(), 50);
        let positions = seats
            .iter()
            .map(|seat| (seat.content.carriage, seat.content.seat_number))
            .collect::<HashSet<_>>();
        assert_eq!(positions.len(), 50);
        assert!(positions
            .iter()
            .all(|(c, s)| (1..=5).contains(c) && (1..=10).contains(s)));

        let stored = database.auto().seats_of_train(train.id).await.unwrap();
        assert_eq!(stored.len(), 50);
        assert!(stored.iter().all(|seat| seat.content.is_available));
    }

    #[tokio::test]
    async fn empty_layout_creates_nothing() {
        let (database, train_type) = setup().await;
        let mut tx = database.transaction().await.unwrap();
        let result = create_train(&mut tx, train(train_type, 0, 10), 100).await;
        assert!(matches!(result, Err(RequestError::InvalidRequest(_))));
        tx.rollback().await.unwrap();

        let trains = Repo::<Train>::get_all(&mut database.auto()).await.unwrap();
        assert!(trains.is_empty());
    }

    #[tokio::test]
    async fn oversized_layout_is_rejected_before_any_insert() {
        let (database, train_type) = setup().await;
        let mut tx = database.transaction().await.unwrap();
        let result = create_train(&mut tx, train(train_type, 100_000, 100_000), 100).await;
        assert!(matches!(result, Err(RequestError::InvalidRequest(_))));
        tx.rollback().await.unwrap();

        let trains = Repo::<Train>::get_all(&mut database.auto()).await.unwrap();
        assert!(trains.is_empty());
    }

    #[tokio::test]
    async fn last_chunk_may_be_partial() {
        let (database, train_type) = setup().await;
        let mut tx = database.transaction().await.unwrap();
        let (_, seats) = create_train(&mut tx, train(train_type, 3, 3), 4)
            .await
            .unwrap();
        assert_eq!(seats.len(), 9);
        assert_eq!(
            (seats[8].content.carriage, seats[8].content.seat_number),
            (3, 3)
        );
    }

    #[tokio::test]
    async fn unknown_train_type_is_not_found() {
        let (database, _) = setup().await;
        let mut tx = database.transaction().await.unwrap();
        let result = create_train(&mut tx, train(Id::new(999), 2, 3), 100).await;
        assert!(matches!(result, Err(RequestError::NotFound)));
    }

    #[tokio::test]
    async fn taking_a_seat_twice_is_unavailable() {
        let (database, train_type) = setup().await;
        let mut tx = database.transaction().await.unwrap();
        let (_, seats) = create_train(&mut tx, train(train_type, 1, 1), 100)
            .await
            .unwrap();
        let seat = seats[0].id;

        let taken = take_seat(&mut tx, seat).await.unwrap();
        assert!(!taken.content.is_available);
        assert!(matches!(
            take_seat(&mut tx, seat).await,
            Err(RequestError::SeatUnavailable(id)) if id == seat
        ));
    }
}
