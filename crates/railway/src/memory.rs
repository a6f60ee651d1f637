//! A `Database` kept in process memory.
//!
//! Transactions are serialized behind one async mutex: a transaction holds
//! the lock from `begin` until commit or rollback and works on a private copy
//! of all tables, which replaces the shared tables on commit. Autocommit
//! statements take the lock for a single statement. Every statement is
//! applied to a copy first, so a failing statement never leaves a partial
//! write behind.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use model::{
    crew::Crew,
    deletion::{self, OnDelete},
    journey::Journey,
    order::{Order, Requester},
    route::Route,
    seat::Seat,
    station::Station,
    ticket::Ticket,
    train::{Train, TrainType},
    WithId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use utility::id::{HasId, Id};

use crate::database::{
    Database, DatabaseAutocommit, DatabaseError, DatabaseOperations,
    DatabaseTransaction, OrderRepo, Repo, Result, SeatRepo, TicketRepo,
};

#[derive(Debug, Clone, Default)]
pub struct Tables {
    last_id: i64,
    stations: BTreeMap<i64, Station>,
    train_types: BTreeMap<i64, TrainType>,
    crews: BTreeMap<i64, Crew>,
    routes: BTreeMap<i64, Route>,
    trains: BTreeMap<i64, Train>,
    seats: BTreeMap<i64, Seat>,
    journeys: BTreeMap<i64, Journey>,
    orders: BTreeMap<i64, Order>,
    tickets: BTreeMap<i64, Ticket>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn remove(&mut self, table: &str, id: i64) -> bool {
        match table {
            "stations" => self.stations.remove(&id).is_some(),
            "train_types" => self.train_types.remove(&id).is_some(),
            "crews" => self.crews.remove(&id).is_some(),
            "routes" => self.routes.remove(&id).is_some(),
            "trains" => self.trains.remove(&id).is_some(),
            "journeys" => self.journeys.remove(&id).is_some(),
            "seats" => self.seats.remove(&id).is_some(),
            "orders" => self.orders.remove(&id).is_some(),
            "tickets" => self.tickets.remove(&id).is_some(),
            _ => false,
        }
    }

    /// Ids of the rows of `table` whose `column` holds `id`.
    fn referencing(&self, table: &str, column: &str, id: i64) -> Vec<i64> {
        fn matching<T>(rows: &BTreeMap<i64, T>, f: impl Fn(&T) -> i64, id: i64) -> Vec<i64> {
            rows.iter()
                .filter(|(_, row)| f(row) == id)
                .map(|(row_id, _)| *row_id)
                .collect()
        }
        match (table, column) {
            ("routes", "source_id") => matching(&self.routes, |r| r.source.raw(), id),
            ("routes", "destination_id") => {
                matching(&self.routes, |r| r.destination.raw(), id)
            }
            ("trains", "train_type_id") => {
                matching(&self.trains, |t| t.train_type.raw(), id)
            }
            ("seats", "train_id") => matching(&self.seats, |s| s.train.raw(), id),
            ("journeys", "route_id") => matching(&self.journeys, |j| j.route.raw(), id),
            ("journeys", "train_id") => matching(&self.journeys, |j| j.train.raw(), id),
            ("tickets", "journey_id") => {
                matching(&self.tickets, |t| t.journey.raw(), id)
            }
            ("tickets", "seat_id") => matching(&self.tickets, |t| t.seat.raw(), id),
            ("tickets", "train_id") => matching(&self.tickets, |t| t.train.raw(), id),
            ("tickets", "order_id") => matching(&self.tickets, |t| t.order.raw(), id),
            _ => vec![],
        }
    }

    /// Deletes a row and applies the deletion policy to everything pointing
    /// at it.
    fn delete_row(&mut self, table: &str, id: i64) -> Result<()> {
        if !self.remove(table, id) {
            return Err(DatabaseError::NotFound);
        }
        for key in deletion::referencing(table) {
            // crew links live inside the journey rows
            if key.table == "journey_crews" {
                if key.column == "crew_id" {
                    for journey in self.journeys.values_mut() {
                        journey.crews.retain(|crew| crew.raw() != id);
                    }
                }
                continue;
            }
            let rows = self.referencing(key.table, key.column, id);
            if rows.is_empty() {
                continue;
            }
            match key.on_delete {
                OnDelete::Restrict => return Err(DatabaseError::Conflict),
                OnDelete::Cascade => {
                    for row in rows {
                        // an earlier cascade may already have removed it
                        match self.delete_row(key.table, row) {
                            Ok(()) | Err(DatabaseError::NotFound) => {}
                            Err(why) => return Err(why),
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Reference data stored in one table of `Tables`.
pub trait MemoryTable: HasId<IdType = i64> + Clone + Send + Sized {
    const TABLE: &'static str;

    fn rows(tables: &Tables) -> &BTreeMap<i64, Self>;
    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<i64, Self>;

    /// Foreign key check, run before every insert.
    fn check_references(&self, _tables: &Tables) -> Result<()> {
        Ok(())
    }
}

fn exists<T: MemoryTable>(tables: &Tables, id: Id<T>) -> Result<()> {
    if T::rows(tables).contains_key(&id.raw()) {
        Ok(())
    } else {
        Err(DatabaseError::Conflict)
    }
}

macro_rules! memory_table {
    ($model:ty, $table:literal, $field:ident) => {
        memory_table!($model, $table, $field, |_row, _tables| Ok(()));
    };
    ($model:ty, $table:literal, $field:ident, $check:expr) => {
        impl MemoryTable for $model {
            const TABLE: &'static str = $table;

            fn rows(tables: &Tables) -> &BTreeMap<i64, Self> {
                &tables.$field
            }

            fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<i64, Self> {
                &mut tables.$field
            }

            fn check_references(&self, tables: &Tables) -> Result<()> {
                let check: fn(&Self, &Tables) -> Result<()> = $check;
                check(self, tables)
            }
        }
    };
}

memory_table!(Station, "stations", stations);
memory_table!(TrainType, "train_types", train_types);
memory_table!(Crew, "crews", crews);
memory_table!(Route, "routes", routes, |route, tables| {
    exists(tables, route.source)?;
    exists(tables, route.destination)
});
memory_table!(Train, "trains", trains, |train, tables| {
    exists(tables, train.train_type)
});
memory_table!(Journey, "journeys", journeys, |journey, tables| {
    exists(tables, journey.route)?;
    exists(tables, journey.train)?;
    journey
        .crews
        .iter()
        .try_for_each(|crew| exists(tables, *crew))
});

fn with_id<T>(id: i64, row: &T) -> WithId<T>
where
    T: HasId<IdType = i64> + Clone,
{
    WithId::new(Id::new(id), row.clone())
}

enum Access {
    Autocommit(Arc<Mutex<Tables>>),
    Transaction {
        guard: OwnedMutexGuard<Tables>,
        working: Tables,
    },
}

/// Either an autocommit handle or an open transaction, depending on how it
/// was obtained from `MemoryDatabase`.
pub struct MemoryConnection {
    access: Access,
}

impl MemoryConnection {
    /// Runs one statement. The statement sees and modifies a copy of the
    /// tables, which only replaces the visible state if it succeeds.
    async fn statement<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Tables) -> Result<R> + Send,
        R: Send,
    {
        match &mut self.access {
            Access::Autocommit(tables) => {
                let mut tables = tables.lock().await;
                let mut copy = tables.clone();
                let result = f(&mut copy)?;
                *tables = copy;
                Ok(result)
            }
            Access::Transaction { working, .. } => {
                let mut copy = working.clone();
                let result = f(&mut copy)?;
                *working = copy;
                Ok(result)
            }
        }
    }

    async fn query<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&Tables) -> Result<R> + Send,
        R: Send,
    {
        match &mut self.access {
            Access::Autocommit(tables) => f(&*tables.lock().await),
            Access::Transaction { working, .. } => f(working),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Transaction = MemoryConnection;
    type Autocommit = MemoryConnection;

    const BULK_INSERT_MAX: usize = 1000;

    async fn transaction(&self) -> Result<Self::Transaction> {
        let guard = self.tables.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryConnection {
            access: Access::Transaction { guard, working },
        })
    }

    fn auto(&self) -> Self::Autocommit {
        MemoryConnection {
            access: Access::Autocommit(self.tables.clone()),
        }
    }
}

#[async_trait]
impl DatabaseTransaction for MemoryConnection {
    async fn commit(self) -> Result<()> {
        if let Access::Transaction { mut guard, working } = self.access {
            *guard = working;
        }
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

impl DatabaseAutocommit for MemoryConnection {}

impl DatabaseOperations for MemoryConnection {}

#[async_trait]
impl<T> Repo<T> for MemoryConnection
where
    T: MemoryTable + serde::Serialize + Sync + 'static,
{
    async fn get(&mut self, id: Id<T>) -> Result<WithId<T>> {
        self.query(move |tables| {
            T::rows(tables)
                .get(&id.raw())
                .map(|row| with_id(id.raw(), row))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn get_all(&mut self) -> Result<Vec<WithId<T>>> {
        self.query(|tables| {
            Ok(T::rows(tables)
                .iter()
                .map(|(id, row)| with_id(*id, row))
                .collect())
        })
        .await
    }

    async fn insert(&mut self, element: T) -> Result<WithId<T>> {
        self.statement(move |tables| {
            element.check_references(tables)?;
            let id = tables.next_id();
            T::rows_mut(tables).insert(id, element.clone());
            Ok(WithId::new(Id::new(id), element))
        })
        .await
    }

    async fn delete(&mut self, id: Id<T>) -> Result<()> {
        self.statement(move |tables| tables.delete_row(T::TABLE, id.raw()))
            .await
    }
}

#[async_trait]
impl SeatRepo for MemoryConnection {
    async fn insert_seats(&mut self, seats: &[Seat]) -> Result<Vec<WithId<Seat>>> {
        let seats = seats.to_vec();
        self.statement(move |tables| {
            let trains = seats.iter().map(|seat| seat.train).collect::<HashSet<_>>();
            for train in &trains {
                exists(tables, *train)?;
            }
            let mut positions = tables
                .seats
                .values()
                .filter(|seat| trains.contains(&seat.train))
                .map(|seat| (seat.train, seat.carriage, seat.seat_number))
                .collect::<HashSet<_>>();

            let mut created = Vec::with_capacity(seats.len());
            for seat in seats {
                if !positions.insert((seat.train, seat.carriage, seat.seat_number)) {
                    return Err(DatabaseError::Conflict);
                }
                let id = tables.next_id();
                tables.seats.insert(id, seat.clone());
                created.push(WithId::new(Id::new(id), seat));
            }
            Ok(created)
        })
        .await
    }

    async fn get_seat(&mut self, id: Id<Seat>) -> Result<WithId<Seat>> {
        self.query(move |tables| {
            tables
                .seats
                .get(&id.raw())
                .map(|seat| with_id(id.raw(), seat))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn lock_seats(&mut self, ids: &[Id<Seat>]) -> Result<Vec<WithId<Seat>>> {
        // the whole transaction already holds the lock on all tables
        let mut ids = ids.to_vec();
        ids.sort();
        ids.dedup();
        self.query(move |tables| {
            ids.into_iter()
                .map(|id| {
                    tables
                        .seats
                        .get(&id.raw())
                        .map(|seat| with_id(id.raw(), seat))
                        .ok_or(DatabaseError::NotFound)
                })
                .collect()
        })
        .await
    }

    async fn mark_unavailable(&mut self, id: Id<Seat>) -> Result<WithId<Seat>> {
        self.statement(move |tables| {
            let seat = tables
                .seats
                .get_mut(&id.raw())
                .ok_or(DatabaseError::NotFound)?;
            if !seat.is_available {
                return Err(DatabaseError::Conflict);
            }
            seat.is_available = false;
            Ok(with_id(id.raw(), seat))
        })
        .await
    }

    async fn seats_of_train(&mut self, train: Id<Train>) -> Result<Vec<WithId<Seat>>> {
        self.query(move |tables| {
            let mut seats = tables
                .seats
                .iter()
                .filter(|(_, seat)| seat.train == train)
                .map(|(id, seat)| with_id(*id, seat))
                .collect::<Vec<_>>();
            seats.sort_by_key(|seat| (seat.content.carriage, seat.content.seat_number));
            Ok(seats)
        })
        .await
    }
}

#[async_trait]
impl OrderRepo for MemoryConnection {
    async fn insert_order(&mut self, order: Order) -> Result<WithId<Order>> {
        self.statement(move |tables| {
            let id = tables.next_id();
            tables.orders.insert(id, order.clone());
            Ok(WithId::new(Id::new(id), order))
        })
        .await
    }

    async fn get_order(&mut self, id: Id<Order>) -> Result<WithId<Order>> {
        self.query(move |tables| {
            tables
                .orders
                .get(&id.raw())
                .map(|order| with_id(id.raw(), order))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn orders_of(&mut self, user: &Requester) -> Result<Vec<WithId<Order>>> {
        let user = user.clone();
        self.query(move |tables| {
            Ok(tables
                .orders
                .iter()
                .filter(|(_, order)| order.user == user)
                .map(|(id, order)| with_id(*id, order))
                .collect())
        })
        .await
    }
}

#[async_trait]
impl TicketRepo for MemoryConnection {
    async fn insert_ticket(&mut self, ticket: Ticket) -> Result<WithId<Ticket>> {
        self.statement(move |tables| {
            exists(tables, ticket.journey)?;
            exists(tables, ticket.train)?;
            if !tables.seats.contains_key(&ticket.seat.raw())
                || !tables.orders.contains_key(&ticket.order.raw())
            {
                return Err(DatabaseError::Conflict);
            }
            if tables.tickets.values().any(|other| other.seat == ticket.seat) {
                return Err(DatabaseError::Conflict);
            }
            let id = tables.next_id();
            tables.tickets.insert(id, ticket.clone());
            Ok(WithId::new(Id::new(id), ticket))
        })
        .await
    }

    async fn get_ticket(&mut self, id: Id<Ticket>) -> Result<WithId<Ticket>> {
        self.query(move |tables| {
            tables
                .tickets
                .get(&id.raw())
                .map(|ticket| with_id(id.raw(), ticket))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn tickets_of_order(&mut self, order: Id<Order>) -> Result<Vec<WithId<Ticket>>> {
        self.query(move |tables| {
            Ok(tables
                .tickets
                .iter()
                .filter(|(_, ticket)| ticket.order == order)
                .map(|(id, ticket)| with_id(*id, ticket))
                .collect())
        })
        .await
    }

    async fn tickets_of(&mut self, user: &Requester) -> Result<Vec<WithId<Ticket>>> {
        let user = user.clone();
        self.query(move |tables| {
            Ok(tables
                .tickets
                .iter()
                .filter(|(_, ticket)| {
                    tables
                        .orders
                        .get(&ticket.order.raw())
                        .is_some_and(|order| order.user == user)
                })
                .map(|(id, ticket)| with_id(*id, ticket))
                .collect())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use model::ExampleData;

    use super::*;

    async fn station(database: &MemoryDatabase, name: &str) -> Id<Station> {
        Repo::<Station>::insert(
            &mut database.auto(),
            Station {
                name: name.to_owned(),
                ..Station::example_data()
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn rolled_back_writes_disappear() {
        let database = MemoryDatabase::new();
        let mut tx = database.transaction().await.unwrap();
        Repo::<Crew>::insert(&mut tx, Crew::example_data()).await.unwrap();
        tx.rollback().await.unwrap();

        let crews = Repo::<Crew>::get_all(&mut database.auto()).await.unwrap();
        assert!(crews.is_empty());
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let database = MemoryDatabase::new();
        {
            let mut tx = database.transaction().await.unwrap();
            Repo::<Crew>::insert(&mut tx, Crew::example_data()).await.unwrap();
        }
        let crews = Repo::<Crew>::get_all(&mut database.auto()).await.unwrap();
        assert!(crews.is_empty());
    }

    #[tokio::test]
    async fn route_needs_existing_stations() {
        let database = MemoryDatabase::new();
        let kiel = station(&database, "Kiel").await;
        let result = Repo::<Route>::insert(
            &mut database.auto(),
            Route {
                source: kiel,
                destination: Id::new(999),
            },
        )
        .await;
        assert!(matches!(result, Err(DatabaseError::Conflict)));
    }

    #[tokio::test]
    async fn deleting_a_station_cascades_to_routes() {
        let database = MemoryDatabase::new();
        let kiel = station(&database, "Kiel").await;
        let plon = station(&database, "Plön").await;
        let mut auto = database.auto();
        Repo::<Route>::insert(
            &mut auto,
            Route {
                source: kiel,
                destination: plon,
            },
        )
        .await
        .unwrap();

        Repo::<Station>::delete(&mut auto, plon).await.unwrap();

        assert!(Repo::<Route>::get_all(&mut auto).await.unwrap().is_empty());
        assert_eq!(Repo::<Station>::get_all(&mut auto).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn referenced_train_type_can_not_be_deleted() {
        let database = MemoryDatabase::new();
        let mut auto = database.auto();
        let train_type = Repo::<TrainType>::insert(&mut auto, TrainType::example_data())
            .await
            .unwrap();
        Repo::<Train>::insert(
            &mut auto,
            Train {
                train_type: train_type.id,
                ..Train::example_data()
            },
        )
        .await
        .unwrap();

        let result = Repo::<TrainType>::delete(&mut auto, train_type.id).await;
        assert!(matches!(result, Err(DatabaseError::Conflict)));
        // the failed statement left nothing half deleted
        assert_eq!(Repo::<TrainType>::get_all(&mut auto).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_crew_unlinks_it_from_journeys() {
        let database = MemoryDatabase::new();
        let mut auto = database.auto();
        let kiel = station(&database, "Kiel").await;
        let plon = station(&database, "Plön").await;
        let route = Repo::<Route>::insert(
            &mut auto,
            Route {
                source: kiel,
                destination: plon,
            },
        )
        .await
        .unwrap();
        let train_type = Repo::<TrainType>::insert(&mut auto, TrainType::example_data())
            .await
            .unwrap();
        let train = Repo::<Train>::insert(
            &mut auto,
            Train {
                train_type: train_type.id,
                ..Train::example_data()
            },
        )
        .await
        .unwrap();
        let crew = Repo::<Crew>::insert(&mut auto, Crew::example_data())
            .await
            .unwrap();
        let journey = Repo::<Journey>::insert(
            &mut auto,
            Journey {
                route: route.id,
                train: train.id,
                crews: vec![crew.id],
                ..Journey::example_data()
            },
        )
        .await
        .unwrap();

        Repo::<Crew>::delete(&mut auto, crew.id).await.unwrap();

        let journey = Repo::<Journey>::get(&mut auto, journey.id).await.unwrap();
        assert!(journey.content.crews.is_empty());
    }

    #[tokio::test]
    async fn seat_positions_are_unique_per_train() {
        let database = MemoryDatabase::new();
        let mut auto = database.auto();
        let train_type = Repo::<TrainType>::insert(&mut auto, TrainType::example_data())
            .await
            .unwrap();
        let mut trains = Vec::new();
        for _ in 0..2 {
            let train = Repo::<Train>::insert(
                &mut auto,
                Train {
                    train_type: train_type.id,
                    ..Train::example_data()
                },
            )
            .await
            .unwrap();
            trains.push(train.id);
        }
        let seat = |train: Id<Train>, seat_number: i32| Seat {
            train,
            carriage: 1,
            seat_number,
            is_available: true,
        };

        // the same position on two trains is fine
        auto.insert_seats(&[seat(trains[0], 1), seat(trains[1], 1)])
            .await
            .unwrap();

        let repeated = auto
            .insert_seats(&[seat(trains[0], 2), seat(trains[0], 2)])
            .await;
        assert!(matches!(repeated, Err(DatabaseError::Conflict)));
        let existing = auto
            .insert_seats(&[seat(trains[0], 3), seat(trains[0], 1)])
            .await;
        assert!(matches!(existing, Err(DatabaseError::Conflict)));

        // neither failed statement left a seat behind
        assert_eq!(auto.seats_of_train(trains[0]).await.unwrap().len(), 1);
    }
}
