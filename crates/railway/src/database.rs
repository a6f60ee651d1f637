use std::{error, fmt::Debug, result};

use async_trait::async_trait;
use model::{
    crew::Crew,
    journey::Journey,
    order::{Order, Requester},
    route::Route,
    seat::Seat,
    station::Station,
    ticket::Ticket,
    train::{Train, TrainType},
    WithId,
};
use serde::Serialize;
use utility::id::{HasId, Id};

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("row not found")]
    NotFound,
    /// A constraint refused the write: unique violation, restricted delete,
    /// or a seat that is already taken.
    #[error("write conflicts with existing data")]
    Conflict,
    #[error(transparent)]
    Other(Box<dyn error::Error + Send + Sync>),
}

impl DatabaseError {
    pub fn other<T: error::Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

pub type Result<T> = result::Result<T, DatabaseError>;

/// Plain storage of reference data.
#[async_trait]
pub trait Repo<T: Serialize + HasId + Send>
where
    <T as HasId>::IdType: Debug + Clone + Serialize + Send,
{
    async fn get(&mut self, id: Id<T>) -> Result<WithId<T>>;
    /// All rows, ordered by id.
    async fn get_all(&mut self) -> Result<Vec<WithId<T>>>;
    async fn insert(&mut self, element: T) -> Result<WithId<T>>;
    /// Deletes the row and whatever the deletion policy cascades onto.
    async fn delete(&mut self, id: Id<T>) -> Result<()>;
}

/// Seat inventory of all trains.
#[async_trait]
pub trait SeatRepo {
    /// Inserts seats in one statement.
    ///
    /// ## Warning
    ///
    /// Push at most `Database::BULK_INSERT_MAX` seats at once.
    async fn insert_seats(&mut self, seats: &[Seat]) -> Result<Vec<WithId<Seat>>>;

    async fn get_seat(&mut self, id: Id<Seat>) -> Result<WithId<Seat>>;

    /// Locks the given seats until the end of the transaction. Locks are
    /// taken in ascending id order, so overlapping batches can not deadlock.
    /// Fails with `NotFound` if any seat does not exist.
    async fn lock_seats(&mut self, ids: &[Id<Seat>]) -> Result<Vec<WithId<Seat>>>;

    /// Flips an available seat to unavailable. Fails with `Conflict` if the
    /// seat is already unavailable.
    async fn mark_unavailable(&mut self, id: Id<Seat>) -> Result<WithId<Seat>>;

    /// Seats of a train ordered by carriage and seat number.
    async fn seats_of_train(&mut self, train: Id<Train>) -> Result<Vec<WithId<Seat>>>;
}

#[async_trait]
pub trait OrderRepo {
    async fn insert_order(&mut self, order: Order) -> Result<WithId<Order>>;
    async fn get_order(&mut self, id: Id<Order>) -> Result<WithId<Order>>;
    async fn orders_of(&mut self, user: &Requester) -> Result<Vec<WithId<Order>>>;
}

#[async_trait]
pub trait TicketRepo {
    /// Fails with `Conflict` if the seat already has a ticket.
    async fn insert_ticket(&mut self, ticket: Ticket) -> Result<WithId<Ticket>>;
    async fn get_ticket(&mut self, id: Id<Ticket>) -> Result<WithId<Ticket>>;
    async fn tickets_of_order(&mut self, order: Id<Order>) -> Result<Vec<WithId<Ticket>>>;
    async fn tickets_of(&mut self, user: &Requester) -> Result<Vec<WithId<Ticket>>>;
}

pub trait DatabaseOperations:
    Repo<Station>
    + Repo<TrainType>
    + Repo<Crew>
    + Repo<Route>
    + Repo<Train>
    + Repo<Journey>
    + SeatRepo
    + OrderRepo
    + TicketRepo
{
}

#[async_trait]
pub trait DatabaseTransaction: DatabaseOperations {
    async fn commit(self) -> Result<()>;
    async fn rollback(self) -> Result<()>;
}

pub trait DatabaseAutocommit: DatabaseOperations {}

/// trait to implement a railway database.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized + 'static {
    type Transaction: DatabaseTransaction + Send;
    type Autocommit: DatabaseAutocommit + Send;

    const BULK_INSERT_MAX: usize;

    async fn transaction(&self) -> Result<Self::Transaction>;

    fn auto(&self) -> Self::Autocommit;
}
