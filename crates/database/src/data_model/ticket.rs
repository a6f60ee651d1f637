use async_trait::async_trait;
use model::{
    order::{Order, Requester},
    ticket::Ticket,
    WithId,
};
use railway::database::{Result, TicketRepo};
use sqlx::prelude::FromRow;
use utility::id::Id;

use crate::{
    queries::ticket::{get, insert, of_order, of_requester},
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct TicketRow {
    pub id: i64,
    pub journey_id: i64,
    pub seat_id: i64,
    pub train_id: i64,
    pub order_id: i64,
}

impl DatabaseRow for TicketRow {
    type Model = Ticket;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Ticket {
            journey: Id::new(self.journey_id),
            seat: Id::new(self.seat_id),
            train: Id::new(self.train_id),
            order: Id::new(self.order_id),
        }
    }
}

#[async_trait]
impl TicketRepo for PgDatabaseAutocommit {
    async fn insert_ticket(&mut self, ticket: Ticket) -> Result<WithId<Ticket>> {
        insert(&self.pool, ticket).await
    }

    async fn get_ticket(&mut self, id: Id<Ticket>) -> Result<WithId<Ticket>> {
        get(&self.pool, id).await
    }

    async fn tickets_of_order(&mut self, order: Id<Order>) -> Result<Vec<WithId<Ticket>>> {
        of_order(&self.pool, order).await
    }

    async fn tickets_of(&mut self, user: &Requester) -> Result<Vec<WithId<Ticket>>> {
        of_requester(&self.pool, user).await
    }
}

#[async_trait]
impl<'a> TicketRepo for PgDatabaseTransaction<'a> {
    async fn insert_ticket(&mut self, ticket: Ticket) -> Result<WithId<Ticket>> {
        insert(&mut *self.tx, ticket).await
    }

    async fn get_ticket(&mut self, id: Id<Ticket>) -> Result<WithId<Ticket>> {
        get(&mut *self.tx, id).await
    }

    async fn tickets_of_order(&mut self, order: Id<Order>) -> Result<Vec<WithId<Ticket>>> {
        of_order(&mut *self.tx, order).await
    }

    async fn tickets_of(&mut self, user: &Requester) -> Result<Vec<WithId<Ticket>>> {
        of_requester(&mut *self.tx, user).await
    }
}
