use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{
    order::{Order, Requester},
    WithId,
};
use railway::database::{DatabaseError, OrderRepo, Result};
use sqlx::prelude::FromRow;
use utility::id::Id;

use crate::{
    queries::order::{get, insert, of_requester},
    PgDatabaseAutocommit, PgDatabaseTransaction,
};

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub requester: String,
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    /// Fails for a blank requester, which the schema forbids.
    pub fn into_order(self) -> Result<WithId<Order>> {
        let user = Requester::new(self.requester).ok_or_else(|| {
            DatabaseError::Other(format!("order {} has no requester", self.id).into())
        })?;
        Ok(WithId::new(
            Id::new(self.id),
            Order {
                user,
                created_at: self.created_at,
            },
        ))
    }
}

#[async_trait]
impl OrderRepo for PgDatabaseAutocommit {
    async fn insert_order(&mut self, order: Order) -> Result<WithId<Order>> {
        insert(&self.pool, order).await
    }

    async fn get_order(&mut self, id: Id<Order>) -> Result<WithId<Order>> {
        get(&self.pool, id).await
    }

    async fn orders_of(&mut self, user: &Requester) -> Result<Vec<WithId<Order>>> {
        of_requester(&self.pool, user).await
    }
}

#[async_trait]
impl<'a> OrderRepo for PgDatabaseTransaction<'a> {
    async fn insert_order(&mut self, order: Order) -> Result<WithId<Order>> {
        insert(&mut *self.tx, order).await
    }

    async fn get_order(&mut self, id: Id<Order>) -> Result<WithId<Order>> {
        get(&mut *self.tx, id).await
    }

    async fn orders_of(&mut self, user: &Requester) -> Result<Vec<WithId<Order>>> {
        of_requester(&mut *self.tx, user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_requester_is_rejected() {
        let row = OrderRow {
            id: 1,
            requester: " ".to_owned(),
            created_at: Utc::now(),
        };
        assert!(matches!(row.into_order(), Err(DatabaseError::Other(_))));
    }
}
