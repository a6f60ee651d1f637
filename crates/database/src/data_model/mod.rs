use std::fmt::Debug;

use model::WithId;
use serde::Serialize;
use utility::id::{HasId, Id};

pub mod crew;
pub mod journey;
pub mod order;
pub mod route;
pub mod seat;
pub mod station;
pub mod ticket;
pub mod train;
pub mod train_type;

pub trait DatabaseRow {
    type Model: Serialize + HasId;

    fn get_id(&self) -> Id<Self::Model>;
    fn to_model(self) -> Self::Model;
}

pub fn with_ids<R: DatabaseRow>(rows: Vec<R>) -> Vec<WithId<R::Model>>
where
    <R::Model as HasId>::IdType: Debug + Clone + Serialize,
{
    rows.into_iter().map(|row| with_id(row)).collect::<Vec<_>>()
}

pub fn with_id<R: DatabaseRow>(row: R) -> WithId<R::Model>
where
    <R::Model as HasId>::IdType: Debug + Clone + Serialize,
{
    WithId::new(row.get_id(), row.to_model())
}

/// Implements `Repo<$model>` for the autocommit handle and for transactions
/// by forwarding to the functions in `crate::queries::$queries`.
macro_rules! impl_repo {
    ($model:ty, $queries:ident) => {
        #[async_trait::async_trait]
        impl railway::database::Repo<$model> for crate::PgDatabaseAutocommit {
            async fn get(
                &mut self,
                id: utility::id::Id<$model>,
            ) -> railway::database::Result<model::WithId<$model>> {
                crate::queries::$queries::get(&self.pool, id).await
            }

            async fn get_all(
                &mut self,
            ) -> railway::database::Result<Vec<model::WithId<$model>>> {
                crate::queries::$queries::get_all(&self.pool).await
            }

            async fn insert(
                &mut self,
                element: $model,
            ) -> railway::database::Result<model::WithId<$model>> {
                crate::queries::$queries::insert(&self.pool, element).await
            }

            async fn delete(
                &mut self,
                id: utility::id::Id<$model>,
            ) -> railway::database::Result<()> {
                crate::queries::$queries::delete(&self.pool, id).await
            }
        }

        #[async_trait::async_trait]
        impl<'a> railway::database::Repo<$model> for crate::PgDatabaseTransaction<'a> {
            async fn get(
                &mut self,
                id: utility::id::Id<$model>,
            ) -> railway::database::Result<model::WithId<$model>> {
                crate::queries::$queries::get(&mut *self.tx, id).await
            }

            async fn get_all(
                &mut self,
            ) -> railway::database::Result<Vec<model::WithId<$model>>> {
                crate::queries::$queries::get_all(&mut *self.tx).await
            }

            async fn insert(
                &mut self,
                element: $model,
            ) -> railway::database::Result<model::WithId<$model>> {
                crate::queries::$queries::insert(&mut *self.tx, element).await
            }

            async fn delete(
                &mut self,
                id: utility::id::Id<$model>,
            ) -> railway::database::Result<()> {
                crate::queries::$queries::delete(&mut *self.tx, id).await
            }
        }
    };
}

pub(crate) use impl_repo;
