use model::route::Route;
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::{impl_repo, DatabaseRow};

#[derive(Debug, Clone, FromRow)]
pub struct RouteRow {
    pub id: i64,
    pub source_id: i64,
    pub destination_id: i64,
}

impl DatabaseRow for RouteRow {
    type Model = Route;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Route {
            source: Id::new(self.source_id),
            destination: Id::new(self.destination_id),
        }
    }
}

impl_repo!(Route, route);
