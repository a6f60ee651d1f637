use model::train::TrainType;
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::{impl_repo, DatabaseRow};

#[derive(Debug, Clone, FromRow)]
pub struct TrainTypeRow {
    pub id: i64,
    pub name: String,
}

impl DatabaseRow for TrainTypeRow {
    type Model = TrainType;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        TrainType { name: self.name }
    }
}

impl_repo!(TrainType, train_type);
