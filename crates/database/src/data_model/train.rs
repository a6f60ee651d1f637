use model::train::Train;
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::{impl_repo, DatabaseRow};

#[derive(Debug, Clone, FromRow)]
pub struct TrainRow {
    pub id: i64,
    pub name: String,
    pub carriage_num: i32,
    pub places_in_carriage: i32,
    pub train_type_id: i64,
    pub image: Option<String>,
}

impl DatabaseRow for TrainRow {
    type Model = Train;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Train {
            name: self.name,
            carriage_num: self.carriage_num,
            places_in_carriage: self.places_in_carriage,
            train_type: Id::new(self.train_type_id),
            image: self.image,
        }
    }
}

impl_repo!(Train, train);
