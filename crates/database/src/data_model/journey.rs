use chrono::{DateTime, Utc};
use model::journey::Journey;
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::{impl_repo, DatabaseRow};

#[derive(Debug, Clone, FromRow)]
pub struct JourneyRow {
    pub id: i64,
    pub route_id: i64,
    pub train_id: i64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub crew_ids: Vec<i64>,
}

impl DatabaseRow for JourneyRow {
    type Model = Journey;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Journey {
            route: Id::new(self.route_id),
            train: Id::new(self.train_id),
            departure_time: self.departure_time,
            arrival_time: self.arrival_time,
            crews: self.crew_ids.into_iter().map(Id::new).collect(),
        }
    }
}

impl_repo!(Journey, journey);
