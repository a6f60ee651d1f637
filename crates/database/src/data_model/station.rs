use model::station::Station;
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::{impl_repo, DatabaseRow};

#[derive(Debug, Clone, FromRow)]
pub struct StationRow {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl DatabaseRow for StationRow {
    type Model = Station;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Station {
            name: self.name,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl_repo!(Station, station);
