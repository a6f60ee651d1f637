use model::crew::Crew;
use sqlx::prelude::FromRow;
use utility::id::Id;

use super::{impl_repo, DatabaseRow};

#[derive(Debug, Clone, FromRow)]
pub struct CrewRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl DatabaseRow for CrewRow {
    type Model = Crew;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id)
    }

    fn to_model(self) -> Self::Model {
        Crew {
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}

impl_repo!(Crew, crew);
