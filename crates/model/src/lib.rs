use schemars::JsonSchema;
use std::fmt::Debug;

use serde::Serialize;
pub use serde_with;
use utility::id::{HasId, Id};

pub mod crew;
pub mod deletion;
pub mod journey;
pub mod order;
pub mod route;
pub mod seat;
pub mod station;
pub mod ticket;
pub mod train;

pub trait ExampleData {
    fn example_data() -> Self;
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}

impl<V> PartialEq for WithId<V>
where
    V: HasId + PartialEq,
    V::IdType: Serialize + Debug + Clone + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.content == other.content
    }
}

#[cfg(test)]
mod tests {
    use crate::train::TrainType;

    use super::*;

    fn regional(id: i64) -> WithId<TrainType> {
        WithId::new(
            Id::new(id),
            TrainType {
                name: "Regional".to_owned(),
            },
        )
    }

    #[test]
    fn rows_are_equal_when_id_and_content_are() {
        assert_eq!(regional(1), regional(1));
        assert_ne!(regional(1), regional(2));
        let mut renamed = regional(1);
        renamed.content.name = "Express".to_owned();
        assert_ne!(regional(1), renamed);
    }
}
