use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{
    seat::{LayoutError, SeatLayout},
    ExampleData, WithId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrainType {
    pub name: String,
}

impl HasId for TrainType {
    type IdType = i64;
}

impl ExampleData for TrainType {
    fn example_data() -> Self {
        Self {
            name: "Express".to_owned(),
        }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Train {
    pub name: String,
    pub carriage_num: i32,
    pub places_in_carriage: i32,
    pub train_type: Id<TrainType>,
    /// Path of an already stored image. Uploading images is not handled here.
    #[serde(default)]
    pub image: Option<String>,
}

impl Train {
    pub fn num_seats(&self) -> i64 {
        i64::from(self.carriage_num) * i64::from(self.places_in_carriage)
    }

    pub fn seat_layout(&self) -> Result<SeatLayout, LayoutError> {
        SeatLayout::new(self.carriage_num, self.places_in_carriage)
    }
}

impl HasId for Train {
    type IdType = i64;
}

impl ExampleData for Train {
    fn example_data() -> Self {
        Self {
            name: "ICE 1009".to_owned(),
            carriage_num: 10,
            places_in_carriage: 20,
            train_type: Id::new(1),
            image: None,
        }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TrainDetail {
    pub id: Id<Train>,
    pub name: String,
    pub carriage_num: i32,
    pub places_in_carriage: i32,
    pub num_seats: i64,
    pub train_type: WithId<TrainType>,
    pub image: Option<String>,
}

impl TrainDetail {
    pub fn new(train: WithId<Train>, train_type: WithId<TrainType>) -> Self {
        let num_seats = train.content.num_seats();
        Self {
            id: train.id,
            name: train.content.name,
            carriage_num: train.content.carriage_num,
            places_in_carriage: train.content.places_in_carriage,
            num_seats,
            train_type,
            image: train.content.image,
        }
    }
}
