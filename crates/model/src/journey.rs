use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{
    crew::Crew,
    route::{Route, RouteDetail},
    train::{Train, TrainDetail},
    ExampleData, WithId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Journey {
    pub route: Id<Route>,
    pub train: Id<Train>,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    /// Unordered set of crew members working the journey.
    #[serde(default)]
    pub crews: Vec<Id<Crew>>,
}

impl Journey {
    /// Brings the crew set into its canonical form: sorted, without duplicates.
    pub fn normalized(mut self) -> Self {
        self.crews.sort();
        self.crews.dedup();
        self
    }
}

impl HasId for Journey {
    type IdType = i64;
}

impl ExampleData for Journey {
    fn example_data() -> Self {
        Self {
            route: Id::new(1),
            train: Id::new(1),
            departure_time: DateTime::from_timestamp(1_717_613_425, 0)
                .unwrap_or_default(),
            arrival_time: DateTime::from_timestamp(1_717_699_825, 0)
                .unwrap_or_default(),
            crews: vec![Id::new(1)],
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct JourneyDetail {
    pub id: Id<Journey>,
    pub route: RouteDetail,
    pub train: TrainDetail,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub crews: Vec<WithId<Crew>>,
}
