use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    geo::{euclidean_distance, haversine_distance},
    id::HasId,
};

use crate::ExampleData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Station {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Station {
    pub fn distance_to(&self, other: &Station) -> f64 {
        euclidean_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    pub fn distance_km_to(&self, other: &Station) -> f64 {
        haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl HasId for Station {
    type IdType = i64;
}

impl ExampleData for Station {
    fn example_data() -> Self {
        Self {
            name: "Kiel Hbf".to_owned(),
            latitude: 54.3149,
            longitude: 10.1318,
        }
    }
}
