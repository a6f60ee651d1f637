use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{station::Station, ExampleData, WithId};

/// A connection between two stations. The distance is never stored, it is
/// derived from the station coordinates whenever a route is viewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Route {
    pub source: Id<Station>,
    pub destination: Id<Station>,
}

impl Route {
    /// Routes from a station to itself are accepted but suspicious.
    pub fn is_loop(&self) -> bool {
        self.source == self.destination
    }
}

impl HasId for Route {
    type IdType = i64;
}

impl ExampleData for Route {
    fn example_data() -> Self {
        Self {
            source: Id::new(1),
            destination: Id::new(2),
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RouteDetail {
    pub id: Id<Route>,
    pub source: WithId<Station>,
    pub destination: WithId<Station>,
    pub full_route: String,
    pub distance: f64,
    pub distance_km: f64,
}

impl RouteDetail {
    pub fn new(
        id: Id<Route>,
        source: WithId<Station>,
        destination: WithId<Station>,
    ) -> Self {
        let full_route =
            format!("{}-{}", source.content.name, destination.content.name);
        let distance = source.content.distance_to(&destination.content);
        let distance_km = source.content.distance_km_to(&destination.content);
        Self {
            id,
            source,
            destination,
            full_route,
            distance,
            distance_km,
        }
    }
}
