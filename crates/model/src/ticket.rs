use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{
    journey::{Journey, JourneyDetail},
    order::Order,
    seat::Seat,
    train::Train,
    ExampleData, WithId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ticket {
    pub journey: Id<Journey>,
    pub seat: Id<Seat>,
    pub train: Id<Train>,
    pub order: Id<Order>,
}

impl Ticket {
    pub fn for_request(order: Id<Order>, request: &TicketRequest) -> Self {
        Self {
            journey: request.journey,
            seat: request.seat,
            train: request.train,
            order,
        }
    }
}

impl HasId for Ticket {
    type IdType = i64;
}

/// One seat a requester wants to reserve on a journey.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TicketRequest {
    pub journey: Id<Journey>,
    pub seat: Id<Seat>,
    pub train: Id<Train>,
}

impl ExampleData for TicketRequest {
    fn example_data() -> Self {
        Self {
            journey: Id::new(1),
            seat: Id::new(1),
            train: Id::new(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TicketDetail {
    pub id: Id<Ticket>,
    pub order: Id<Order>,
    pub journey: JourneyDetail,
    pub seat: WithId<Seat>,
}
