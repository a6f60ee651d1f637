//! Turns a batch of ticket requests into one order and its tickets.
//!
//! The batch is all or nothing: `reserve` runs inside a single transaction
//! and stops at the first request that can not be served. The caller rolls
//! the transaction back on any error, so neither the order nor a single
//! ticket nor a single availability flip of a failed batch survives.

use model::{
    journey::Journey,
    order::{Order, Requester},
    seat::Seat,
    ticket::{Ticket, TicketRequest},
    WithId,
};
use serde::Serialize;

use crate::{
    database::{DatabaseError, DatabaseOperations, Repo},
    inventory, RequestError, RequestResult,
};

#[derive(Debug, Clone, Serialize)]
pub struct Reservation {
    pub order: WithId<Order>,
    /// In the order of the requests.
    pub tickets: Vec<WithId<Ticket>>,
}

/// Rejects batches that can never succeed, before any transaction is opened.
pub fn check_batch(requests: &[TicketRequest]) -> RequestResult<()> {
    if requests.is_empty() {
        return Err(RequestError::invalid("at least one ticket must be requested"));
    }
    Ok(())
}

pub async fn reserve<T>(
    tx: &mut T,
    requester: &Requester,
    requests: &[TicketRequest],
) -> RequestResult<Reservation>
where
    T: DatabaseOperations + Send,
{
    check_batch(requests)?;

    let order = tx.insert_order(Order::new(requester.clone())).await?;

    // Concurrent reservations touching the same seats queue up here until
    // this transaction ends.
    let seat_ids = requests.iter().map(|request| request.seat).collect::<Vec<_>>();
    tx.lock_seats(&seat_ids).await?;

    let mut tickets = Vec::with_capacity(requests.len());
    for request in requests {
        let seat = tx.get_seat(request.seat).await?;
        let journey = Repo::<Journey>::get(&mut *tx, request.journey).await?;
        check_request(request, &seat, &journey)?;
        if !seat.content.is_available {
            return Err(RequestError::SeatUnavailable(seat.id));
        }

        let ticket = tx
            .insert_ticket(Ticket::for_request(order.id, request))
            .await
            .map_err(|why| match why {
                DatabaseError::Conflict => {
                    RequestError::SeatUnavailable(request.seat)
                }
                other => other.into(),
            })?;
        inventory::take_seat(tx, request.seat).await?;
        tickets.push(ticket);
    }

    Ok(Reservation { order, tickets })
}

fn check_request(
    request: &TicketRequest,
    seat: &WithId<Seat>,
    journey: &WithId<Journey>,
) -> RequestResult<()> {
    if seat.content.train != request.train {
        return Err(RequestError::invalid(format!(
            "seat {} does not belong to train {}",
            seat.id, request.train
        )));
    }
    if journey.content.train != request.train {
        return Err(RequestError::invalid(format!(
            "journey {} is not run by train {}",
            journey.id, request.train
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use model::ExampleData;
    use utility::id::Id;

    use super::*;

    fn request(seat: i64) -> TicketRequest {
        TicketRequest {
            journey: Id::new(1),
            seat: Id::new(seat),
            train: Id::new(1),
        }
    }

    #[test]
    fn empty_batch_is_invalid() {
        assert!(matches!(
            check_batch(&[]),
            Err(RequestError::InvalidRequest(_))
        ));
        assert!(check_batch(&[request(1)]).is_ok());
    }

    #[test]
    fn seat_must_belong_to_requested_train() {
        let seat = WithId::new(
            Id::new(1),
            Seat {
                train: Id::new(2),
                carriage: 1,
                seat_number: 1,
                is_available: true,
            },
        );
        let journey = WithId::new(
            Id::new(1),
            Journey {
                train: Id::new(1),
                ..Journey::example_data()
            },
        );
        assert!(matches!(
            check_request(&request(1), &seat, &journey),
            Err(RequestError::InvalidRequest(_))
        ));
    }
}
