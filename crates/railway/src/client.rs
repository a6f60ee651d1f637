use std::collections::HashMap;

use indexmap::IndexMap;
use model::{
    crew::Crew,
    journey::{Journey, JourneyDetail},
    order::{Order, OrderDetail, Requester},
    route::{Route, RouteDetail},
    seat::Seat,
    station::Station,
    ticket::{Ticket, TicketDetail, TicketRequest},
    train::{Train, TrainDetail, TrainType},
    WithId,
};
use serde::Serialize;
use utility::{
    id::{HasId, Id},
    let_also::LetAlso,
};

use crate::{
    database::{
        Database, DatabaseOperations, DatabaseTransaction, OrderRepo, Repo, SeatRepo,
        TicketRepo,
    },
    inventory,
    reservation::{self, Reservation},
    RequestError, RequestResult,
};

#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database,
{
    pub database: D,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self { database }
    }

    /// All rows of a plain table, ordered by id.
    pub async fn list<T>(&self) -> RequestResult<Vec<WithId<T>>>
    where
        T: Serialize + HasId<IdType = i64> + Send,
        D::Autocommit: Repo<T>,
    {
        Ok(Repo::<T>::get_all(&mut self.database.auto()).await?)
    }

    pub async fn get<T>(&self, id: Id<T>) -> RequestResult<WithId<T>>
    where
        T: Serialize + HasId<IdType = i64> + Send,
        D::Autocommit: Repo<T>,
    {
        Ok(Repo::<T>::get(&mut self.database.auto(), id).await?)
    }

    /// Deletes a row. Dependent rows are removed or protect the row,
    /// depending on the deletion policy of the referencing table.
    pub async fn delete<T>(&self, id: Id<T>) -> RequestResult<()>
    where
        T: Serialize + HasId<IdType = i64> + Send,
        D::Autocommit: Repo<T>,
    {
        Repo::<T>::delete(&mut self.database.auto(), id).await?;
        Ok(())
    }
}

impl<D> Client<D>
where
    D: Database,
{
    pub async fn create_station(&self, station: Station) -> RequestResult<WithId<Station>> {
        Ok(Repo::<Station>::insert(&mut self.database.auto(), station).await?)
    }

    pub async fn create_train_type(
        &self,
        train_type: TrainType,
    ) -> RequestResult<WithId<TrainType>> {
        Ok(Repo::<TrainType>::insert(&mut self.database.auto(), train_type).await?)
    }

    pub async fn create_crew(&self, crew: Crew) -> RequestResult<WithId<Crew>> {
        Ok(Repo::<Crew>::insert(&mut self.database.auto(), crew).await?)
    }
}

impl<D> Client<D>
where
    D: Database,
{
    pub async fn create_route(&self, route: Route) -> RequestResult<RouteDetail> {
        if route.is_loop() {
            log::warn!(
                "route starts and ends at the same station {}",
                route.source
            );
        }
        let mut tx = self.database.transaction().await?;
        let source = Repo::<Station>::get(&mut tx, route.source).await?;
        let destination = Repo::<Station>::get(&mut tx, route.destination).await?;
        let route = Repo::<Route>::insert(&mut tx, route).await?;
        tx.commit().await?;
        Ok(RouteDetail::new(route.id, source, destination))
    }

    pub async fn route_details(&self) -> RequestResult<Vec<RouteDetail>> {
        let mut auto = self.database.auto();
        let catalog = Catalog::load(&mut auto).await?;
        Repo::<Route>::get_all(&mut auto)
            .await?
            .into_iter()
            .map(|route| catalog.route(route))
            .collect()
    }

    pub async fn route_detail(&self, id: Id<Route>) -> RequestResult<RouteDetail> {
        let mut auto = self.database.auto();
        let route = Repo::<Route>::get(&mut auto, id).await?;
        let source = Repo::<Station>::get(&mut auto, route.content.source).await?;
        let destination = Repo::<Station>::get(&mut auto, route.content.destination).await?;
        Ok(RouteDetail::new(route.id, source, destination))
    }
}

impl<D> Client<D>
where
    D: Database,
{
    /// Creates a train and its whole seat inventory in one transaction.
    pub async fn create_train(&self, train: Train) -> RequestResult<TrainDetail> {
        let mut tx = self.database.transaction().await?;
        let (train, seats) =
            match inventory::create_train(&mut tx, train, D::BULK_INSERT_MAX).await {
                Ok(created) => created,
                Err(why) => {
                    rollback(tx).await;
                    return Err(why);
                }
            };
        let train_type = Repo::<TrainType>::get(&mut tx, train.content.train_type).await?;
        tx.commit().await?;
        log::info!(
            "created train {} '{}' with {} seats",
            train.id,
            train.content.name,
            seats.len()
        );
        Ok(TrainDetail::new(train, train_type))
    }

    pub async fn train_details(&self) -> RequestResult<Vec<TrainDetail>> {
        let mut auto = self.database.auto();
        let catalog = Catalog::load(&mut auto).await?;
        Repo::<Train>::get_all(&mut auto)
            .await?
            .into_iter()
            .map(|train| catalog.train(train))
            .collect()
    }

    pub async fn train_detail(&self, id: Id<Train>) -> RequestResult<TrainDetail> {
        let mut auto = self.database.auto();
        let train = Repo::<Train>::get(&mut auto, id).await?;
        let train_type = Repo::<TrainType>::get(&mut auto, train.content.train_type).await?;
        Ok(TrainDetail::new(train, train_type))
    }

    /// Seats of an existing train, ordered by carriage and seat number.
    pub async fn train_seats(&self, id: Id<Train>) -> RequestResult<Vec<WithId<Seat>>> {
        let mut auto = self.database.auto();
        Repo::<Train>::get(&mut auto, id).await?;
        Ok(auto.seats_of_train(id).await?)
    }

    pub async fn get_seat(&self, id: Id<Seat>) -> RequestResult<WithId<Seat>> {
        Ok(self.database.auto().get_seat(id).await?)
    }
}

impl<D> Client<D>
where
    D: Database,
{
    pub async fn create_journey(&self, journey: Journey) -> RequestResult<JourneyDetail> {
        let journey = journey.normalized();
        let mut tx = self.database.transaction().await?;
        let route = Repo::<Route>::get(&mut tx, journey.route).await?;
        let source = Repo::<Station>::get(&mut tx, route.content.source).await?;
        let destination = Repo::<Station>::get(&mut tx, route.content.destination).await?;
        let train = Repo::<Train>::get(&mut tx, journey.train).await?;
        let train_type = Repo::<TrainType>::get(&mut tx, train.content.train_type).await?;
        let mut crews = Vec::with_capacity(journey.crews.len());
        for crew in &journey.crews {
            crews.push(Repo::<Crew>::get(&mut tx, *crew).await?);
        }
        let journey = Repo::<Journey>::insert(&mut tx, journey).await?;
        tx.commit().await?;
        Ok(JourneyDetail {
            id: journey.id,
            route: RouteDetail::new(route.id, source, destination),
            train: TrainDetail::new(train, train_type),
            departure_time: journey.content.departure_time,
            arrival_time: journey.content.arrival_time,
            crews,
        })
    }

    pub async fn journey_details(&self) -> RequestResult<Vec<JourneyDetail>> {
        let mut auto = self.database.auto();
        let catalog = Catalog::load(&mut auto).await?;
        Repo::<Journey>::get_all(&mut auto)
            .await?
            .into_iter()
            .map(|journey| catalog.journey(journey))
            .collect()
    }

    pub async fn journey_detail(&self, id: Id<Journey>) -> RequestResult<JourneyDetail> {
        let mut auto = self.database.auto();
        let journey = Repo::<Journey>::get(&mut auto, id).await?;
        Catalog::load(&mut auto).await?.journey(journey)
    }
}

impl<D> Client<D>
where
    D: Database,
{
    pub async fn orders(&self, requester: &Requester) -> RequestResult<Vec<OrderDetail>> {
        let mut auto = self.database.auto();
        let orders = auto.orders_of(requester).await?;
        let mut tickets = orders
            .iter()
            .map(|order| (order.id, Vec::new()))
            .collect::<IndexMap<_, _>>();
        for ticket in auto.tickets_of(requester).await? {
            if let Some(group) = tickets.get_mut(&ticket.content.order) {
                group.push(ticket);
            }
        }
        orders
            .into_iter()
            .map(|order| {
                let group = tickets.swap_remove(&order.id).unwrap_or_default();
                OrderDetail::new(order, group)
            })
            .collect::<Vec<_>>()
            .let_owned(Ok)
    }

    /// An order of someone else is reported as not found.
    pub async fn order_detail(
        &self,
        requester: &Requester,
        id: Id<Order>,
    ) -> RequestResult<OrderDetail> {
        let mut auto = self.database.auto();
        let order = owned_order(&mut auto, requester, id).await?;
        let tickets = auto.tickets_of_order(order.id).await?;
        Ok(OrderDetail::new(order, tickets))
    }

    pub async fn tickets(&self, requester: &Requester) -> RequestResult<Vec<TicketDetail>> {
        let mut auto = self.database.auto();
        let catalog = Catalog::load(&mut auto).await?;
        let mut details = Vec::new();
        for ticket in auto.tickets_of(requester).await? {
            let seat = auto.get_seat(ticket.content.seat).await?;
            let journey = Repo::<Journey>::get(&mut auto, ticket.content.journey).await?;
            details.push(TicketDetail {
                id: ticket.id,
                order: ticket.content.order,
                journey: catalog.journey(journey)?,
                seat,
            });
        }
        Ok(details)
    }

    /// A ticket of someone else is reported as not found.
    pub async fn ticket_detail(
        &self,
        requester: &Requester,
        id: Id<Ticket>,
    ) -> RequestResult<TicketDetail> {
        let mut auto = self.database.auto();
        let ticket = auto.get_ticket(id).await?;
        owned_order(&mut auto, requester, ticket.content.order).await?;
        let seat = auto.get_seat(ticket.content.seat).await?;
        let journey = Repo::<Journey>::get(&mut auto, ticket.content.journey).await?;
        let journey = Catalog::load(&mut auto).await?.journey(journey)?;
        Ok(TicketDetail {
            id: ticket.id,
            order: ticket.content.order,
            journey,
            seat,
        })
    }

    /// Reserves all requested seats for `requester`, or none of them.
    pub async fn reserve_tickets(
        &self,
        requester: &Requester,
        requests: &[TicketRequest],
    ) -> RequestResult<Reservation> {
        reservation::check_batch(requests)?;
        let mut tx = self.database.transaction().await?;
        match reservation::reserve(&mut tx, requester, requests).await {
            Ok(reservation) => {
                tx.commit().await?;
                log::info!(
                    "order {} of {} reserved {} tickets",
                    reservation.order.id,
                    requester,
                    reservation.tickets.len()
                );
                Ok(reservation)
            }
            Err(why) => {
                log::warn!("reservation of {requester} rejected: {why}");
                rollback(tx).await;
                Err(why)
            }
        }
    }
}

async fn rollback<T: DatabaseTransaction + Send>(tx: T) {
    if let Err(why) = tx.rollback().await {
        log::error!("rollback failed: {why}");
    }
}

async fn owned_order<T>(
    conn: &mut T,
    requester: &Requester,
    id: Id<Order>,
) -> RequestResult<WithId<Order>>
where
    T: OrderRepo + Send,
{
    let order = conn.get_order(id).await?;
    if &order.content.user != requester {
        return Err(RequestError::NotFound);
    }
    Ok(order)
}

/// Reference data loaded once to assemble detail views without a query per
/// row.
struct Catalog {
    stations: HashMap<i64, WithId<Station>>,
    train_types: HashMap<i64, WithId<TrainType>>,
    crews: HashMap<i64, WithId<Crew>>,
    routes: HashMap<i64, WithId<Route>>,
    trains: HashMap<i64, WithId<Train>>,
}

fn by_id<T>(rows: Vec<WithId<T>>) -> HashMap<i64, WithId<T>>
where
    T: HasId<IdType = i64>,
{
    rows.into_iter().map(|row| (row.id.raw(), row)).collect()
}

fn lookup<T>(rows: &HashMap<i64, WithId<T>>, id: Id<T>) -> RequestResult<WithId<T>>
where
    T: HasId<IdType = i64> + Clone,
{
    rows.get(&id.raw()).cloned().ok_or(RequestError::NotFound)
}

impl Catalog {
    async fn load<T>(conn: &mut T) -> RequestResult<Self>
    where
        T: DatabaseOperations + Send,
    {
        Ok(Self {
            stations: by_id(Repo::<Station>::get_all(&mut *conn).await?),
            train_types: by_id(Repo::<TrainType>::get_all(&mut *conn).await?),
            crews: by_id(Repo::<Crew>::get_all(&mut *conn).await?),
            routes: by_id(Repo::<Route>::get_all(&mut *conn).await?),
            trains: by_id(Repo::<Train>::get_all(&mut *conn).await?),
        })
    }

    fn route(&self, route: WithId<Route>) -> RequestResult<RouteDetail> {
        let source = lookup(&self.stations, route.content.source)?;
        let destination = lookup(&self.stations, route.content.destination)?;
        Ok(RouteDetail::new(route.id, source, destination))
    }

    fn train(&self, train: WithId<Train>) -> RequestResult<TrainDetail> {
        let train_type = lookup(&self.train_types, train.content.train_type)?;
        Ok(TrainDetail::new(train, train_type))
    }

    fn journey(&self, journey: WithId<Journey>) -> RequestResult<JourneyDetail> {
        let route = self.route(lookup(&self.routes, journey.content.route)?)?;
        let train = self.train(lookup(&self.trains, journey.content.train)?)?;
        let crews = journey
            .content
            .crews
            .iter()
            .map(|crew| lookup(&self.crews, *crew))
            .collect::<RequestResult<Vec<_>>>()?;
        Ok(JourneyDetail {
            id: journey.id,
            route,
            train,
            departure_time: journey.content.departure_time,
            arrival_time: journey.content.arrival_time,
            crews,
        })
    }
}
