use std::collections::HashSet;

use futures::future::join_all;
use model::{
    crew::Crew,
    journey::Journey,
    order::Requester,
    route::Route,
    seat::Seat,
    station::Station,
    ticket::{Ticket, TicketRequest},
    train::{Train, TrainType},
    ExampleData, WithId,
};
use railway::{memory::MemoryDatabase, Client, RequestError};
use utility::id::Id;

struct Fixture {
    client: Client<MemoryDatabase>,
    train: Id<Train>,
    journey: Id<Journey>,
    seats: Vec<WithId<Seat>>,
}

impl Fixture {
    async fn new(carriages: i32, places: i32) -> Self {
        let client = Client::new(MemoryDatabase::new());
        let kiel = client
            .create_station(Station {
                name: "Kiel Hbf".to_owned(),
                latitude: 54.3149,
                longitude: 10.1318,
            })
            .await
            .unwrap();
        let plon = client
            .create_station(Station {
                name: "Plön".to_owned(),
                latitude: 54.1601,
                longitude: 10.4219,
            })
            .await
            .unwrap();
        let route = client
            .create_route(Route {
                source: kiel.id,
                destination: plon.id,
            })
            .await
            .unwrap();
        let train_type = client
            .create_train_type(TrainType::example_data())
            .await
            .unwrap();
        let train = client
            .create_train(Train {
                carriage_num: carriages,
                places_in_carriage: places,
                train_type: train_type.id,
                ..Train::example_data()
            })
            .await
            .unwrap();
        let crew = client.create_crew(Crew::example_data()).await.unwrap();
        let journey = client
            .create_journey(Journey {
                route: route.id,
                train: train.id,
                crews: vec![crew.id],
                ..Journey::example_data()
            })
            .await
            .unwrap();
        let seats = client.train_seats(train.id).await.unwrap();
        Self {
            client,
            train: train.id,
            journey: journey.id,
            seats,
        }
    }

    fn request(&self, seat: usize) -> TicketRequest {
        TicketRequest {
            journey: self.journey,
            seat: self.seats[seat].id,
            train: self.train,
        }
    }
}

fn requester(name: &str) -> Requester {
    Requester::new(name).unwrap()
}

#[tokio::test]
async fn small_train_gets_six_seats() {
    let fixture = Fixture::new(2, 3).await;
    assert_eq!(fixture.seats.len(), 6);
    let carriages = fixture
        .seats
        .iter()
        .map(|seat| seat.content.carriage)
        .collect::<HashSet<_>>();
    assert_eq!(carriages, HashSet::from([1, 2]));
    for carriage in [1, 2] {
        let numbers = fixture
            .seats
            .iter()
            .filter(|seat| seat.content.carriage == carriage)
            .map(|seat| seat.content.seat_number)
            .collect::<HashSet<_>>();
        assert_eq!(numbers, HashSet::from([1, 2, 3]));
    }
}

#[tokio::test]
async fn reservation_issues_one_ticket_per_seat() {
    let fixture = Fixture::new(2, 3).await;
    let alice = requester("alice");

    let reservation = fixture
        .client
        .reserve_tickets(&alice, &[fixture.request(0), fixture.request(1)])
        .await
        .unwrap();

    assert_eq!(reservation.tickets.len(), 2);
    assert_eq!(reservation.order.content.user, alice);
    assert!(reservation
        .tickets
        .iter()
        .all(|ticket| ticket.content.order == reservation.order.id));
    for seat in &fixture.seats[..2] {
        let seat = fixture.client.get_seat(seat.id).await.unwrap();
        assert!(!seat.content.is_available);
    }
    let untouched = fixture.client.get_seat(fixture.seats[2].id).await.unwrap();
    assert!(untouched.content.is_available);
}

#[tokio::test]
async fn concurrent_reservations_of_one_seat_only_one_wins() {
    let fixture = Fixture::new(2, 3).await;
    let seat = fixture.seats[0].id;

    let first = {
        let client = fixture.client.clone();
        let request = fixture.request(0);
        tokio::spawn(async move {
            client.reserve_tickets(&requester("alice"), &[request]).await
        })
    };
    let second = {
        let client = fixture.client.clone();
        let request = fixture.request(0);
        tokio::spawn(async move {
            client.reserve_tickets(&requester("bob"), &[request]).await
        })
    };
    let results = [first.await.unwrap(), second.await.unwrap()];

    let won = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(won, 1);
    for result in &results {
        match result {
            Ok(reservation) => assert_eq!(reservation.tickets.len(), 1),
            Err(RequestError::SeatUnavailable(id)) => assert_eq!(*id, seat),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}

#[tokio::test]
async fn failed_batch_leaves_nothing_behind() {
    let fixture = Fixture::new(2, 3).await;
    fixture
        .client
        .reserve_tickets(&requester("alice"), &[fixture.request(1)])
        .await
        .unwrap();

    let bob = requester("bob");
    let result = fixture
        .client
        .reserve_tickets(
            &bob,
            &[fixture.request(0), fixture.request(1), fixture.request(2)],
        )
        .await;

    assert!(matches!(
        result,
        Err(RequestError::SeatUnavailable(id)) if id == fixture.seats[1].id
    ));
    assert!(fixture.client.orders(&bob).await.unwrap().is_empty());
    assert!(fixture.client.tickets(&bob).await.unwrap().is_empty());
    assert_eq!(fixture.client.orders(&requester("alice")).await.unwrap().len(), 1);
    for index in [0, 2] {
        let seat = fixture
            .client
            .get_seat(fixture.seats[index].id)
            .await
            .unwrap();
        assert!(seat.content.is_available);
    }
}

#[tokio::test]
async fn repeated_reads_see_an_available_seat() {
    let fixture = Fixture::new(1, 2).await;
    let seat = fixture.seats[0].id;
    for _ in 0..3 {
        assert!(fixture.client.get_seat(seat).await.unwrap().content.is_available);
    }
    fixture
        .client
        .reserve_tickets(&requester("alice"), &[fixture.request(0)])
        .await
        .unwrap();
    assert!(!fixture.client.get_seat(seat).await.unwrap().content.is_available);
}

#[tokio::test]
async fn empty_batch_is_rejected_without_an_order() {
    let fixture = Fixture::new(1, 1).await;
    let alice = requester("alice");
    let result = fixture.client.reserve_tickets(&alice, &[]).await;
    assert!(matches!(result, Err(RequestError::InvalidRequest(_))));
    assert!(fixture.client.orders(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn seat_of_another_train_is_invalid() {
    let fixture = Fixture::new(1, 2).await;
    let request = TicketRequest {
        train: Id::new(fixture.train.raw() + 1000),
        ..fixture.request(0)
    };
    let result = fixture
        .client
        .reserve_tickets(&requester("alice"), &[request])
        .await;
    assert!(matches!(result, Err(RequestError::InvalidRequest(_))));
}

#[tokio::test]
async fn unknown_seat_is_not_found() {
    let fixture = Fixture::new(1, 1).await;
    let request = TicketRequest {
        seat: Id::new(999_999),
        ..fixture.request(0)
    };
    let result = fixture
        .client
        .reserve_tickets(&requester("alice"), &[request])
        .await;
    assert!(matches!(result, Err(RequestError::NotFound)));
}

#[tokio::test]
async fn same_seat_twice_in_one_batch_is_unavailable() {
    let fixture = Fixture::new(1, 2).await;
    let result = fixture
        .client
        .reserve_tickets(
            &requester("alice"),
            &[fixture.request(0), fixture.request(0)],
        )
        .await;
    assert!(matches!(
        result,
        Err(RequestError::SeatUnavailable(id)) if id == fixture.seats[0].id
    ));
    assert!(fixture
        .client
        .get_seat(fixture.seats[0].id)
        .await
        .unwrap()
        .content
        .is_available);
}

#[tokio::test]
async fn many_concurrent_buyers_never_oversell() {
    let fixture = Fixture::new(2, 4).await;
    let seat_count = fixture.seats.len();

    // every buyer wants two neighbouring seats, so batches overlap
    let buyers = (0..32)
        .map(|buyer| {
            let client = fixture.client.clone();
            let first = buyer % seat_count;
            let second = (buyer + 1) % seat_count;
            let requests = vec![fixture.request(first), fixture.request(second)];
            tokio::spawn(async move {
                client
                    .reserve_tickets(&requester(&format!("buyer-{buyer}")), &requests)
                    .await
            })
        })
        .collect::<Vec<_>>();
    let results = join_all(buyers).await;

    let mut sold = Vec::new();
    for result in results {
        match result.unwrap() {
            Ok(reservation) => sold.extend(
                reservation
                    .tickets
                    .into_iter()
                    .map(|ticket| ticket.content.seat),
            ),
            Err(RequestError::SeatUnavailable(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    let unique = sold.iter().collect::<HashSet<_>>();
    assert_eq!(unique.len(), sold.len());
    assert!(!sold.is_empty());

    let unavailable = fixture
        .client
        .train_seats(fixture.train)
        .await
        .unwrap()
        .into_iter()
        .filter(|seat| !seat.content.is_available)
        .count();
    assert_eq!(unavailable, sold.len());
}

#[tokio::test]
async fn orders_and_tickets_are_private() {
    let fixture = Fixture::new(1, 2).await;
    let alice = requester("alice");
    let bob = requester("bob");
    let reservation = fixture
        .client
        .reserve_tickets(&alice, &[fixture.request(0)])
        .await
        .unwrap();
    let ticket: Id<Ticket> = reservation.tickets[0].id;

    let orders = fixture.client.orders(&alice).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].tickets.len(), 1);
    let detail = fixture.client.ticket_detail(&alice, ticket).await.unwrap();
    assert_eq!(detail.seat.id, fixture.seats[0].id);
    assert_eq!(detail.journey.id, fixture.journey);

    assert!(matches!(
        fixture.client.order_detail(&bob, reservation.order.id).await,
        Err(RequestError::NotFound)
    ));
    assert!(matches!(
        fixture.client.ticket_detail(&bob, ticket).await,
        Err(RequestError::NotFound)
    ));
    assert!(fixture.client.tickets(&bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_train_cascades_to_its_seats_and_journeys() {
    let fixture = Fixture::new(1, 2).await;
    fixture.client.delete::<Train>(fixture.train).await.unwrap();

    assert!(matches!(
        fixture.client.train_seats(fixture.train).await,
        Err(RequestError::NotFound)
    ));
    assert!(matches!(
        fixture.client.get_seat(fixture.seats[0].id).await,
        Err(RequestError::NotFound)
    ));
    assert!(fixture.client.journey_details().await.unwrap().is_empty());
}

#[tokio::test]
async fn route_to_unknown_station_is_not_found() {
    let client = Client::new(MemoryDatabase::new());
    let station = client.create_station(Station::example_data()).await.unwrap();
    let result = client
        .create_route(Route {
            source: station.id,
            destination: Id::new(404),
        })
        .await;
    assert!(matches!(result, Err(RequestError::NotFound)));
    assert!(client.route_details().await.unwrap().is_empty());
}
