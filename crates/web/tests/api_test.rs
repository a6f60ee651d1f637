use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use railway::memory::MemoryDatabase;
use serde_json::{json, Value};
use tower::ServiceExt;
use web::{app, middleware::requester::REQUESTER_HEADER, WebState};

fn test_app() -> Router {
    app(WebState::new(MemoryDatabase::new()))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    requester: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "tickets.test");
    if let Some(requester) = requester {
        request = request.header(REQUESTER_HEADER, requester);
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn link<'a>(body: &'a Value, relation: &str) -> Option<&'a str> {
    body["links"]
        .as_array()?
        .iter()
        .find(|link| link["rel"] == relation)?["href"]
        .as_str()
}

/// Sets up a journey on a 1 x 3 train and returns its (journey, train, seats).
async fn timetable(app: &Router) -> (i64, i64, Vec<i64>) {
    let (_, kiel) = call(
        app,
        "POST",
        "/api/v1/stations/",
        None,
        Some(json!({"name": "Kiel", "latitude": 54.3233, "longitude": 10.1228})),
    )
    .await;
    let (_, hamburg) = call(
        app,
        "POST",
        "/api/v1/stations/",
        None,
        Some(json!({"name": "Hamburg", "latitude": 53.5511, "longitude": 9.9937})),
    )
    .await;
    let (_, route) = call(
        app,
        "POST",
        "/api/v1/routes/",
        None,
        Some(json!({"source": kiel["id"], "destination": hamburg["id"]})),
    )
    .await;
    let (_, train_type) = call(
        app,
        "POST",
        "/api/v1/train-types/",
        None,
        Some(json!({"name": "Regional"})),
    )
    .await;
    let (status, train) = call(
        app,
        "POST",
        "/api/v1/trains/",
        None,
        Some(json!({
            "name": "RE 7",
            "carriage_num": 1,
            "places_in_carriage": 3,
            "train_type": train_type["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, journey) = call(
        app,
        "POST",
        "/api/v1/journeys/",
        None,
        Some(json!({
            "route": route["id"],
            "train": train["id"],
            "departure_time": "2024-06-05T10:00:00Z",
            "arrival_time": "2024-06-05T11:15:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let train_id = train["id"].as_i64().unwrap();
    let (_, seats) = call(
        app,
        "GET",
        &format!("/api/v1/trains/{}/seats", train_id),
        None,
        None,
    )
    .await;
    let seats = seats["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|seat| seat["id"].as_i64().unwrap())
        .collect();

    (journey["id"].as_i64().unwrap(), train_id, seats)
}

fn batch(journey: i64, train: i64, seats: &[i64]) -> Value {
    let tickets = seats
        .iter()
        .map(|seat| json!({"journey": journey, "seat": seat, "train": train}))
        .collect::<Vec<_>>();
    json!({ "tickets": tickets })
}

#[tokio::test]
async fn ping_answers_pong() {
    let app = test_app();
    let (status, body) = call(&app, "GET", "/api/ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "pong!"}));
}

#[tokio::test]
async fn created_station_is_listed_with_links() {
    let app = test_app();
    let (status, created) = call(
        &app,
        "POST",
        "/api/v1/stations/",
        None,
        Some(json!({"name": "Kiel", "latitude": 54.3233, "longitude": 10.1228})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Kiel");

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) =
        call(&app, "GET", &format!("/api/v1/stations/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        link(&fetched, "self"),
        Some(format!("http://tickets.test/api/v1/stations/{}", id).as_str())
    );

    let (status, listed) = call(&app, "GET", "/api/v1/stations/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn unknown_paths_and_ids_are_not_found() {
    let app = test_app();
    let (status, body) = call(&app, "GET", "/api/v1/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["http_method"], "GET");

    let (status, _) = call(&app, "GET", "/api/v1/stations/42", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn route_detail_names_both_stations() {
    let app = test_app();
    let (journey, _, _) = timetable(&app).await;
    let (status, body) =
        call(&app, "GET", &format!("/api/v1/journeys/{}", journey), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"]["full_route"], "Kiel-Hamburg");
    assert!(link(&body, "train").is_some());
}

#[tokio::test]
async fn ticket_endpoints_need_a_requester() {
    let app = test_app();
    let (status, _) = call(&app, "GET", "/api/v1/tickets/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, "GET", "/api/v1/orders/", Some("  "), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reservation_creates_an_order_with_tickets() {
    let app = test_app();
    let (journey, train, seats) = timetable(&app).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/tickets/",
        Some("alice"),
        Some(batch(journey, train, &seats[..2])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["user"], "alice");
    assert_eq!(body["tickets"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["tickets"][1]["seat"], json!(seats[1]));

    let (status, orders) = call(&app, "GET", "/api/v1/orders/", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders["data"][0]["ticket_count"], 2);

    let (_, tickets) = call(&app, "GET", "/api/v1/tickets/", Some("bob"), None).await;
    assert_eq!(tickets["data"].as_array().map(Vec::len), Some(0));

    let order = body["order"]["id"].as_i64().unwrap();
    let (status, _) =
        call(&app, "GET", &format!("/api/v1/orders/{}", order), Some("bob"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn taken_seat_fails_the_whole_batch() {
    let app = test_app();
    let (journey, train, seats) = timetable(&app).await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/v1/tickets/",
        Some("alice"),
        Some(batch(journey, train, &seats[1..2])),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/tickets/",
        Some("bob"),
        Some(batch(journey, train, &seats)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["seat"], json!(seats[1]));
    assert_eq!(body["error"], "not available");

    let (_, orders) = call(&app, "GET", "/api/v1/orders/", Some("bob"), None).await;
    assert_eq!(orders["data"].as_array().map(Vec::len), Some(0));
    let (_, seat) = call(
        &app,
        "GET",
        &format!("/api/v1/trains/{}/seats/{}", train, seats[0]),
        None,
        None,
    )
    .await;
    assert_eq!(seat["is_available"], true);
}

#[tokio::test]
async fn empty_batch_is_a_bad_request() {
    let app = test_app();
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/tickets/",
        Some("alice"),
        Some(json!({"tickets": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detailed_information"].is_string());
}

#[tokio::test]
async fn train_type_in_use_can_not_be_deleted() {
    let app = test_app();
    let (_, train, _) = timetable(&app).await;
    let (_, train) = call(&app, "GET", &format!("/api/v1/trains/{}", train), None, None).await;
    let train_type = train["train_type"]["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/v1/train-types/{}", train_type),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_ticket_batches_are_bad_requests() {
    let app = test_app();
    for body in [
        json!({"tickets": "nope"}),
        json!({"tickets": [{"journey": 1, "train": 1}]}),
    ] {
        let (status, body) =
            call(&app, "POST", "/api/v1/tickets/", Some("alice"), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detailed_information"].is_string());
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/tickets/")
        .header(REQUESTER_HEADER, "alice")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].is_string());

    let (_, orders) = call(&app, "GET", "/api/v1/orders/", Some("alice"), None).await;
    assert_eq!(orders["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn oversized_train_is_a_bad_request() {
    let app = test_app();
    let (_, train_type) = call(
        &app,
        "POST",
        "/api/v1/train-types/",
        None,
        Some(json!({"name": "Regional"})),
    )
    .await;
    let (status, body) = call(
        &app,
        "POST",
        "/api/v1/trains/",
        None,
        Some(json!({
            "name": "Endless",
            "carriage_num": 100_000,
            "places_in_carriage": 100_000,
            "train_type": train_type["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detailed_information"].is_string());

    let (_, trains) = call(&app, "GET", "/api/v1/trains/", None, None).await;
    assert_eq!(trains["data"].as_array().map(Vec::len), Some(0));
}
