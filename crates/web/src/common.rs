use axum::{
    extract::{rejection::JsonRejection, FromRequest, OriginalUri, Query, Request},
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    routing::MethodFilter,
    Json,
};
use model::ExampleData;
use railway::RequestError;
use schemars::{schema_for, schema_for_value, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::hateoas;

pub type RouteResult<O> = Result<O, RouteErrorResponse>;
pub type HateoasResult<O> = RouteResult<Json<hateoas::Response<O>>>;

/// A `MethodFilter` that matches all http methods.
pub(crate) const METHOD_FILTER_ALL: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PATCH)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VecResponse<T> {
    pub data: Vec<T>,
}

impl<T> VecResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }

    pub fn hateoas(self) -> hateoas::Response<Self> {
        hateoas::Response::new(self)
    }
}

/// A JSON request body. Bodies that are not valid JSON or do not match `T`
/// are answered with a `400` `RouteErrorResponse`.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(RouteErrorResponse))]
pub struct JsonBody<T>(pub T);

// - Services returning commonly used responses -

#[derive(Debug, Deserialize)]
pub(crate) struct SchemaParams {
    #[serde(default = "Default::default")]
    example_data: bool,
}

pub(crate) async fn schema<T: ExampleData + JsonSchema + Serialize>(
    Query(params): Query<SchemaParams>,
) -> impl IntoResponse {
    if params.example_data {
        Json(schema_for_value!(T::example_data()))
    } else {
        Json(schema_for!(T))
    }
}

pub(crate) async fn route_not_found(
    OriginalUri(original_uri): OriginalUri,
    req: Request,
) -> impl IntoResponse {
    RouteErrorResponse::not_found(req.method(), original_uri.path())
}

// - Commonly used responses -

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteErrorResponse {
    #[serde(skip)]
    pub status_code: StatusCode,

    pub http_method: Option<String>,

    pub requested_uri: Option<String>,

    pub message: Option<String>,

    pub detailed_information: Option<String>,

    /// The seat that made a reservation fail.
    pub seat: Option<i64>,

    pub error: Option<String>,
}

impl RouteErrorResponse {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            http_method: None,
            requested_uri: None,
            message: None,
            detailed_information: None,
            seat: None,
            error: None,
        }
    }

    pub fn not_found(method: &Method, uri: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .with_method(method)
            .with_uri(uri)
            .with_default_message()
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED).with_message(message)
    }

    pub fn with_method(mut self, method: &Method) -> Self {
        self.http_method = Some(method.to_string());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.requested_uri = Some(uri.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_default_message(self) -> Self {
        let message = self
            .status_code
            .canonical_reason()
            .unwrap_or("unknown error");
        self.with_message(message)
    }

    pub fn with_detailed_information(mut self, message: impl Into<String>) -> Self {
        self.detailed_information = Some(message.into());
        self
    }

    /// Attaches method and path of the failed request.
    pub fn at(self, method: &Method, uri: &Uri) -> Self {
        self.with_method(method).with_uri(uri.path())
    }
}

impl From<RequestError> for RouteErrorResponse {
    fn from(value: RequestError) -> Self {
        match value {
            RequestError::NotFound => Self::new(StatusCode::NOT_FOUND)
                .with_message("The requested item does not exist."),
            RequestError::InvalidRequest(reason) => Self::new(StatusCode::BAD_REQUEST)
                .with_message("The request is invalid.")
                .with_detailed_information(reason),
            RequestError::SeatUnavailable(seat) => {
                let mut response = Self::new(StatusCode::BAD_REQUEST)
                    .with_message(format!("Seat {} is not available.", seat));
                response.seat = Some(seat.raw());
                response.error = Some("not available".to_owned());
                response
            }
            RequestError::Conflict => Self::new(StatusCode::CONFLICT)
                .with_message("The request conflicts with existing data."),
            RequestError::Other(other) => {
                log::error!("request failed: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR).with_default_message()
            }
        }
    }
}

impl From<JsonRejection> for RouteErrorResponse {
    fn from(value: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST)
            .with_message("The request body is invalid.")
            .with_detailed_information(value.body_text())
    }
}

impl IntoResponse for RouteErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.status_code, Json(self)).into_response()
    }
}
