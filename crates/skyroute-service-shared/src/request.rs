//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use crate::ProblemDetails;

/// Longest airport identifier accepted on the wire.
pub const MAX_AIRPORT_ID_LEN: usize = 16;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`. Boxed to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// JSON body for `POST /api/v1/route`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Departure airport id.
    pub start: String,

    /// Arrival airport id.
    pub end: String,

    /// Repeated attempt after a thunderstorm refusal.
    #[serde(default)]
    pub retry: bool,
}

impl RouteRequest {
    /// Library request with surrounding whitespace stripped from the ids.
    pub fn to_lib_request(&self) -> skyroute_lib::RouteRequest {
        let request = skyroute_lib::RouteRequest::new(self.start.trim(), self.end.trim());
        if self.retry {
            request.retry()
        } else {
            request
        }
    }
}

impl Validate for RouteRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        validate_airport_field("start", &self.start, request_id)?;
        validate_airport_field("end", &self.end, request_id)
    }
}

/// Query string for `GET /shortest_path?start=..&end=..&int=..`.
///
/// Any non-empty `int` value marks the query as a retry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteQuery {
    #[serde(default)]
    pub start: String,

    #[serde(default)]
    pub end: String,

    #[serde(default, rename = "int", skip_serializing_if = "Option::is_none")]
    pub attempt: Option<String>,
}

impl RouteQuery {
    pub fn is_retry(&self) -> bool {
        self.attempt
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
    }
}

impl From<RouteQuery> for RouteRequest {
    fn from(query: RouteQuery) -> Self {
        let retry = query.is_retry();
        Self {
            start: query.start,
            end: query.end,
            retry,
        }
    }
}

fn validate_airport_field(
    field: &str,
    value: &str,
    request_id: &str,
) -> Result<(), Box<ProblemDetails>> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Box::new(ProblemDetails::bad_request(
            format!("The '{}' field is required and cannot be empty", field),
            request_id,
        )));
    }
    if value.len() > MAX_AIRPORT_ID_LEN {
        return Err(Box::new(ProblemDetails::bad_request(
            format!(
                "The '{}' field cannot exceed {} characters",
                field, MAX_AIRPORT_ID_LEN
            ),
            request_id,
        )));
    }
    Ok(())
}
