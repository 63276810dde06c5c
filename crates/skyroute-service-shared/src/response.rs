//! Response bodies for successful HTTP responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use skyroute_lib::RoutePlan;

/// Wrapper adding a `content_type` field next to the flattened payload,
/// mirroring the field carried by `ProblemDetails`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,

    pub content_type: String,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Successful route query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Airport ids from departure to arrival inclusive.
    pub route: Vec<String>,
    pub hops: usize,
    pub distance_km: f64,
    pub weighted_cost: f64,
}

impl From<RoutePlan> for RouteResponse {
    fn from(plan: RoutePlan) -> Self {
        Self {
            hops: plan.hop_count(),
            route: plan.steps,
            distance_km: plan.distance_km,
            weighted_cost: plan.weighted_cost,
        }
    }
}
