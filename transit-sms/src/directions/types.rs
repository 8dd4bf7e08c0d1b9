//! Wire types of the geocoding and directions APIs.
//!
//! Only the fields used for reply rendering are modelled; everything is
//! optional or defaulted because steps of different travel modes carry
//! different subsets.

use serde::Deserialize;

use super::error::DirectionsError;

/// Status values that carry a usable (possibly empty) result.
const USABLE_STATUSES: [&str; 2] = ["OK", "ZERO_RESULTS"];

/// Reject responses whose `status` reports an API-level failure.
pub fn check_status(status: &str, error_message: Option<&str>) -> Result<(), DirectionsError> {
    if USABLE_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(DirectionsError::Api {
            status: status.to_string(),
            message: error_message.unwrap_or_default().to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// `lat,lng`, as the directions endpoint expects.
    pub fn as_param(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
}

#[derive(Debug, Deserialize)]
pub struct RouteRecord {
    #[serde(default)]
    pub legs: Vec<LegRecord>,
}

#[derive(Debug, Deserialize)]
pub struct LegRecord {
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub departure_time: Option<TimeText>,
    #[serde(default)]
    pub arrival_time: Option<TimeText>,
    #[serde(default)]
    pub duration: Option<Quantity>,
    #[serde(default)]
    pub distance: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
pub struct StepRecord {
    #[serde(default)]
    pub travel_mode: String,
    #[serde(default)]
    pub distance: Option<Quantity>,
    #[serde(default)]
    pub html_instructions: String,
    #[serde(default)]
    pub transit_details: Option<TransitDetails>,
}

#[derive(Debug, Deserialize)]
pub struct TransitDetails {
    #[serde(default)]
    pub departure_stop: StopRecord,
    #[serde(default)]
    pub arrival_stop: StopRecord,
    #[serde(default)]
    pub departure_time: Option<TimeText>,
    #[serde(default)]
    pub arrival_time: Option<TimeText>,
    #[serde(default)]
    pub line: LineRecord,
    #[serde(default)]
    pub num_stops: Option<u32>,
    #[serde(default)]
    pub departure_platform: Option<String>,
    #[serde(default)]
    pub arrival_platform: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StopRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub track: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LineRecord {
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vehicle: Option<VehicleRecord>,
}

#[derive(Debug, Deserialize)]
pub struct VehicleRecord {
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A clock time as display text plus unix seconds.
#[derive(Debug, Default, Deserialize)]
pub struct TimeText {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: Option<i64>,
}

/// A distance in metres or a duration in seconds.
#[derive(Debug, Default, Deserialize)]
pub struct Quantity {
    #[serde(default)]
    pub value: i64,
}
