//! Hourly weather forecast.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::Deserialize;
use tracing::info;

use crate::http::{DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT_SECS, LimitedClient, USER_AGENT};

use super::error::ServiceError;

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Hours included in a forecast reply.
const FORECAST_HOURS: usize = 4;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: Location,
    forecast: ForecastDays,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ForecastDays {
    #[serde(default)]
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    #[serde(default)]
    hour: Vec<HourRecord>,
}

#[derive(Debug, Deserialize)]
struct HourRecord {
    /// `2024-03-15 14:00`
    time: String,
    temp_c: f64,
    condition: Condition,
    wind_kph: f64,
    #[serde(default)]
    chance_of_rain: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(default)]
    text: String,
}

/// One forecast hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourForecast {
    /// `HH:MM`
    pub time: String,
    pub temp_c: f64,
    pub description: String,
    pub wind_kph: f64,
    pub rain_chance: f64,
}

impl fmt::Display for HourForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}°C {}, wind: {}km/h, regen: {}%",
            self.time,
            self.temp_c.round(),
            self.description,
            self.wind_kph.round(),
            self.rain_chance.round()
        )
    }
}

/// The next few hours of weather at a place.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub location: String,
    pub hours: Vec<HourForecast>,
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)?;
        for hour in &self.hours {
            write!(f, "\n{hour}")?;
        }
        Ok(())
    }
}

impl ForecastResponse {
    /// Keep the first hours from the current hour onwards.
    fn into_forecast(self, current_hour: u32) -> Forecast {
        let hours = self
            .forecast
            .forecastday
            .into_iter()
            .next()
            .map(|day| day.hour)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|h| {
                let clock = h.time.split_once(' ')?.1.get(..5)?.to_string();
                let hour: u32 = clock.get(..2)?.parse().ok()?;
                (hour >= current_hour).then(|| HourForecast {
                    time: clock,
                    temp_c: h.temp_c,
                    description: h.condition.text,
                    wind_kph: h.wind_kph,
                    rain_chance: h.chance_of_rain,
                })
            })
            .take(FORECAST_HOURS)
            .collect();

        Forecast {
            location: self.location.name,
            hours,
        }
    }
}

/// Weather forecast client.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: LimitedClient,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ServiceError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let http = LimitedClient::new(
            &[("accept", "application/json"), ("user-agent", USER_AGENT)],
            DEFAULT_TIMEOUT_SECS,
            DEFAULT_MAX_CONCURRENT,
        )?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Forecast for `city` from the hour of `now` onwards. The hour list may
    /// be empty late in the day.
    pub async fn forecast(&self, city: &str, now: NaiveDateTime) -> Result<Forecast, ServiceError> {
        let url = format!("{}/forecast.json", self.base_url);
        let response: ForecastResponse = self
            .http
            .get_json(
                &url,
                &[
                    ("key", self.api_key.as_str()),
                    ("q", city),
                    ("days", "1"),
                    ("lang", "nl"),
                    ("aqi", "no"),
                    ("alerts", "no"),
                ],
            )
            .await?;

        let forecast = response.into_forecast(now.hour());
        info!(city, location = %forecast.location, hours = forecast.hours.len(), "Forecast");
        Ok(forecast)
    }
}
