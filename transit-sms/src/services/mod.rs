//! Thin external collaborators.
//!
//! Each service wraps one third-party endpoint and returns plain values for
//! the handler to render. Failures surface as [`ServiceError`]; the handler
//! decides what the user sees.

mod completion;
mod error;
mod news;
mod pharmacy;
mod weather;

pub use completion::{CompletionClient, CompletionConfig, is_yes, language_name};
pub use error::ServiceError;
pub use news::{DEFAULT_FEEDS, HEADLINES, NewsClient, parse_titles, render_headlines};
pub use pharmacy::{MAX_PHARMACIES, Pharmacy, PharmacyClient, parse_pharmacies, render_pharmacies};
pub use weather::{Forecast, HourForecast, WeatherClient};
