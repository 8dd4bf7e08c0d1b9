//! Intent dispatch.

use chrono::{Local, NaiveDateTime, TimeZone};
use tracing::{error, info};

use crate::command::{Command, CommandParser, Intent, StopQuery, TrainQuery};
use crate::config::{Credentials, ReplyBudget};
use crate::directions::{DirectionsClient, DirectionsConfig};
use crate::directory::{
    CityTransitClient, CityTransitConfig, RegionalBusClient, RegionalBusConfig, StopDirectory,
};
use crate::domain::{Provider, truncate};
use crate::rail::{RailClient, RailConfig, RailConnection};
use crate::resolver::{ResolverConfig, RouteResolver, stop_board};
use crate::services::{
    CompletionClient, CompletionConfig, HEADLINES, NewsClient, PharmacyClient, WeatherClient,
    render_headlines, render_pharmacies,
};
use crate::transport::InboundMessage;

use super::error::HandlerError;
use super::help::{UNKNOWN_REPLY, help_text};

/// Reply when an action fails unexpectedly.
pub const FAILURE_REPLY: &str = "Er ging iets mis. Probeer het later opnieuw.";

/// Connections requested per train query.
const TRAIN_RESULTS: usize = 6;

/// Connections shown per train reply.
const TRAIN_ROWS: usize = 3;

/// Reply characters included in the action log line.
const LOG_REPLY_CHARS: usize = 80;

/// The external systems the actions talk to.
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub rail: RailClient,
    pub directions: DirectionsClient,
    pub regional_bus: RegionalBusClient,
    pub city_transit: CityTransitClient,
    pub completion: CompletionClient,
    pub weather: WeatherClient,
    pub news: NewsClient,
    pub pharmacy: PharmacyClient,
}

impl Collaborators {
    /// Build every client with its default endpoints.
    pub fn from_credentials(credentials: &Credentials) -> Result<Self, HandlerError> {
        Ok(Self {
            rail: RailClient::new(RailConfig::new())?,
            directions: DirectionsClient::new(DirectionsConfig::new(&credentials.maps))?,
            regional_bus: RegionalBusClient::new(RegionalBusConfig::new(
                &credentials.regional_bus,
            ))?,
            city_transit: CityTransitClient::new(CityTransitConfig::new(
                &credentials.city_transit,
            ))?,
            completion: CompletionClient::new(CompletionConfig::new(&credentials.completion))?,
            weather: WeatherClient::new(&credentials.weather)?,
            news: NewsClient::new()?,
            pharmacy: PharmacyClient::new()?,
        })
    }
}

/// Turns messages into replies.
#[derive(Debug, Clone)]
pub struct Handler {
    parser: CommandParser,
    services: Collaborators,
    budget: ReplyBudget,
    resolver: ResolverConfig,
}

impl Handler {
    pub fn new(parser: CommandParser, services: Collaborators) -> Self {
        Self {
            parser,
            services,
            budget: ReplyBudget::default(),
            resolver: ResolverConfig::default(),
        }
    }

    pub fn with_budget(mut self, budget: ReplyBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver = config;
        self
    }

    /// Answer one message. Never fails; the reply fits the command's budget.
    pub async fn respond(&self, message: &InboundMessage) -> String {
        info!(sender = %message.sender, text = %message.text, "Message received");
        let now = message
            .received_at()
            .unwrap_or_else(|| Local::now().naive_local());
        self.respond_at(&message.text, now).await
    }

    /// Answer `text` as if received at `now`.
    pub async fn respond_at(&self, text: &str, now: NaiveDateTime) -> String {
        let intent = self.parser.parse(text, now);
        let command = intent.command();

        let reply = match self.execute(&intent, now).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(command = ?command, error = %e, "Action failed");
                FAILURE_REPLY.to_string()
            }
        };

        let reply = truncate(&reply, self.budget.for_command(command));
        let logged: String = reply.chars().take(LOG_REPLY_CHARS).collect();
        info!(command = ?command, reply = %logged, "Action done");
        reply
    }

    async fn execute(&self, intent: &Intent, now: NaiveDateTime) -> Result<String, HandlerError> {
        let s = &self.services;
        let reply = match intent {
            Intent::Completion { prompt } => {
                let budget = self.budget.for_command(Some(Command::Completion));
                let answer = s.completion.complete(prompt, budget).await?;
                format!("GPT: {answer}")
            }
            Intent::YesNo { question } => {
                let answer = if s.completion.yes_no(question).await? {
                    "Ja"
                } else {
                    "Nee"
                };
                answer.to_string()
            }
            Intent::Translate { lang, text } => s.completion.translate(lang, text).await?,
            Intent::Train(query) => self.trains(query).await?,
            Intent::Stops { provider, query } => match provider {
                Provider::RegionalBus => answer_stops(&s.regional_bus, query, &self.resolver).await,
                Provider::CityTransit => answer_stops(&s.city_transit, query, &self.resolver).await,
            },
            Intent::Directions(query) => s.directions.plan(query, &s.rail).await.to_string(),
            Intent::Weather { city } => {
                let forecast = s.weather.forecast(city, now).await?;
                if forecast.hours.is_empty() {
                    "Geen uurlijkse data beschikbaar.".to_string()
                } else {
                    forecast.to_string()
                }
            }
            Intent::News => {
                let titles = s.news.headlines(HEADLINES).await;
                if titles.is_empty() {
                    "Nieuws tijdelijk niet beschikbaar.".to_string()
                } else {
                    render_headlines(&titles)
                }
            }
            Intent::Pharmacy { postcode } => {
                let pharmacies = s.pharmacy.on_duty(postcode).await?;
                if pharmacies.is_empty() {
                    format!("Geen wachtapotheek gevonden voor {postcode}.")
                } else {
                    render_pharmacies(&pharmacies)
                }
            }
            Intent::Help { command, hint } => help_text(*command, hint.as_deref()),
            Intent::Unknown => UNKNOWN_REPLY.to_string(),
        };
        Ok(reply)
    }

    async fn trains(&self, query: &TrainQuery) -> Result<String, HandlerError> {
        let connections = self
            .services
            .rail
            .connections(&query.departure, &query.arrival, query.time, TRAIN_RESULTS)
            .await?;
        if connections.is_empty() {
            return Ok(format!(
                "Geen treinen {}->{}.",
                query.departure, query.arrival
            ));
        }
        Ok(render_connections(&connections, &Local))
    }
}

/// Route or board reply from one stop directory.
pub async fn answer_stops<D: StopDirectory>(
    directory: &D,
    query: &StopQuery,
    config: &ResolverConfig,
) -> String {
    match query {
        StopQuery::Route { from, to, after } => RouteResolver::new(directory, config.clone())
            .resolve(from, to, *after)
            .await
            .to_string(),
        StopQuery::Board { stop } => stop_board(directory, stop, config).await.to_string(),
    }
}

/// The first few connections, one per line, clock times in `tz`.
pub fn render_connections<Tz: TimeZone>(connections: &[RailConnection], tz: &Tz) -> String {
    connections
        .iter()
        .take(TRAIN_ROWS)
        .map(|c| c.render(tz))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::domain::{Departure, LineAtStop, StopId};
    use crate::rail::RailEvent;
    use crate::stations::StationIndex;
    use chrono::{NaiveDate, Utc};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
    }

    fn handler() -> Handler {
        let stations = StationIndex::from_names(["Gent-Sint-Pieters", "Brussel-Centraal"]);
        let services = Collaborators::from_credentials(&Credentials::default()).unwrap();
        Handler::new(CommandParser::new(Arc::new(stations)), services)
    }

    #[tokio::test]
    async fn unknown_command_lists_verbs() {
        let reply = handler().respond_at("hallo daar", now()).await;
        assert_eq!(reply, UNKNOWN_REPLY);
    }

    #[tokio::test]
    async fn bare_verb_gets_help() {
        let reply = handler().respond_at("weer", now()).await;
        assert!(reply.starts_with("Gebruik: weer <stad>"));
    }

    #[tokio::test]
    async fn unknown_station_gets_train_help() {
        let reply = handler().respond_at("trein atlantis gent", now()).await;
        assert!(reply.starts_with("Gebruik: trein"));
        assert!(reply.ends_with("Je vroeg: \"atlantis gent\""));
    }

    #[tokio::test]
    async fn reply_fits_budget() {
        let handler = handler().with_budget(ReplyBudget::new(20));
        let reply = handler.respond_at("trein", now()).await;
        assert_eq!(reply.chars().count(), 20);
        assert!(reply.ends_with('…'));
    }

    #[tokio::test]
    async fn stops_route_and_board() {
        let after = now();
        let origin = StopId::scoped("3", "1");
        let destination = StopId::scoped("3", "2");
        let directory = InMemoryDirectory::new(Provider::RegionalBus)
            .with_stop(origin.clone(), "Leuven Station")
            .with_stop(destination.clone(), "Aarschot Station")
            .with_lines(origin.clone(), vec![LineAtStop::new(Some("3".into()), "35")])
            .with_lines(destination.clone(), vec![LineAtStop::new(Some("3".into()), "35")])
            .with_realtime(
                origin,
                vec![
                    Departure::new("35", "Aarschot")
                        .with_scheduled(after + chrono::Duration::minutes(10)),
                ],
            );
        let config = ResolverConfig::default();

        let route = StopQuery::Route {
            from: "leuven".into(),
            to: "aarschot".into(),
            after,
        };
        assert_eq!(
            answer_stops(&directory, &route, &config).await,
            "15:10 Leuven Station lijn 35 -> Aarschot Station"
        );

        let board = StopQuery::Board {
            stop: "leuven".into(),
        };
        assert_eq!(
            answer_stops(&directory, &board, &config).await,
            "Leuven Station\n  15:10 lijn 35 -> Aarschot"
        );
    }

    #[test]
    fn at_most_three_connections() {
        let event = |station: &str, m: u32| RailEvent {
            station: station.into(),
            time: Utc.with_ymd_and_hms(2024, 3, 15, 13, m, 0).unwrap(),
            delay_secs: 0,
            platform: None,
        };
        let connections: Vec<RailConnection> = (0..5)
            .map(|i| RailConnection {
                departure: event("Gent-Sint-Pieters", i * 10),
                arrival: event("Brussel-Centraal", i * 10 + 5),
                vias: Vec::new(),
            })
            .collect();

        let rendered = render_connections(&connections, &Utc);
        assert_eq!(rendered.lines().count(), 3);
        assert_eq!(
            rendered.lines().next(),
            Some("13:00 Gent-Sint-Pieters -> 13:05 Brussel-Centraal")
        );
    }
}
