//! Parsed command records.

use std::fmt;

use chrono::NaiveDateTime;

use crate::domain::Provider;

/// Commands the assistant understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Completion,
    YesNo,
    Translate,
    Train,
    Bus,
    CityTransit,
    Walk,
    Transit,
    Weather,
    News,
    Pharmacy,
}

impl Command {
    /// The verb users type for this command.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Completion => "gpt",
            Command::YesNo => "janee",
            Command::Translate => "vertaling",
            Command::Train => "trein",
            Command::Bus => "bus",
            Command::CityTransit => "tram",
            Command::Walk => "route",
            Command::Transit => "ov",
            Command::Weather => "weer",
            Command::News => "nieuws",
            Command::Pharmacy => "apotheker",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Reply language requested by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Dutch,
    French,
}

impl Language {
    /// Two-letter locale tag.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Dutch => "nl",
            Language::French => "fr",
        }
    }
}

/// A public-transport mode a directions query may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitMode {
    Bus,
    Tram,
    Subway,
    Train,
}

impl TransitMode {
    pub fn as_param(&self) -> &'static str {
        match self {
            TransitMode::Bus => "bus",
            TransitMode::Tram => "tram",
            TransitMode::Subway => "subway",
            TransitMode::Train => "train",
        }
    }
}

/// How to travel for a directions query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TravelMode {
    Walking,
    Transit {
        modes: Vec<TransitMode>,
        max_routes: usize,
    },
}

/// Rail connections between two known stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainQuery {
    pub departure: String,
    pub arrival: String,
    pub time: NaiveDateTime,
}

/// A stop-directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopQuery {
    /// Direct lines from one stop name to another.
    Route {
        from: String,
        to: String,
        after: NaiveDateTime,
    },
    /// Upcoming departures at one stop.
    Board { stop: String },
}

/// Directions between two free-text places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionsQuery {
    pub origin: String,
    pub destination: String,
    pub mode: TravelMode,
    pub language: Language,
    pub departure: NaiveDateTime,
}

/// The outcome of parsing one message.
///
/// Every parse produces one of these; failures are records too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Completion {
        prompt: String,
    },
    YesNo {
        question: String,
    },
    Translate {
        lang: String,
        text: String,
    },
    Train(TrainQuery),
    Stops {
        provider: Provider,
        query: StopQuery,
    },
    Directions(DirectionsQuery),
    Weather {
        city: String,
    },
    News,
    Pharmacy {
        postcode: String,
    },
    /// A recognized command without usable arguments.
    ///
    /// `hint` carries the unparsable body, if there was one.
    Help {
        command: Command,
        hint: Option<String>,
    },
    Unknown,
}

impl Intent {
    /// The command this intent belongs to, if it was recognized.
    pub fn command(&self) -> Option<Command> {
        let command = match self {
            Intent::Completion { .. } => Command::Completion,
            Intent::YesNo { .. } => Command::YesNo,
            Intent::Translate { .. } => Command::Translate,
            Intent::Train(_) => Command::Train,
            Intent::Stops {
                provider: Provider::RegionalBus,
                ..
            } => Command::Bus,
            Intent::Stops {
                provider: Provider::CityTransit,
                ..
            } => Command::CityTransit,
            Intent::Directions(q) => match q.mode {
                TravelMode::Walking => Command::Walk,
                TravelMode::Transit { .. } => Command::Transit,
            },
            Intent::Weather { .. } => Command::Weather,
            Intent::News => Command::News,
            Intent::Pharmacy { .. } => Command::Pharmacy,
            Intent::Help { command, .. } => *command,
            Intent::Unknown => return None,
        };
        Some(command)
    }
}
