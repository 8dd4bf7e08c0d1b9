//! Message text to [`Intent`].

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::{Provider, at_clock, parse_clock, truncate_to_minute};
use crate::matcher::match_entity;
use crate::stations::StationIndex;

use super::grammar::{
    SEPARATOR_WORDS, TransitTrigger, matching_triggers, split_place_pair, split_time_suffix,
};
use super::intent::{
    Command, DirectionsQuery, Intent, Language, StopQuery, TrainQuery, TravelMode,
};

/// Parses raw message text into intents.
///
/// Never fails: malformed input produces [`Intent::Help`] or
/// [`Intent::Unknown`].
#[derive(Debug, Clone)]
pub struct CommandParser {
    stations: Arc<StationIndex>,
}

impl CommandParser {
    pub fn new(stations: Arc<StationIndex>) -> Self {
        Self { stations }
    }

    /// Parse one message. `now` is the reference time for commands without
    /// an explicit clock time.
    pub fn parse(&self, raw: &str, now: NaiveDateTime) -> Intent {
        let text = raw.trim();
        let words: Vec<&str> = text.split_whitespace().collect();
        let Some(first) = words.first() else {
            return Intent::Unknown;
        };
        let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        // A longer trigger only wins if its body still holds a place pair:
        // "ov brussel naar gent" falls back to plain "ov".
        let triggers = matching_triggers(&lowered);
        if let Some(longest) = triggers.first() {
            let attempt = |trigger: &TransitTrigger| {
                parse_transit(trigger, &words[trigger.words.len()..].join(" "), now)
            };
            return triggers
                .iter()
                .map(|trigger| attempt(*trigger))
                .find(|intent| matches!(intent, Intent::Directions(_)))
                .unwrap_or_else(|| attempt(*longest));
        }

        // `text` starts with `first`, so this slice is on a char boundary.
        let body = text[first.len()..].trim();

        let intent = match lowered[0].as_str() {
            "gpt" => free_text(Command::Completion, body, |prompt| Intent::Completion { prompt }),
            "janee" => free_text(Command::YesNo, body, |question| Intent::YesNo { question }),
            "vertaling" => parse_translation(body),
            "trein" => self.parse_train(body, now),
            "bus" => parse_stops(Command::Bus, Provider::RegionalBus, body, now),
            "tram" | "metro" => parse_stops(Command::CityTransit, Provider::CityTransit, body, now),
            "route" => parse_walk(body, now),
            "weer" => free_text(Command::Weather, body, |city| Intent::Weather { city }),
            "nieuws" => Intent::News,
            "apotheker" | "apotheek" => {
                free_text(Command::Pharmacy, body, |postcode| Intent::Pharmacy { postcode })
            }
            _ => Intent::Unknown,
        };

        debug!(verb = %lowered[0], ?intent, "Parsed message");
        intent
    }

    /// `trein <from> [naar] <to> [time]`, places resolved against the
    /// station index.
    fn parse_train(&self, body: &str, now: NaiveDateTime) -> Intent {
        if body.is_empty() {
            return help(Command::Train, None);
        }

        let tokens: Vec<&str> = body.split_whitespace().collect();
        let start = skip_word(&tokens, 0, &["van"]);

        let Some(departure) = match_entity(&tokens, start, &self.stations).matched() else {
            return help(Command::Train, Some(body));
        };
        let next = skip_word(&tokens, departure.end, SEPARATOR_WORDS);
        let Some(arrival) = match_entity(&tokens, next, &self.stations).matched() else {
            return help(Command::Train, Some(body));
        };

        let rest = tokens[arrival.end..].join(" ");
        let clock = parse_clock(&rest).ok();

        Intent::Train(TrainQuery {
            departure: departure.name.display.clone(),
            arrival: arrival.name.display.clone(),
            time: at_clock(now, clock),
        })
    }
}

fn help(command: Command, hint: Option<&str>) -> Intent {
    Intent::Help {
        command,
        hint: hint.map(str::to_string),
    }
}

fn free_text(command: Command, body: &str, build: impl FnOnce(String) -> Intent) -> Intent {
    if body.is_empty() {
        help(command, None)
    } else {
        build(body.to_string())
    }
}

/// Advance past one optional filler word.
fn skip_word(tokens: &[&str], at: usize, words: &[&str]) -> usize {
    match tokens.get(at) {
        Some(token) if words.contains(&token.to_lowercase().as_str()) => at + 1,
        _ => at,
    }
}

fn parse_translation(body: &str) -> Intent {
    if body.is_empty() {
        return help(Command::Translate, None);
    }
    match body.split_once(char::is_whitespace) {
        Some((lang, text)) if !text.trim().is_empty() => Intent::Translate {
            lang: lang.to_lowercase(),
            text: text.trim().to_string(),
        },
        _ => help(Command::Translate, Some(body)),
    }
}

/// `bus [van] <stop> naar <stop> [time]`, or `bus <stop>` for a board.
fn parse_stops(command: Command, provider: Provider, body: &str, now: NaiveDateTime) -> Intent {
    if body.is_empty() {
        return help(command, None);
    }

    let Some((from, to)) = split_place_pair(body) else {
        if SEPARATOR_WORDS
            .iter()
            .any(|sep| body.to_lowercase().split_whitespace().any(|w| w == *sep))
        {
            return help(command, Some(body));
        }
        return Intent::Stops {
            provider,
            query: StopQuery::Board {
                stop: strip_van(body).to_string(),
            },
        };
    };

    let from = strip_van(&from);
    let (to, clock) = split_time_suffix(&to);
    if from.is_empty() || to.is_empty() {
        return help(command, Some(body));
    }

    Intent::Stops {
        provider,
        query: StopQuery::Route {
            from: from.to_string(),
            to,
            after: at_clock(now, clock),
        },
    }
}

fn strip_van(from: &str) -> &str {
    match from.split_once(char::is_whitespace) {
        Some((van, rest)) if van.eq_ignore_ascii_case("van") => rest.trim(),
        _ => from,
    }
}

fn parse_walk(body: &str, now: NaiveDateTime) -> Intent {
    if body.is_empty() {
        return help(Command::Walk, None);
    }
    let Some((origin, destination)) = split_place_pair(body) else {
        return help(Command::Walk, Some(body));
    };
    Intent::Directions(DirectionsQuery {
        origin,
        destination,
        mode: TravelMode::Walking,
        language: Language::Dutch,
        departure: truncate_to_minute(now),
    })
}

fn parse_transit(trigger: &TransitTrigger, body: &str, now: NaiveDateTime) -> Intent {
    if body.is_empty() {
        return help(Command::Transit, None);
    }
    let Some((origin, destination)) = split_place_pair(body) else {
        return help(Command::Transit, Some(body));
    };
    let (destination, clock) = split_time_suffix(&destination);
    if destination.is_empty() {
        return help(Command::Transit, Some(body));
    }

    let locality = trigger.locality.unwrap_or_default();
    Intent::Directions(DirectionsQuery {
        origin: format!("{origin}{locality}"),
        destination: format!("{destination}{locality}"),
        mode: TravelMode::Transit {
            modes: trigger.modes.to_vec(),
            max_routes: trigger.max_routes,
        },
        language: trigger.language,
        departure: at_clock(now, clock),
    })
}
