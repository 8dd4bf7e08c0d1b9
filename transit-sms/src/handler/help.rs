//! Usage texts.

use crate::command::Command;

/// Reply to a message without a recognized command.
pub const UNKNOWN_REPLY: &str =
    "Onbekend commando. Gebruik: trein, bus, route, weer, apotheek, gpt, janee, nieuws, vertaling";

/// Usage text for `command`, echoing the unparsable body if there was one.
pub fn help_text(command: Command, hint: Option<&str>) -> String {
    let usage = match command {
        Command::Completion => {
            "Gebruik: gpt <vraag>\n\
             Stel een vraag aan de AI-assistent.\n\
             Voorbeeld: gpt wat is de hoofdstad van Spanje"
        }
        Command::YesNo => {
            "Gebruik: janee <vraag>\n\
             De AI-assistent antwoordt alleen met ja of nee.\n\
             Voorbeeld: janee is Brussel de hoofdstad van Belgie"
        }
        Command::Translate => {
            "Gebruik: vertaling <taal> <tekst>\n\
             Vertaalt tekst naar de opgegeven taal.\n\
             Taalcodes: en fr de es nl it pt pl tr ar zh ru\n\
             Voorbeeld: vertaling en fiets"
        }
        Command::Train => {
            "Gebruik: trein <van> <naar> [uur]\n\
             Zoek treinuren.\n\
             Voorbeeld: trein gent brussel 14:30\n\
             Uur weglaten = vertrekt nu"
        }
        Command::Bus => {
            "Gebruik: bus <halte> naar <halte> [uur]\nof bus <halte>\n\
             Voorbeeld: bus van aarschot station naar leuven station"
        }
        Command::CityTransit => {
            "Gebruik: tram <halte> naar <halte> [uur]\nof tram <halte>\n\
             Voorbeeld: tram flagey naar montgomery"
        }
        Command::Walk => {
            "Gebruik: route <van> naar <naar>\n\
             Geeft stap-voor-stap wandelroute.\n\
             Voorbeeld: route station leuven naar vaartkom"
        }
        Command::Transit => {
            "Gebruik: ov <van> naar <naar> [uur]\n\
             Ook: ov trein, ov bus, ov brussel, trajet\n\
             Voorbeeld: ov gent sint-pieters naar brugge markt"
        }
        Command::Weather => {
            "Gebruik: weer <stad>\n\
             Geeft weersvoorspelling voor de komende uren.\n\
             Voorbeeld: weer gent"
        }
        Command::News => "Gebruik: nieuws",
        Command::Pharmacy => {
            "Gebruik: apotheker <postcode>\n\
             Zoekt de wachtapotheek in jouw buurt.\n\
             Voorbeeld: apotheker 9790"
        }
    };

    match hint {
        Some(hint) if !hint.is_empty() => format!("{usage}\nJe vroeg: \"{hint}\""),
        _ => usage.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_help_echoes_hint() {
        let text = help_text(Command::Train, Some("atlantis gent"));
        assert!(text.starts_with("Gebruik: trein <van> <naar> [uur]\n"));
        assert!(text.ends_with("\nJe vroeg: \"atlantis gent\""));
    }

    #[test]
    fn help_without_hint() {
        assert_eq!(
            help_text(Command::Weather, None),
            "Gebruik: weer <stad>\nGeeft weersvoorspelling voor de komende uren.\nVoorbeeld: weer gent"
        );
    }
}
