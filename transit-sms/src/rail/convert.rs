//! Conversion from wire records to rail connections.

use chrono::DateTime;

use super::connection::{RailConnection, RailEvent, RailVia};
use super::error::RailError;
use super::types::{ConnectionRecord, EventRecord, StationInfo};

/// Display name: the standard name when present, else the raw one.
fn station_name(info: Option<&StationInfo>, raw: &str) -> String {
    info.map(|i| i.standardname.trim())
        .filter(|n| !n.is_empty())
        .unwrap_or(raw)
        .to_string()
}

fn event(record: EventRecord, station: String) -> Result<RailEvent, RailError> {
    let time =
        DateTime::from_timestamp(record.time, 0).ok_or(RailError::InvalidTime(record.time))?;
    let platform = record
        .platforminfo
        .map(|p| p.name)
        .or(record.platform)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    Ok(RailEvent {
        station,
        time,
        delay_secs: record.delay,
        platform,
    })
}

impl TryFrom<ConnectionRecord> for RailConnection {
    type Error = RailError;

    fn try_from(record: ConnectionRecord) -> Result<Self, Self::Error> {
        let dep_name = station_name(
            record.departure.stationinfo.as_ref(),
            &record.departure.station,
        );
        let arr_name = station_name(record.arrival.stationinfo.as_ref(), &record.arrival.station);

        let vias = record
            .vias
            .filter(|v| v.number > 0)
            .and_then(|v| v.via)
            .map(|v| v.into_vec())
            .unwrap_or_default()
            .into_iter()
            .map(|via| -> Result<RailVia, RailError> {
                let name = station_name(via.stationinfo.as_ref(), &via.station);
                Ok(RailVia {
                    arrival: event(via.arrival, name.clone())?,
                    departure: event(via.departure, name)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RailConnection {
            departure: event(record.departure, dep_name)?,
            arrival: event(record.arrival, arr_name)?,
            vias,
        })
    }
}
