//! Clock-time handling for commands and provider timestamps.
//!
//! Users type times in several loose forms ("9", "9:05", "9.05", "0905").
//! Providers report local timestamps without an offset. Everything is kept as
//! naive local time; the reference "now" is supplied by the caller.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

/// Error returned when parsing an invalid clock time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a user-supplied clock time.
///
/// Accepted forms: `H`, `HH`, `H:MM`, `HH:MM`, `H.MM`, `HH.MM`, and the
/// compact `HMM` / `HHMM`.
///
/// # Examples
///
/// ```
/// use transit_sms::domain::parse_clock;
/// use chrono::NaiveTime;
///
/// let t = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
/// assert_eq!(parse_clock("14:30"), Ok(t));
/// assert_eq!(parse_clock("14.30"), Ok(t));
/// assert_eq!(parse_clock("1430"), Ok(t));
/// assert_eq!(parse_clock("9"), Ok(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
///
/// assert!(parse_clock("25:00").is_err());
/// assert!(parse_clock("14:3").is_err());
/// assert!(parse_clock("spoor").is_err());
/// ```
pub fn parse_clock(s: &str) -> Result<NaiveTime, TimeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TimeError::new("empty time"));
    }

    let (hour, minute) = if let Some((h, m)) = s.split_once([':', '.']) {
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(TimeError::new("expected H:MM or H.MM"));
        }
        let hour = parse_digits(h).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_digits(m).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        (hour, minute)
    } else {
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeError::new("expected digits"));
        }
        match s.len() {
            1 | 2 => (parse_digits(s).unwrap_or(u32::MAX), 0),
            3 | 4 => {
                let split = s.len() - 2;
                (
                    parse_digits(&s[..split]).unwrap_or(u32::MAX),
                    parse_digits(&s[split..]).unwrap_or(u32::MAX),
                )
            }
            _ => return Err(TimeError::new("expected H, HH, HMM or HHMM")),
        }
    };

    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| TimeError::new("invalid time"))
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Whether a token looks like a bare clock time: 1-2 digits, optionally
/// followed by `:MM`.
///
/// This is deliberately narrower than [`parse_clock`]; it is the rule that
/// ends a place-name scan.
pub fn is_clock_token(token: &str) -> bool {
    let (hour, minute) = match token.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (token, None),
    };

    let hour_ok = (1..=2).contains(&hour.len()) && hour.bytes().all(|b| b.is_ascii_digit());
    let minute_ok = minute.is_none_or(|m| m.len() == 2 && m.bytes().all(|b| b.is_ascii_digit()));

    hour_ok && minute_ok
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

/// Resolve an optional clock time against the reference moment.
///
/// The clock time is placed on the same day as `now`; with no clock time the
/// result is `now` truncated to the minute.
pub fn at_clock(now: NaiveDateTime, clock: Option<NaiveTime>) -> NaiveDateTime {
    match clock {
        Some(t) => now.date().and_time(t),
        None => truncate_to_minute(now),
    }
}

/// Parse a provider timestamp such as `2024-02-27T16:30:00` or
/// `2024-02-27T16:30:00+01:00`.
///
/// Any offset suffix is ignored: providers report local wall-clock time.
pub fn parse_local_timestamp(ts: &str) -> Option<NaiveDateTime> {
    let ts = ts.trim();
    if let Some(head) = ts.get(..19)
        && let Ok(dt) = NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
    {
        return Some(dt);
    }
    ts.get(..16)
        .and_then(|head| NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M").ok())
}

/// Format a time as `HH:MM`.
pub fn hhmm(dt: NaiveDateTime) -> String {
    dt.format("%H:%M").to_string()
}

/// Render a delay in minutes as a reply suffix: empty when on time,
/// otherwise ` +N'` or ` -N'`.
pub fn delay_suffix(minutes: i64) -> String {
    if minutes == 0 {
        String::new()
    } else {
        format!(" {minutes:+}'")
    }
}
