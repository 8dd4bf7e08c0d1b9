//! Ordering and deduplication of itinerary rows.

use std::collections::HashSet;

use crate::domain::ItineraryLine;

/// Sort rows by effective time, drop duplicates, keep the first `max_routes`.
///
/// Two rows are duplicates when they share a run key (minute and line) or
/// render to the same text. Among duplicates the earliest-listed row wins.
pub fn rank_rows(mut rows: Vec<ItineraryLine>, max_routes: usize) -> Vec<ItineraryLine> {
    rows.sort_by_key(|row| row.time);

    let mut seen_runs = HashSet::new();
    let mut seen_text = HashSet::new();
    let mut ranked = Vec::with_capacity(max_routes.min(rows.len()));

    for row in rows {
        if ranked.len() >= max_routes {
            break;
        }
        let text = row.to_string();
        if seen_runs.contains(&row.dedup_key()) || seen_text.contains(&text) {
            continue;
        }
        seen_runs.insert(row.dedup_key());
        seen_text.insert(text);
        ranked.push(row);
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn row(time: NaiveDateTime, origin: &str, line: &str) -> ItineraryLine {
        ItineraryLine {
            time,
            delay_minutes: 0,
            origin: origin.into(),
            line: line.into(),
            destination: "Leuven".into(),
            origin_platform: None,
            destination_platform: None,
        }
    }

    #[test]
    fn sorted_and_truncated() {
        let rows = vec![
            row(at(10, 40, 0), "A", "1"),
            row(at(10, 10, 0), "A", "2"),
            row(at(10, 30, 0), "A", "3"),
            row(at(10, 20, 0), "A", "4"),
            row(at(10, 50, 0), "A", "5"),
        ];
        let ranked = rank_rows(rows, 3);
        let lines: Vec<_> = ranked.iter().map(|r| r.line.as_str()).collect();
        assert_eq!(lines, ["2", "4", "3"]);
    }

    #[test]
    fn same_run_from_two_stops_collapses() {
        let rows = vec![
            row(at(10, 10, 5), "Platform A", "2"),
            row(at(10, 10, 50), "Platform B", "2"),
        ];
        let ranked = rank_rows(rows, 3);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].origin, "Platform A");
    }

    #[test]
    fn identical_text_collapses() {
        // Same clock time a day apart: different runs, same rendered row.
        let today = row(at(10, 10, 0), "A", "2");
        let tomorrow = row(at(10, 10, 0) + chrono::Duration::days(1), "A", "2");
        assert_ne!(today.dedup_key(), tomorrow.dedup_key());

        let ranked = rank_rows(vec![tomorrow, today], 3);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].time, at(10, 10, 0));
    }

    #[test]
    fn different_lines_same_minute_kept() {
        let rows = vec![row(at(10, 10, 0), "A", "2"), row(at(10, 10, 0), "A", "3")];
        assert_eq!(rank_rows(rows, 3).len(), 2);
    }

    #[test]
    fn zero_limit() {
        assert!(rank_rows(vec![row(at(10, 0, 0), "A", "1")], 0).is_empty());
    }
}
