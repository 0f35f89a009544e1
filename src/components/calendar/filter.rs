//! Selects the events each view shows.
//!
//! Every function keeps the fetched order; nothing here sorts.

use super::models::CalendarEvent;
use crate::utils::time::{end_of_week, is_same_day, is_same_month, start_of_week, CalendarZone};
use chrono::{NaiveDate, Weekday};

/// Events starting on `day`
pub fn events_for_day<'a>(
    events: &'a [CalendarEvent],
    day: NaiveDate,
    zone: &CalendarZone,
) -> Vec<&'a CalendarEvent> {
    events
        .iter()
        .filter(|event| is_same_day(event.start_date(zone), day))
        .collect()
}

/// Events visible anywhere in the week containing `anchor`: those starting
/// inside the week and multi-day events overlapping it
pub fn events_for_week<'a>(
    events: &'a [CalendarEvent],
    anchor: NaiveDate,
    week_start: Weekday,
    zone: &CalendarZone,
) -> Vec<&'a CalendarEvent> {
    let first = start_of_week(anchor, week_start);
    let last = end_of_week(anchor, week_start);
    events
        .iter()
        .filter(|event| {
            let start = event.start_date(zone);
            let end = event.end_date(zone);
            (first <= start && start <= last) || (start <= last && end >= first)
        })
        .collect()
}

/// Events in one column of the week grid
pub fn events_for_week_cell<'a>(
    events: &'a [CalendarEvent],
    day: NaiveDate,
    zone: &CalendarZone,
) -> Vec<&'a CalendarEvent> {
    events
        .iter()
        .filter(|event| is_same_day(event.start_date(zone), day) || event.spans(day, zone))
        .collect()
}

/// Events whose start falls in the month of `anchor`.
///
/// Only the start is considered, so an event running into this month from
/// the previous one is not listed.
pub fn events_for_month<'a>(
    events: &'a [CalendarEvent],
    anchor: NaiveDate,
    zone: &CalendarZone,
) -> Vec<&'a CalendarEvent> {
    events
        .iter()
        .filter(|event| is_same_month(event.start_date(zone), anchor))
        .collect()
}

/// Events in one cell of the month grid: starting or ending that day, or
/// all-day events covering it
pub fn events_for_month_cell<'a>(
    events: &'a [CalendarEvent],
    day: NaiveDate,
    zone: &CalendarZone,
) -> Vec<&'a CalendarEvent> {
    events
        .iter()
        .filter(|event| {
            is_same_day(event.start_date(zone), day)
                || event.end.is_some_and(|end| is_same_day(zone.date_of(&end), day))
                || (event.all_day && event.end.is_some() && event.spans(day, zone))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::calendar::models::EventColor;
    use chrono::{TimeZone, Utc};

    fn utc() -> CalendarZone {
        CalendarZone::parse("UTC").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: u64, start: (i32, u32, u32), end: Option<(i32, u32, u32)>, all_day: bool) -> CalendarEvent {
        CalendarEvent {
            id,
            title: format!("Event {}", id),
            description: None,
            start: Utc.with_ymd_and_hms(start.0, start.1, start.2, 9, 0, 0).unwrap(),
            end: end.map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()),
            all_day,
            color: EventColor::Blue,
            label: None,
            location: None,
        }
    }

    fn ids(events: Vec<&CalendarEvent>) -> Vec<u64> {
        events.into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_day_filter() {
        let events = vec![event(1, (2024, 3, 5), None, false)];
        assert_eq!(ids(events_for_day(&events, date(2024, 3, 5), &utc())), vec![1]);
        assert!(events_for_day(&events, date(2024, 3, 6), &utc()).is_empty());
    }

    #[test]
    fn test_day_filter_ignores_multi_day_span() {
        let events = vec![event(1, (2024, 3, 4), Some((2024, 3, 6)), true)];
        assert!(events_for_day(&events, date(2024, 3, 5), &utc()).is_empty());
    }

    #[test]
    fn test_week_filter() {
        let events = vec![
            event(1, (2024, 3, 5), None, false),
            // Starts the week before and runs into it
            event(2, (2024, 2, 28), Some((2024, 3, 4)), true),
            event(3, (2024, 3, 11), None, false),
            event(4, (2024, 2, 20), Some((2024, 2, 25)), false),
        ];
        // Week of Sunday 2024-03-03 .. Saturday 2024-03-09
        let visible = events_for_week(&events, date(2024, 3, 6), Weekday::Sun, &utc());
        assert_eq!(ids(visible), vec![1, 2]);
    }

    #[test]
    fn test_week_cell_filter() {
        let events = vec![
            event(1, (2024, 3, 5), None, false),
            event(2, (2024, 3, 4), Some((2024, 3, 6)), false),
        ];
        assert_eq!(ids(events_for_week_cell(&events, date(2024, 3, 5), &utc())), vec![1, 2]);
        assert_eq!(ids(events_for_week_cell(&events, date(2024, 3, 6), &utc())), vec![2]);
        assert!(events_for_week_cell(&events, date(2024, 3, 7), &utc()).is_empty());
    }

    #[test]
    fn test_month_filter_matches_start_month_only() {
        let events = vec![
            event(1, (2024, 3, 30), Some((2024, 4, 2)), true),
            event(2, (2024, 4, 10), None, false),
            event(3, (2023, 4, 10), None, false),
        ];
        assert_eq!(ids(events_for_month(&events, date(2024, 4, 1), &utc())), vec![2]);
        assert_eq!(ids(events_for_month(&events, date(2024, 3, 1), &utc())), vec![1]);
    }

    #[test]
    fn test_month_cell_filter() {
        let events = vec![
            event(1, (2024, 3, 4), Some((2024, 3, 6)), true),
            event(2, (2024, 3, 4), Some((2024, 3, 6)), false),
        ];
        // Middle of the span: only the all-day event covers it
        assert_eq!(ids(events_for_month_cell(&events, date(2024, 3, 5), &utc())), vec![1]);
        // The end day shows both
        assert_eq!(ids(events_for_month_cell(&events, date(2024, 3, 6), &utc())), vec![1, 2]);
    }

    #[test]
    fn test_filters_keep_fetch_order() {
        let events = vec![
            event(9, (2024, 3, 5), None, false),
            event(3, (2024, 3, 5), None, false),
            event(5, (2024, 3, 5), None, false),
        ];
        assert_eq!(ids(events_for_day(&events, date(2024, 3, 5), &utc())), vec![9, 3, 5]);
    }
}
