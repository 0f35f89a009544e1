//! Plain-text rendering of the calendar views.

use kalenteri::components::calendar::filter::{
    events_for_day, events_for_month, events_for_month_cell, events_for_week_cell,
};
use kalenteri::components::calendar::CalendarEvent;
use kalenteri::utils::time::{
    format_date, is_same_day, is_same_month, month_name, week_days, year, CalendarZone,
};
use chrono::NaiveDate;
use std::fmt::Write;

const CELL_WIDTH: usize = 6;

/// Time span of an event, e.g. `10:00-11:00` or `all day`
pub fn time_range(event: &CalendarEvent, zone: &CalendarZone) -> String {
    if event.all_day {
        return "all day".to_string();
    }
    let start = zone.time_of(&event.start).format("%H:%M");
    match event.end {
        Some(end) if zone.date_of(&end) != zone.date_of(&event.start) => format!(
            "{}-{} {}",
            start,
            format_date(zone.date_of(&end), "%b %d"),
            zone.time_of(&end).format("%H:%M")
        ),
        Some(end) => format!("{}-{}", start, zone.time_of(&end).format("%H:%M")),
        None => start.to_string(),
    }
}

/// One-line summary of an event
pub fn event_line(event: &CalendarEvent, zone: &CalendarZone) -> String {
    let mut line = format!(
        "#{:<4} {:<13} {} [{}]",
        event.id,
        time_range(event, zone),
        event.title,
        event.color
    );
    if let Some(label) = &event.label {
        let _ = write!(line, " ({})", label);
    }
    if let Some(location) = &event.location {
        let _ = write!(line, " @ {}", location);
    }
    line
}

/// Full details of a single event
pub fn event_details(event: &CalendarEvent, zone: &CalendarZone) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", event.id, event.title);
    let _ = writeln!(
        out,
        "  when:     {} {}",
        format_date(event.start_date(zone), "%a %Y-%m-%d"),
        time_range(event, zone)
    );
    let _ = writeln!(out, "  color:    {}", event.color);
    for (name, value) in [
        ("label", &event.label),
        ("location", &event.location),
        ("notes", &event.description),
    ] {
        if let Some(value) = value {
            let _ = writeln!(out, "  {:<9} {}", format!("{}:", name), value);
        }
    }
    out
}

fn weekday_header(days: &[NaiveDate]) -> String {
    days.iter()
        .map(|day| format!("{:<width$}", format_date(*day, "%a"), width = CELL_WIDTH))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// Month grid with event counts per cell, followed by the month's events
pub fn month_view(
    events: &[CalendarEvent],
    anchor: NaiveDate,
    days: &[NaiveDate],
    today: NaiveDate,
    zone: &CalendarZone,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", month_name(anchor), year(anchor));
    let _ = writeln!(out, "{}", weekday_header(&days[..days.len().min(7)]));

    for week in days.chunks(7) {
        let row: String = week
            .iter()
            .map(|day| {
                let mut cell = if is_same_month(*day, anchor) {
                    format_date(*day, "%e").trim_start().to_string()
                } else {
                    ".".to_string()
                };
                if is_same_day(*day, today) {
                    cell.push('!');
                }
                let count = events_for_month_cell(events, *day, zone).len();
                if count > 0 && is_same_month(*day, anchor) {
                    let _ = write!(cell, "*{}", count);
                }
                format!("{:<width$}", cell, width = CELL_WIDTH)
            })
            .collect();
        let _ = writeln!(out, "{}", row.trim_end());
    }

    let listed = events_for_month(events, anchor, zone);
    if listed.is_empty() {
        let _ = writeln!(out, "\nNo events this month");
    } else {
        let _ = writeln!(out);
        for event in listed {
            let _ = writeln!(
                out,
                "{}  {}",
                format_date(event.start_date(zone), "%b %d"),
                event_line(event, zone)
            );
        }
    }
    out
}

/// Seven day columns, listed one after another
pub fn week_view(
    events: &[CalendarEvent],
    first_day: NaiveDate,
    week_start: chrono::Weekday,
    today: NaiveDate,
    zone: &CalendarZone,
) -> String {
    let days = week_days(first_day, week_start);
    let mut out = String::new();
    if let (Some(first), Some(last)) = (days.first(), days.last()) {
        let _ = writeln!(
            out,
            "Week of {} - {}",
            format_date(*first, "%b %d"),
            format_date(*last, "%b %d, %Y")
        );
    }
    for day in &days {
        let marker = if is_same_day(*day, today) { " (today)" } else { "" };
        let _ = writeln!(out, "\n{}{}", format_date(*day, "%a %d"), marker);
        let cell = events_for_week_cell(events, *day, zone);
        if cell.is_empty() {
            let _ = writeln!(out, "  -");
        }
        for event in cell {
            let _ = writeln!(out, "  {}", event_line(event, zone));
        }
    }
    out
}

/// Events starting on one day, with details
pub fn day_view(events: &[CalendarEvent], day: NaiveDate, today: NaiveDate, zone: &CalendarZone) -> String {
    let mut out = String::new();
    let relative = match (day - today).num_days() {
        0 => " (today)",
        1 => " (tomorrow)",
        -1 => " (yesterday)",
        _ => "",
    };
    let _ = writeln!(out, "{}{}", format_date(day, "%A, %B %-d, %Y"), relative);

    let listed = events_for_day(events, day, zone);
    if listed.is_empty() {
        let _ = writeln!(out, "\nNo events");
    }
    for event in listed {
        let _ = write!(out, "\n{}", event_details(event, zone));
    }
    out
}
