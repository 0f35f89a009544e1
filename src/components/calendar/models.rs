use crate::utils::iso8601;
use crate::utils::time::CalendarZone;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed palette an event can be drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    #[default]
    Blue,
    Orange,
    Violet,
    Rose,
    Emerald,
}

impl EventColor {
    pub const ALL: [EventColor; 5] = [
        EventColor::Blue,
        EventColor::Orange,
        EventColor::Violet,
        EventColor::Rose,
        EventColor::Emerald,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventColor::Blue => "blue",
            EventColor::Orange => "orange",
            EventColor::Violet => "violet",
            EventColor::Rose => "rose",
            EventColor::Emerald => "emerald",
        }
    }
}

impl fmt::Display for EventColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventColor::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown color: {}", s))
    }
}

/// A calendar event as stored by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "iso8601")]
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso8601::option")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: EventColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CalendarEvent {
    /// Build an event from a create payload and an assigned id
    pub fn from_new(id: u64, event: NewCalendarEvent) -> Self {
        Self {
            id,
            title: event.title,
            description: event.description,
            start: event.start,
            end: event.end,
            all_day: event.all_day,
            color: event.color,
            label: event.label,
            location: event.location,
        }
    }

    /// End instant, or the start when the event has none
    pub fn end_or_start(&self) -> DateTime<Utc> {
        self.end.unwrap_or(self.start)
    }

    /// Calendar date the event starts on
    pub fn start_date(&self, zone: &CalendarZone) -> NaiveDate {
        zone.date_of(&self.start)
    }

    /// Calendar date the event ends on, the start date when it has no end
    pub fn end_date(&self, zone: &CalendarZone) -> NaiveDate {
        zone.date_of(&self.end_or_start())
    }

    /// Whether the event's inclusive date range covers `day`
    pub fn spans(&self, day: NaiveDate, zone: &CalendarZone) -> bool {
        self.start_date(zone) <= day && day <= self.end_date(zone)
    }
}

/// Payload for creating an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarEvent {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "iso8601")]
    pub start: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso8601::option")]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: EventColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Partial update of an event.
///
/// `None` leaves a field untouched; for `description` and `end`,
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "iso8601::option")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", with = "iso8601::patch")]
    pub end: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<EventColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl EventPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }
}
