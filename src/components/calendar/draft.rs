use super::models::{CalendarEvent, EventColor, EventPatch, NewCalendarEvent};
use crate::error::{validation_error, CalResult};
use chrono::{DateTime, Utc};

/// Event form contents before submission
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub color: EventColor,
    pub label: Option<String>,
    pub location: Option<String>,
}

impl EventDraft {
    /// Empty form starting at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            title: String::new(),
            description: None,
            start,
            end: None,
            all_day: false,
            color: EventColor::default(),
            label: None,
            location: None,
        }
    }

    /// Form prefilled from an existing event, for editing
    pub fn from_event(event: &CalendarEvent) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            start: event.start,
            end: event.end,
            all_day: event.all_day,
            color: event.color,
            label: event.label.clone(),
            location: event.location.clone(),
        }
    }

    /// Check the draft against the form rules
    pub fn validate(&self) -> CalResult<()> {
        if self.title.trim().is_empty() {
            return Err(validation_error("Title is required"));
        }
        if let Some(end) = self.end {
            if end < self.start {
                return Err(validation_error("End time must not be before start time"));
            }
        }
        Ok(())
    }

    /// Validate and convert into a create payload
    pub fn into_new_event(self) -> CalResult<NewCalendarEvent> {
        self.validate()?;
        Ok(NewCalendarEvent {
            title: self.title.trim().to_string(),
            description: non_blank(self.description),
            start: self.start,
            end: self.end,
            all_day: self.all_day,
            color: self.color,
            label: non_blank(self.label),
            location: non_blank(self.location),
        })
    }

    /// Validate and convert into a full replacement patch for an edited event
    pub fn into_patch(self) -> CalResult<EventPatch> {
        let event = self.into_new_event()?;
        Ok(EventPatch {
            title: Some(event.title),
            description: Some(event.description),
            start: Some(event.start),
            end: Some(event.end),
            all_day: Some(event.all_day),
            color: Some(event.color),
            label: event.label,
            location: event.location,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
