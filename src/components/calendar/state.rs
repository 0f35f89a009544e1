use super::models::CalendarEvent;
use crate::utils::time::{add_days, add_months, add_weeks, start_of_week};
use chrono::{NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

/// Granularity of the calendar view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
}

impl fmt::Display for CalendarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarView::Month => write!(f, "month"),
            CalendarView::Week => write!(f, "week"),
            CalendarView::Day => write!(f, "day"),
        }
    }
}

impl FromStr for CalendarView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(CalendarView::Month),
            "week" => Ok(CalendarView::Week),
            "day" => Ok(CalendarView::Day),
            other => Err(format!("Unknown view: {}", other)),
        }
    }
}

/// Navigation and form state of the calendar screen.
///
/// Lives in memory only; nothing here is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Month shown by the month view
    pub current_date: NaiveDate,
    pub selected_date: NaiveDate,
    pub selected_event: Option<CalendarEvent>,
    pub form_open: bool,
    pub editing: bool,
    pub view: CalendarView,
    /// First day of the week shown by the week view
    pub current_week: NaiveDate,
    /// Day shown by the day view
    pub current_day: NaiveDate,
    week_start: Weekday,
}

impl ViewState {
    /// Fresh state anchored on `today`
    pub fn new(today: NaiveDate, week_start: Weekday) -> Self {
        Self {
            current_date: today,
            selected_date: today,
            selected_event: None,
            form_open: false,
            editing: false,
            view: CalendarView::Month,
            current_week: start_of_week(today, week_start),
            current_day: today,
            week_start,
        }
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn next_month(&mut self) {
        self.current_date = add_months(self.current_date, 1);
    }

    pub fn prev_month(&mut self) {
        self.current_date = add_months(self.current_date, -1);
    }

    pub fn next_week(&mut self) {
        self.current_week = add_weeks(self.current_week, 1);
    }

    pub fn prev_week(&mut self) {
        self.current_week = add_weeks(self.current_week, -1);
    }

    /// Move the day view forward; the selection follows
    pub fn next_day(&mut self) {
        self.set_current_day(add_days(self.current_day, 1));
    }

    pub fn prev_day(&mut self) {
        self.set_current_day(add_days(self.current_day, -1));
    }

    /// Step the active view by `steps` periods, negative going back.
    /// Months move in one jump, so the day clamps once against the target month.
    pub fn navigate(&mut self, steps: i32) {
        match self.view {
            CalendarView::Month => self.current_date = add_months(self.current_date, steps),
            CalendarView::Week => self.current_week = add_weeks(self.current_week, steps.into()),
            CalendarView::Day => self.set_current_day(add_days(self.current_day, steps.into())),
        }
    }

    /// Select a date; the day view jumps to it
    pub fn set_selected_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.current_day = date;
    }

    pub fn set_selected_event(&mut self, event: Option<CalendarEvent>) {
        self.selected_event = event;
    }

    pub fn open_form(&mut self, editing: bool) {
        self.form_open = true;
        self.editing = editing;
    }

    /// Close the form and drop the selected event
    pub fn close_form(&mut self) {
        self.form_open = false;
        self.selected_event = None;
    }

    pub fn set_view(&mut self, view: CalendarView) {
        self.view = view;
    }

    /// Show the week containing `date`
    pub fn set_current_week(&mut self, date: NaiveDate) {
        self.current_week = start_of_week(date, self.week_start);
    }

    pub fn set_current_day(&mut self, date: NaiveDate) {
        self.current_day = date;
        self.selected_date = date;
    }

    /// Point every view at `date`
    pub fn jump_to(&mut self, date: NaiveDate) {
        self.current_date = date;
        self.set_current_week(date);
        self.set_current_day(date);
    }
}
