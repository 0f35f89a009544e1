use super::render::{event_details, event_line};
use super::{AppContext, CreateArgs, UpdateArgs};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use kalenteri::components::calendar::{CalendarEvent, EventDraft};
use kalenteri::components::EventsQueryHandle;
use kalenteri::error::{validation_error, CalResult};
use kalenteri::utils::time::CalendarZone;

/// Parse a date or date-time typed on the command line.
///
/// Values with an offset are taken as is; anything else is wall-clock time
/// in `zone`, and a bare date means the start of that day.
pub fn parse_cli_datetime(input: &str, zone: &CalendarZone) -> CalResult<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return zone.resolve(&naive).ok_or_else(|| {
                validation_error(&format!("{} does not exist in {}", input, zone))
            });
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(zone.start_of_day(date));
    }
    Err(validation_error(&format!(
        "Invalid date/time '{}'. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM",
        input
    )))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Build a create draft from command line arguments
pub fn draft_from_args(args: CreateArgs, zone: &CalendarZone) -> CalResult<EventDraft> {
    let mut draft = EventDraft::new(parse_cli_datetime(&args.start, zone)?);
    draft.title = args.title;
    draft.end = args
        .end
        .as_deref()
        .map(|end| parse_cli_datetime(end, zone))
        .transpose()?;
    draft.all_day = args.all_day;
    draft.color = args.color;
    draft.description = non_empty(args.description);
    draft.label = non_empty(args.label);
    draft.location = non_empty(args.location);
    Ok(draft)
}

/// Apply command line changes on top of an existing event's form
pub fn apply_update(mut draft: EventDraft, args: UpdateArgs, zone: &CalendarZone) -> CalResult<EventDraft> {
    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(start) = args.start {
        draft.start = parse_cli_datetime(&start, zone)?;
    }
    if args.clear_end {
        draft.end = None;
    } else if let Some(end) = args.end {
        draft.end = Some(parse_cli_datetime(&end, zone)?);
    }
    if let Some(all_day) = args.all_day {
        draft.all_day = all_day;
    }
    if let Some(color) = args.color {
        draft.color = color;
    }
    if args.clear_description {
        draft.description = None;
    } else if let Some(description) = args.description {
        draft.description = non_empty(Some(description));
    }
    if let Some(label) = args.label {
        draft.label = Some(replacement("Label", label)?);
    }
    if let Some(location) = args.location {
        draft.location = Some(replacement("Location", location)?);
    }
    Ok(draft)
}

// A blank value would be dropped from the patch and the server would keep the old one
fn replacement(field: &str, value: String) -> CalResult<String> {
    if value.trim().is_empty() {
        return Err(validation_error(&format!(
            "{} cannot be cleared, only replaced",
            field
        )));
    }
    Ok(value)
}

pub async fn list(ctx: &AppContext) -> CalResult<()> {
    ctx.require_session()?;
    let query = ctx.events();
    let events = query.events().await?;
    query.shutdown().await?;
    ctx.ensure_still_signed_in()?;

    if events.is_empty() {
        println!("No events");
    }
    for event in events.iter() {
        println!(
            "{}  {}",
            event.start_date(&ctx.config.timezone),
            event_line(event, &ctx.config.timezone)
        );
    }
    Ok(())
}

pub async fn create(ctx: &AppContext, args: CreateArgs) -> CalResult<()> {
    ctx.require_session()?;
    let draft = draft_from_args(args, &ctx.config.timezone)?;

    let query = ctx.events();
    let result = query.create_event(draft).await;
    query.shutdown().await?;

    let created = result?;
    print!("Created {}", event_details(&created, &ctx.config.timezone));
    Ok(())
}

pub async fn update(ctx: &AppContext, args: UpdateArgs) -> CalResult<()> {
    ctx.require_session()?;
    let query = ctx.events();
    let result = update_with(&query, ctx, args).await;
    query.shutdown().await?;

    let updated = result?;
    print!("Updated {}", event_details(&updated, &ctx.config.timezone));
    Ok(())
}

async fn update_with(
    query: &EventsQueryHandle,
    ctx: &AppContext,
    args: UpdateArgs,
) -> CalResult<CalendarEvent> {
    let id = args.id;
    let events = query.events().await?;
    ctx.ensure_still_signed_in()?;
    let existing = events
        .iter()
        .find(|event| event.id == id)
        .ok_or_else(|| validation_error(&format!("No event with id {}", id)))?;

    let draft = apply_update(EventDraft::from_event(existing), args, &ctx.config.timezone)?;
    let patch = draft.into_patch()?;
    query.update_event(id, &patch).await
}

pub async fn delete(ctx: &AppContext, id: u64) -> CalResult<()> {
    ctx.require_session()?;
    let query = ctx.events();
    let result = query.delete_event(id).await;
    query.shutdown().await?;

    result?;
    println!("Deleted event #{}", id);
    Ok(())
}
