use super::render::{day_view, month_view, week_view};
use super::{AppContext, NavArgs};
use kalenteri::components::calendar::{CalendarEvent, CalendarView};
use kalenteri::error::CalResult;
use kalenteri::utils::time::month_days;

/// Position the view state the way `nav` asks
fn navigate(ctx: &mut AppContext, view: CalendarView, nav: &NavArgs) {
    ctx.view.set_view(view);
    if let Some(date) = nav.date {
        ctx.view.jump_to(date);
    }
    ctx.view.navigate(nav.offset);
}

/// Load events for a view; only signed-in users get one
async fn load_events(ctx: &AppContext) -> CalResult<Vec<CalendarEvent>> {
    ctx.require_session()?;
    let query = ctx.events();
    let events = query.events().await?;
    query.shutdown().await?;
    ctx.ensure_still_signed_in()?;
    Ok(events.as_ref().clone())
}

pub async fn month(ctx: &mut AppContext, nav: NavArgs) -> CalResult<()> {
    let events = load_events(ctx).await?;
    navigate(ctx, CalendarView::Month, &nav);

    let anchor = ctx.view.current_date;
    let days = month_days(anchor, ctx.view.week_start());
    print!(
        "{}",
        month_view(&events, anchor, &days, ctx.config.timezone.today(), &ctx.config.timezone)
    );
    Ok(())
}

pub async fn week(ctx: &mut AppContext, nav: NavArgs) -> CalResult<()> {
    let events = load_events(ctx).await?;
    navigate(ctx, CalendarView::Week, &nav);

    print!(
        "{}",
        week_view(
            &events,
            ctx.view.current_week,
            ctx.view.week_start(),
            ctx.config.timezone.today(),
            &ctx.config.timezone
        )
    );
    Ok(())
}

pub async fn day(ctx: &mut AppContext, nav: NavArgs) -> CalResult<()> {
    let events = load_events(ctx).await?;
    navigate(ctx, CalendarView::Day, &nav);

    print!(
        "{}",
        day_view(
            &events,
            ctx.view.current_day,
            ctx.config.timezone.today(),
            &ctx.config.timezone
        )
    );
    Ok(())
}
