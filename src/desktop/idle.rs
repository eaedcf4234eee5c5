//! Deferred retiling on the compositor event loop.
//!
//! Panel updates tend to arrive in bursts (a panel maps, then reports its
//! height, then moves). The desktop only records them; the retile runs once
//! the loop goes idle.

use calloop::{Idle, LoopHandle};
use tracing::{debug, warn};

use super::Desktop;
use crate::layout_engine::WorkspaceError;
use crate::model::output::{OutputId, PanelPosition};
use crate::sys::surface::SurfaceHost;

pub fn schedule_area_flush<'l, H: SurfaceHost + 'l>(
    handle: &LoopHandle<'l, Desktop<H>>,
) -> Idle<'l> {
    handle.insert_idle(|desktop| match desktop.flush_pending_areas() {
        Ok(count) => debug!(outputs = count, "retiled after available space change"),
        Err(err) => warn!(%err, "retiling after available space change failed"),
    })
}

/// Drops a scheduled flush. Queued areas stay pending and the next change
/// schedules a fresh flush.
pub fn cancel_area_flush<H: SurfaceHost>(desktop: &mut Desktop<H>, idle: Idle<'_>) {
    idle.cancel();
    desktop.area_flush_cancelled();
}

/// Records a panel height and schedules the retile if none is queued yet.
pub fn set_panel_height<'l, H: SurfaceHost + 'l>(
    desktop: &mut Desktop<H>,
    handle: &LoopHandle<'l, Desktop<H>>,
    output: OutputId,
    height: i32,
) -> Result<Option<Idle<'l>>, WorkspaceError> {
    let schedule = desktop.set_panel_height(output, height)?;
    Ok(schedule.then(|| schedule_area_flush(handle)))
}

pub fn set_panel_position<'l, H: SurfaceHost + 'l>(
    desktop: &mut Desktop<H>,
    handle: &LoopHandle<'l, Desktop<H>>,
    position: PanelPosition,
) -> Option<Idle<'l>> {
    desktop.set_panel_position(position).then(|| schedule_area_flush(handle))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use calloop::EventLoop;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::config::Config;
    use crate::sys::geometry::{Point, Rect, Size};
    use crate::sys::headless::HeadlessHost;

    #[test_log::test]
    fn test_burst_is_flushed_once_idle() {
        let mut event_loop: EventLoop<Desktop<HeadlessHost>> = EventLoop::try_new().unwrap();
        let handle = event_loop.handle();
        let mut desktop = Desktop::new(Config::default(), HeadlessHost::new());
        let out = desktop.add_output("DP-1", Rect::new(0, 0, 1280, 720)).unwrap();
        let surface = desktop.host_mut().create_surface(Point::default(), Size::new(200, 100));
        let view = desktop.create_view(surface, None, false).unwrap();
        desktop.map_view(view, None).unwrap();

        assert!(set_panel_height(&mut desktop, &handle, out, 20).unwrap().is_some());
        assert!(set_panel_height(&mut desktop, &handle, out, 28).unwrap().is_none());
        assert!(set_panel_position(&mut desktop, &handle, PanelPosition::Bottom).is_none());
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(0, 0, 1280, 720));

        event_loop.dispatch(Some(Duration::ZERO), &mut desktop).unwrap();
        assert!(!desktop.has_pending_areas());
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(0, 0, 1280, 692));
    }

    #[test]
    fn test_cancelled_flush_is_rescheduled() {
        let mut event_loop: EventLoop<Desktop<HeadlessHost>> = EventLoop::try_new().unwrap();
        let handle = event_loop.handle();
        let mut desktop = Desktop::new(Config::default(), HeadlessHost::new());
        let out = desktop.add_output("DP-1", Rect::new(0, 0, 1280, 720)).unwrap();
        let surface = desktop.host_mut().create_surface(Point::default(), Size::new(200, 100));
        let view = desktop.create_view(surface, None, false).unwrap();
        desktop.map_view(view, None).unwrap();

        let idle = set_panel_height(&mut desktop, &handle, out, 20).unwrap().unwrap();
        cancel_area_flush(&mut desktop, idle);
        event_loop.dispatch(Some(Duration::ZERO), &mut desktop).unwrap();
        assert!(desktop.has_pending_areas());

        assert!(set_panel_height(&mut desktop, &handle, out, 24).unwrap().is_some());
        event_loop.dispatch(Some(Duration::ZERO), &mut desktop).unwrap();
        assert!(!desktop.has_pending_areas());
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(0, 24, 1280, 696));
    }
}
