//! An in-memory [`SurfaceHost`] that acknowledges every request immediately.
//!
//! Used by the script replayer and by tests.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::common::collections::HashMap;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::surface::{SurfaceHost, SurfaceId};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct HeadlessSurface {
    pub geometry: Rect,
    pub maximized: bool,
    pub fullscreen: bool,
    pub dirty: u32,
    pub repaints: u32,
    pub destroyed: bool,
}

#[derive(Debug, Default)]
pub struct HeadlessHost {
    surfaces: HashMap<SurfaceId, HeadlessSurface>,
    next_id: u64,
}

impl HeadlessHost {
    pub fn new() -> Self { Self::default() }

    /// Registers a surface whose content sits at `inset` inside the outer
    /// surface and is `size` large.
    pub fn create_surface(&mut self, inset: Point, size: Size) -> SurfaceId {
        self.next_id += 1;
        let id = SurfaceId(self.next_id);
        self.surfaces.insert(id, HeadlessSurface {
            geometry: Rect::from_parts(inset, size),
            ..Default::default()
        });
        id
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&HeadlessSurface> { self.surfaces.get(&id) }

    fn entry(&mut self, id: SurfaceId) -> &mut HeadlessSurface {
        self.surfaces.entry(id).or_default()
    }
}

impl SurfaceHost for HeadlessHost {
    fn desktop_geometry(&self, surface: SurfaceId) -> Rect {
        self.surfaces.get(&surface).map(|s| s.geometry).unwrap_or_default()
    }

    fn set_size(&mut self, surface: SurfaceId, size: Size) {
        trace!(%surface, ?size, "configure");
        self.entry(surface).geometry.size = size;
    }

    fn is_maximized(&self, surface: SurfaceId) -> bool {
        self.surfaces.get(&surface).is_some_and(|s| s.maximized)
    }

    fn set_maximized(&mut self, surface: SurfaceId, maximized: bool) {
        self.entry(surface).maximized = maximized;
    }

    fn is_fullscreen(&self, surface: SurfaceId) -> bool {
        self.surfaces.get(&surface).is_some_and(|s| s.fullscreen)
    }

    fn set_fullscreen(&mut self, surface: SurfaceId, fullscreen: bool) {
        self.entry(surface).fullscreen = fullscreen;
    }

    fn geometry_dirty(&mut self, surface: SurfaceId) { self.entry(surface).dirty += 1; }

    fn schedule_repaint(&mut self, surface: SurfaceId) { self.entry(surface).repaints += 1; }

    fn destroy_surface(&mut self, surface: SurfaceId) { self.entry(surface).destroyed = true; }
}
