//! Capabilities the layout engine consumes from the compositor.
//!
//! The engine never owns a surface. It addresses surfaces through a
//! [`SurfaceId`] handed out by the host and routes every side effect
//! (resizes, state flags, damage) through [`SurfaceHost`].

use serde::{Deserialize, Serialize};

use crate::sys::geometry::{Rect, Size};

/// Opaque handle for a client surface, assigned by the host.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

pub trait SurfaceHost {
    /// Visible content geometry in surface-local coordinates. The origin is the
    /// inset between the outer surface and its content (client side
    /// decorations, shadows).
    fn desktop_geometry(&self, surface: SurfaceId) -> Rect;

    fn set_size(&mut self, surface: SurfaceId, size: Size);

    fn is_maximized(&self, surface: SurfaceId) -> bool;
    fn set_maximized(&mut self, surface: SurfaceId, maximized: bool);

    fn is_fullscreen(&self, surface: SurfaceId) -> bool;
    fn set_fullscreen(&mut self, surface: SurfaceId, fullscreen: bool);

    /// The surface moved or changed size; fire and forget.
    fn geometry_dirty(&mut self, surface: SurfaceId);

    /// Damage the surface and whatever is below it; fire and forget.
    fn schedule_repaint(&mut self, surface: SurfaceId);

    /// Asks the client to go away. Called when a workspace is torn down with
    /// views still on it.
    fn destroy_surface(&mut self, surface: SurfaceId);
}
