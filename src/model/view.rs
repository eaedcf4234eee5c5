use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::model::layer::LayerKind;
use crate::model::output::OutputId;
use crate::sys::geometry::{Point, Rect};
use crate::sys::surface::SurfaceId;

new_key_type! {
    pub struct ViewId;
}

pub type ViewMap = SlotMap<ViewId, View>;

/// Which strategy places a view when it sits in a layouted layer.
#[derive(
    Serialize,
    Deserialize,
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::IntoStaticStr,
    strum::EnumString
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayoutType {
    #[default]
    Tiling,
    Floating,
}

impl LayoutType {
    pub fn toggled(self) -> Self {
        match self {
            LayoutType::Tiling => LayoutType::Floating,
            LayoutType::Floating => LayoutType::Tiling,
        }
    }

    pub fn layer(self) -> LayerKind {
        match self {
            LayoutType::Tiling => LayerKind::Tiling,
            LayoutType::Floating => LayerKind::Floating,
        }
    }

    pub fn name(self) -> &'static str { self.into() }
}

/// Per-view bookkeeping that survives layer transitions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecentView {
    pub layout_type: LayoutType,
    /// Last geometry applied to the content, origin in surface-local
    /// coordinates (the content inset), size in pixels.
    pub visible_geometry: Rect,
    /// Global content geometry to restore after un-maximizing or leaving
    /// fullscreen.
    pub saved_geometry: Option<Rect>,
    /// Global content geometry the view was maximized to, while it is.
    #[serde(default)]
    pub maximized_geometry: Option<Rect>,
    pub is_external_origin: bool,
}

impl RecentView {
    pub fn new(layout_type: LayoutType, visible_geometry: Rect, is_external_origin: bool) -> Self {
        Self {
            layout_type,
            visible_geometry,
            saved_geometry: None,
            maximized_geometry: None,
            is_external_origin,
        }
    }

    pub fn content_offset(&self) -> Point { self.visible_geometry.origin }
}

/// Where a view currently sits. A single field on the view keeps it from
/// being in two layers at once.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub workspace: usize,
    pub layer: LayerKind,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct View {
    pub surface: SurfaceId,
    pub output: Option<OutputId>,
    /// Global position of the outer surface.
    pub position: Point,
    pub is_external_origin: bool,
    pub(crate) placement: Option<Placement>,
    pub(crate) recent: Option<RecentView>,
}

impl View {
    pub fn new(surface: SurfaceId, output: Option<OutputId>) -> Self {
        Self {
            surface,
            output,
            position: Point::default(),
            is_external_origin: false,
            placement: None,
            recent: None,
        }
    }

    pub fn external(mut self) -> Self {
        self.is_external_origin = true;
        self
    }

    pub fn placement(&self) -> Option<Placement> { self.placement }

    pub fn recent(&self) -> Option<&RecentView> { self.recent.as_ref() }

    /// Global geometry of the visible content.
    pub fn geometry(&self) -> Rect {
        match &self.recent {
            Some(rv) => Rect::from_parts(self.position + rv.content_offset(), rv.visible_geometry.size),
            None => Rect::from_parts(self.position, Default::default()),
        }
    }
}
