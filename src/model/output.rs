use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::sys::geometry::Rect;

new_key_type! {
    pub struct OutputId;
}

pub type OutputMap = SlotMap<OutputId, Output>;

#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PanelPosition {
    #[default]
    Top,
    Bottom,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Output {
    pub name: String,
    pub geometry: Rect,
    /// Height of the shell panel docked on this output, 0 if none.
    pub panel_height: i32,
}

impl Output {
    pub fn new(name: impl Into<String>, geometry: Rect) -> Self {
        Self {
            name: name.into(),
            geometry,
            panel_height: 0,
        }
    }

    /// The part of the output left for application windows once the panel
    /// has taken its strip.
    pub fn available_space(&self, panel: PanelPosition) -> Rect {
        let mut geo = self.geometry;
        let height = self.panel_height.clamp(0, geo.size.height);
        if panel == PanelPosition::Top {
            geo.origin.y += height;
        }
        geo.size.height -= height;
        geo
    }
}
