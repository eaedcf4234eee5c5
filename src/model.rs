pub mod layer;
pub mod output;
pub mod view;

pub use layer::{Layer, LayerKind, LayerPosition};
pub use output::{Output, OutputId, OutputMap, PanelPosition};
pub use view::{LayoutType, Placement, RecentView, View, ViewId, ViewMap};
