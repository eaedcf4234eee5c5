use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::model::view::ViewId;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayerKind {
    Tiling,
    Floating,
    Hidden,
    Fullscreen,
}

impl LayerKind {
    pub const ALL: [LayerKind; 4] =
        [LayerKind::Tiling, LayerKind::Floating, LayerKind::Hidden, LayerKind::Fullscreen];

    pub(crate) fn index(self) -> usize {
        match self {
            LayerKind::Tiling => 0,
            LayerKind::Floating => 1,
            LayerKind::Hidden => 2,
            LayerKind::Fullscreen => 3,
        }
    }

    /// Layers run by a layout strategy.
    pub fn is_layouted(self) -> bool { matches!(self, LayerKind::Tiling | LayerKind::Floating) }

    /// The other layouted layer, the one a focus change demotes.
    pub fn sibling(self) -> Option<LayerKind> {
        match self {
            LayerKind::Tiling => Some(LayerKind::Floating),
            LayerKind::Floating => Some(LayerKind::Tiling),
            _ => None,
        }
    }
}

static_assertions::const_assert_eq!(LayerKind::ALL.len(), 4);

/// Stacking slot of a layer among every layer the compositor paints.
#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum LayerPosition {
    /// Not painted: the layer belongs to an inactive workspace or is hidden.
    #[default]
    Unset,
    Back,
    Front,
    /// Above every other desktop layer.
    Fullscreen,
}

/// An ordered z-band of views. Views are kept back to front, so the last view
/// is painted on top.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Layer {
    views: IndexSet<ViewId>,
    position: LayerPosition,
}

impl Layer {
    pub fn new() -> Self { Self::default() }

    pub fn position(&self) -> LayerPosition { self.position }

    pub fn set_position(&mut self, position: LayerPosition) { self.position = position; }

    pub fn unset_position(&mut self) { self.position = LayerPosition::Unset; }

    pub fn len(&self) -> usize { self.views.len() }

    pub fn is_empty(&self) -> bool { self.views.is_empty() }

    pub fn contains(&self, view: ViewId) -> bool { self.views.contains(&view) }

    /// Topmost view.
    pub fn top(&self) -> Option<ViewId> { self.views.last().copied() }

    pub fn iter_back_to_front(&self) -> impl DoubleEndedIterator<Item = ViewId> + '_ {
        self.views.iter().copied()
    }

    pub fn iter_front_to_back(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.views.iter().rev().copied()
    }

    pub(crate) fn insert_front(&mut self, view: ViewId) {
        self.views.shift_remove(&view);
        self.views.insert(view);
    }

    pub(crate) fn remove(&mut self, view: ViewId) -> bool { self.views.shift_remove(&view) }

    /// Moves a member to the top of the layer. Returns false if it is not a
    /// member.
    pub(crate) fn raise(&mut self, view: ViewId) -> bool {
        if !self.views.shift_remove(&view) {
            return false;
        }
        self.views.insert(view);
        true
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn ids(n: usize) -> Vec<ViewId> {
        let mut map: SlotMap<ViewId, ()> = SlotMap::default();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_insert_front_orders_back_to_front() {
        let v = ids(3);
        let mut layer = Layer::new();
        for &id in &v {
            layer.insert_front(id);
        }
        assert_eq!(layer.iter_back_to_front().collect::<Vec<_>>(), v);
        assert_eq!(layer.top(), Some(v[2]));
        assert_eq!(layer.iter_front_to_back().next(), Some(v[2]));
    }

    #[test]
    fn test_raise_moves_member_to_top() {
        let v = ids(3);
        let mut layer = Layer::new();
        for &id in &v {
            layer.insert_front(id);
        }
        assert!(layer.raise(v[0]));
        assert_eq!(layer.iter_back_to_front().collect::<Vec<_>>(), vec![v[1], v[2], v[0]]);
    }

    #[test]
    fn test_raise_rejects_non_member() {
        let v = ids(2);
        let mut layer = Layer::new();
        layer.insert_front(v[0]);
        assert!(!layer.raise(v[1]));
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_remove_keeps_order() {
        let v = ids(3);
        let mut layer = Layer::new();
        for &id in &v {
            layer.insert_front(id);
        }
        assert!(layer.remove(v[1]));
        assert!(!layer.remove(v[1]));
        assert_eq!(layer.iter_back_to_front().collect::<Vec<_>>(), vec![v[0], v[2]]);
    }

    #[test]
    fn test_position_ordering() {
        assert!(LayerPosition::Back < LayerPosition::Front);
        assert!(LayerPosition::Front < LayerPosition::Fullscreen);
        let mut layer = Layer::new();
        assert_eq!(layer.position(), LayerPosition::Unset);
        layer.set_position(LayerPosition::Fullscreen);
        layer.unset_position();
        assert_eq!(layer.position(), LayerPosition::Unset);
    }

    #[test]
    fn test_layouted_kinds() {
        assert!(LayerKind::Tiling.is_layouted());
        assert!(!LayerKind::Hidden.is_layouted());
        assert_eq!(LayerKind::Tiling.sibling(), Some(LayerKind::Floating));
        assert_eq!(LayerKind::Fullscreen.sibling(), None);
    }
}
