//! Tiling partition schemes.
//!
//! A scheme cuts an output's usable area into one rectangle per tiling slot.
//! Every scheme is a pure function of the area, the slot count and the split
//! ratios, and the rectangles it emits cover the area exactly. A slot only
//! shares space with another when the area is too small to cut further.

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::layout_engine::Orientation;
use crate::sys::geometry::{Point, Rect};

/// Split ratios and orientation flags of one output.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SplitState {
    ratios: Vec<f32>,
    default_ratio: f32,
    pub rotated: bool,
}

impl SplitState {
    pub fn new(default_ratio: f32) -> Self {
        Self {
            ratios: Vec::new(),
            default_ratio,
            rotated: false,
        }
    }

    pub fn ratio(&self, split: usize) -> f32 {
        self.ratios.get(split).copied().unwrap_or(self.default_ratio)
    }

    pub fn set_ratio(&mut self, split: usize, ratio: f32) {
        if self.ratios.len() <= split {
            self.ratios.resize(split + 1, self.default_ratio);
        }
        self.ratios[split] = ratio;
    }

    /// Forgets the split that disappears when the slot at `index` of `count`
    /// slots goes away, returning its ratio if one was set.
    pub fn remove_slot(&mut self, index: usize, count: usize) -> Option<f32> {
        if count < 2 {
            return None;
        }
        let split = index.min(count - 2);
        (split < self.ratios.len()).then(|| self.ratios.remove(split))
    }

    /// Opens the split for a slot inserted at `index`, leaving `count` slots.
    pub fn insert_slot(&mut self, index: usize, count: usize, ratio: Option<f32>) {
        if count < 2 {
            return;
        }
        let split = index.min(count - 2);
        if split < self.ratios.len() {
            self.ratios.insert(split, ratio.unwrap_or(self.default_ratio));
        } else if let Some(ratio) = ratio {
            self.set_ratio(split, ratio);
        }
    }
}

#[enum_dispatch]
pub trait Partition {
    /// Calls `emit` once per slot, in slot order.
    fn partition(
        &self,
        area: Rect,
        count: usize,
        splits: &SplitState,
        emit: &mut dyn FnMut(usize, Rect),
    );

    /// Moves the split bounding slot `index` by a pixel delta. Returns false
    /// when no split moved.
    fn resize(
        &self,
        area: Rect,
        count: usize,
        index: usize,
        delta: Point,
        splits: &mut SplitState,
        min_ratio: f32,
    ) -> bool;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[enum_dispatch(Partition)]
pub enum PartitionKind {
    Dwindle(Dwindle),
    MasterStack(MasterStack),
}

/// Pixels given to the first part of `extent` cut at `ratio`, or None if the
/// extent cannot hold two non-empty parts.
pub(crate) fn split_extent(extent: i32, ratio: f32) -> Option<i32> {
    if extent < 2 {
        return None;
    }
    let first = (extent as f32 * ratio).round() as i32;
    Some(first.clamp(1, extent - 1))
}

pub(crate) fn cut(rect: Rect, orientation: Orientation, ratio: f32) -> Option<(Rect, Rect)> {
    match orientation {
        Orientation::Horizontal => {
            split_extent(rect.size.width, ratio).map(|first| rect.split_horizontal(first))
        }
        Orientation::Vertical => {
            split_extent(rect.size.height, ratio).map(|first| rect.split_vertical(first))
        }
    }
}

pub(crate) fn extent(rect: Rect, orientation: Orientation) -> i32 {
    match orientation {
        Orientation::Horizontal => rect.size.width,
        Orientation::Vertical => rect.size.height,
    }
}

pub(crate) fn along(delta: Point, orientation: Orientation) -> i32 {
    match orientation {
        Orientation::Horizontal => delta.x,
        Orientation::Vertical => delta.y,
    }
}

/// Shifts a split ratio by `pixels` of `extent`, growing the first part for
/// positive values when `grow_first` is set.
pub(crate) fn nudge(
    splits: &mut SplitState,
    split: usize,
    pixels: i32,
    extent: i32,
    grow_first: bool,
    min_ratio: f32,
) -> bool {
    if pixels == 0 || extent <= 0 {
        return false;
    }
    let change = pixels as f32 / extent as f32;
    let ratio = splits.ratio(split) + if grow_first { change } else { -change };
    // min/max rather than clamp: an inverted range must not panic.
    splits.set_ratio(split, ratio.max(min_ratio).min(1.0 - min_ratio));
    true
}

mod dwindle;
mod master_stack;

pub use dwindle::Dwindle;
pub use master_stack::MasterStack;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_extent_keeps_both_parts() {
        assert_eq!(split_extent(1920, 0.5), Some(960));
        assert_eq!(split_extent(2, 0.01), Some(1));
        assert_eq!(split_extent(2, 0.99), Some(1));
        assert_eq!(split_extent(1, 0.5), None);
        assert_eq!(split_extent(0, 0.5), None);
    }

    #[test]
    fn test_split_state_defaults() {
        let mut splits = SplitState::new(0.5);
        assert_eq!(splits.ratio(3), 0.5);
        splits.set_ratio(2, 0.7);
        assert_eq!(splits.ratio(0), 0.5);
        assert_eq!(splits.ratio(2), 0.7);
    }

    #[test]
    fn test_removing_last_slot_drops_previous_split() {
        let mut splits = SplitState::new(0.5);
        splits.set_ratio(0, 0.6);
        splits.set_ratio(1, 0.7);
        assert_eq!(splits.remove_slot(2, 3), Some(0.7));
        assert_eq!(splits.ratio(0), 0.6);
        assert_eq!(splits.ratio(1), 0.5);
    }

    #[test]
    fn test_reinserting_slot_restores_ratio() {
        let mut splits = SplitState::new(0.5);
        splits.set_ratio(0, 0.6);
        splits.set_ratio(1, 0.7);
        let removed = splits.remove_slot(0, 3);
        assert_eq!(splits.ratio(0), 0.7);
        splits.insert_slot(0, 3, removed);
        assert_eq!(splits.ratio(0), 0.6);
        assert_eq!(splits.ratio(1), 0.7);
    }

    #[test]
    fn test_nudge_clamps() {
        let mut splits = SplitState::new(0.5);
        assert!(nudge(&mut splits, 0, 5000, 1000, true, 0.1));
        assert_eq!(splits.ratio(0), 0.9);
        assert!(!nudge(&mut splits, 0, 0, 1000, true, 0.1));
    }

    #[test]
    fn test_nudge_with_inverted_range() {
        let mut splits = SplitState::new(0.5);
        assert!(nudge(&mut splits, 0, 10, 1000, true, 0.6));
        assert_eq!(splits.ratio(0), 0.4);
    }
}
