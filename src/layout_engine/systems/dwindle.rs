//! Dwindle partition.
//!
//! Slot `i` takes the first part of the region left over by slots `0..i`; the
//! region is cut along its longer side, so a wide output splits side by side
//! and the remainder spirals inwards. The last slot keeps the remainder.

use serde::{Deserialize, Serialize};

use super::{Partition, SplitState, along, cut, extent, nudge};
use crate::layout_engine::Orientation;
use crate::sys::geometry::{Point, Rect};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Dwindle;

impl Dwindle {
    fn orientation(rect: Rect, split: usize, splits: &SplitState) -> Orientation {
        let natural = if rect.size.width > rect.size.height {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        if split == 0 && splits.rotated { natural.flip() } else { natural }
    }

    /// Cuts `rest` for split `split`, falling back to the other axis when the
    /// preferred one is too thin.
    fn cut_at(rest: Rect, split: usize, splits: &SplitState) -> Option<(Orientation, Rect, Rect)> {
        let preferred = Self::orientation(rest, split, splits);
        let ratio = splits.ratio(split);
        [preferred, preferred.flip()]
            .into_iter()
            .find_map(|o| cut(rest, o, ratio).map(|(a, b)| (o, a, b)))
    }
}

impl Partition for Dwindle {
    fn partition(
        &self,
        area: Rect,
        count: usize,
        splits: &SplitState,
        emit: &mut dyn FnMut(usize, Rect),
    ) {
        let mut rest = area;
        for slot in 0..count {
            if slot + 1 == count {
                emit(slot, rest);
                break;
            }
            match Self::cut_at(rest, slot, splits) {
                Some((_, first, second)) => {
                    emit(slot, first);
                    rest = second;
                }
                None => emit(slot, rest),
            }
        }
    }

    fn resize(
        &self,
        area: Rect,
        count: usize,
        index: usize,
        delta: Point,
        splits: &mut SplitState,
        min_ratio: f32,
    ) -> bool {
        if count < 2 || index >= count {
            return false;
        }
        let split = index.min(count - 2);
        let mut rest = area;
        for earlier in 0..split {
            if let Some((_, _, second)) = Self::cut_at(rest, earlier, splits) {
                rest = second;
            }
        }
        let Some((orientation, _, _)) = Self::cut_at(rest, split, splits) else {
            return false;
        };
        nudge(
            splits,
            split,
            along(delta, orientation),
            extent(rest, orientation),
            index == split,
            min_ratio,
        )
    }
}
