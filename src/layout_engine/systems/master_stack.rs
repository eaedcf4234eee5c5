//! Master and stack partition.
//!
//! Slot 0 is the master and takes the first split of the area. The remaining
//! slots share the rest in even slices, stacked perpendicular to the master
//! split. Rotation moves the master from the left edge to the top edge.

use serde::{Deserialize, Serialize};

use super::{Partition, SplitState, along, cut, extent, nudge};
use crate::layout_engine::Orientation;
use crate::sys::geometry::{Point, Rect};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MasterStack;

impl MasterStack {
    fn master_split(area: Rect, splits: &SplitState) -> Option<(Orientation, Rect, Rect)> {
        let preferred = if splits.rotated {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        };
        let ratio = splits.ratio(0);
        [preferred, preferred.flip()]
            .into_iter()
            .find_map(|o| cut(area, o, ratio).map(|(a, b)| (o, a, b)))
    }

    /// Slice `index` of `count` even slices of `stack`, cut along `orientation`.
    fn slice(stack: Rect, orientation: Orientation, index: usize, count: usize) -> Rect {
        let total = extent(stack, orientation).max(1);
        let (offset, len) = if count as i32 > total {
            ((index as i32).min(total - 1), 1)
        } else {
            let base = total / count as i32;
            let extra = total % count as i32;
            let i = index as i32;
            (i * base + i.min(extra), base + i32::from(i < extra))
        };
        let mut rect = stack;
        match orientation {
            Orientation::Horizontal => {
                rect.origin.x += offset;
                rect.size.width = len;
            }
            Orientation::Vertical => {
                rect.origin.y += offset;
                rect.size.height = len;
            }
        }
        rect
    }
}

impl Partition for MasterStack {
    fn partition(
        &self,
        area: Rect,
        count: usize,
        splits: &SplitState,
        emit: &mut dyn FnMut(usize, Rect),
    ) {
        if count == 0 {
            return;
        }
        if count == 1 {
            emit(0, area);
            return;
        }
        let Some((orientation, master, stack)) = Self::master_split(area, splits) else {
            for slot in 0..count {
                emit(slot, area);
            }
            return;
        };
        emit(0, master);
        let stacked = count - 1;
        for slot in 0..stacked {
            emit(slot + 1, Self::slice(stack, orientation.flip(), slot, stacked));
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
        let Some((orientation, _, _)) = Self::master_split(area, splits) else {
            return false;
        };
        nudge(
            splits,
            0,
            along(delta, orientation),
            extent(area, orientation),
            index == 0,
            min_ratio,
        )
    }
}
