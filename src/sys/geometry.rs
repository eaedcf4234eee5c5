//! integer geometry shared by the layout engine and its collaborators

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self { Self { width, height } }

    /// A size only requests a resize when both dimensions are set.
    pub fn is_set(&self) -> bool { self.width != 0 && self.height != 0 }

    /// Exactly one dimension is zero.
    pub fn is_partial(&self) -> bool { (self.width == 0) != (self.height == 0) }
}

#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub const fn from_parts(origin: Point, size: Size) -> Self { Self { origin, size } }

    pub fn max_x(&self) -> i32 { self.origin.x + self.size.width }

    pub fn max_y(&self) -> i32 { self.origin.y + self.size.height }

    pub fn area(&self) -> i64 { i64::from(self.size.width) * i64::from(self.size.height) }

    pub fn is_degenerate(&self) -> bool { self.size.width <= 0 || self.size.height <= 0 }

    pub fn intersection(&self, other: &Self) -> Self {
        let min_x = self.origin.x.max(other.origin.x);
        let max_x = self.max_x().min(other.max_x());
        let min_y = self.origin.y.max(other.origin.y);
        let max_y = self.max_y().min(other.max_y());
        Rect::new(min_x, min_y, (max_x - min_x).max(0), (max_y - min_y).max(0))
    }

    pub fn intersects(&self, other: &Self) -> bool { !self.intersection(other).is_degenerate() }

    pub fn contains_rect(&self, other: Self) -> bool {
        self.origin.x <= other.origin.x
            && self.origin.y <= other.origin.y
            && self.max_x() >= other.max_x()
            && self.max_y() >= other.max_y()
    }

    /// Splits along the x axis; the first part gets `first` pixels of width.
    pub fn split_horizontal(&self, first: i32) -> (Rect, Rect) {
        let first = first.clamp(0, self.size.width);
        (
            Rect::new(self.origin.x, self.origin.y, first, self.size.height),
            Rect::new(
                self.origin.x + first,
                self.origin.y,
                self.size.width - first,
                self.size.height,
            ),
        )
    }

    /// Splits along the y axis; the first part gets `first` pixels of height.
    pub fn split_vertical(&self, first: i32) -> (Rect, Rect) {
        let first = first.clamp(0, self.size.height);
        (
            Rect::new(self.origin.x, self.origin.y, self.size.width, first),
            Rect::new(
                self.origin.x,
                self.origin.y + first,
                self.size.width,
                self.size.height - first,
            ),
        )
    }
}
