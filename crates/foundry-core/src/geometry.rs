//! Geometric primitives for diagram layout.
//!
//! This module provides the geometric types Foundry uses to place nodes and
//! containers and to describe connector curves.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in canvas space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned box defined by minimum and maximum coordinates
//! - [`Insets`] - Padding values for four sides
//!
//! # Coordinate System
//!
//! Foundry uses the screen coordinate system renderers expect:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Node positions are the **top-left** corner of the node box.

use serde::{Deserialize, Serialize};

/// A 2D point in canvas coordinate space.
///
/// # Examples
///
/// ```
/// # use foundry_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// let halfway = p1.lerp(p2, 0.5);
/// assert_eq!(halfway.x(), 7.5);
/// assert_eq!(halfway.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Checks if both coordinates are finite numbers
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Point, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new Size with the insets added to both dimensions
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Returns true if both dimensions are finite and strictly positive
    pub fn is_valid_hint(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An axis-aligned rectangle with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the smallest bounds enclosing every item, or `None` for an empty iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use foundry_core::geometry::{Bounds, Point, Size};
    /// let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
    /// let b = Bounds::new_from_top_left(Point::new(20.0, 5.0), Size::new(10.0, 10.0));
    ///
    /// let all = Bounds::enclosing([a, b]).unwrap();
    /// assert_eq!(all.width(), 30.0);
    /// assert_eq!(all.height(), 15.0);
    /// assert!(Bounds::enclosing([]).is_none());
    /// ```
    pub fn enclosing(items: impl IntoIterator<Item = Bounds>) -> Option<Self> {
        items.into_iter().reduce(|acc, bounds| acc.merge(&bounds))
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point {
            x: self.min_x,
            y: self.min_y,
        }
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Merges two bounds into the smallest bounds containing both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by the specified offset.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Grows the bounds outward by the insets on each side.
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left(),
            min_y: self.min_y - insets.top(),
            max_x: self.max_x + insets.right(),
            max_y: self.max_y + insets.bottom(),
        }
    }

    /// Returns true when `other` lies entirely inside these bounds (edges inclusive).
    pub fn contains(&self, other: &Bounds) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && self.max_x >= other.max_x
            && self.max_y >= other.max_y
    }

    /// Returns true when the interiors of the two bounds overlap.
    ///
    /// Touching edges do not count as an intersection.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Returns the free space between two bounds.
    ///
    /// This is the larger of the horizontal and vertical gaps, so it is positive
    /// whenever the boxes are separated along at least one axis and negative when
    /// they overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// # use foundry_core::geometry::{Bounds, Point, Size};
    /// let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
    /// let b = Bounds::new_from_top_left(Point::new(0.0, 40.0), Size::new(10.0, 10.0));
    /// assert_eq!(a.clearance(&b), 30.0);
    /// ```
    pub fn clearance(&self, other: &Bounds) -> f32 {
        let gap_x = (other.min_x - self.max_x).max(self.min_x - other.max_x);
        let gap_y = (other.min_y - self.max_y).max(self.min_y - other.max_y);
        gap_x.max(gap_y)
    }

    /// Clips the segment `a → b` to these bounds.
    ///
    /// Returns the parameter range `(t0, t1)` of the part of the segment inside
    /// the bounds, or `None` when the segment misses them (Liang-Barsky).
    pub fn clip_segment(&self, a: Point, b: Point) -> Option<(f32, f32)> {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let mut t0 = 0.0_f32;
        let mut t1 = 1.0_f32;

        for (p, q) in [
            (-dx, a.x - self.min_x),
            (dx, self.max_x - a.x),
            (-dy, a.y - self.min_y),
            (dy, self.max_y - a.y),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }

        Some((t0, t1))
    }
}

/// Spacing around an element with potentially different values for each side
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates new insets with specified values for each side
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Returns the top inset value
    pub fn top(self) -> f32 {
        self.top
    }

    /// Returns the right inset value
    pub fn right(self) -> f32 {
        self.right
    }

    /// Returns the bottom inset value
    pub fn bottom(self) -> f32 {
        self.bottom
    }

    /// Returns the left inset value
    pub fn left(self) -> f32 {
        self.left
    }

    /// Returns the sum of left and right insets
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Returns the sum of top and bottom insets
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    /// Merged bounds contain both inputs.
    fn check_merge_contains_both(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged = b1.merge(&b2);
        prop_assert!(merged.contains(&b1));
        prop_assert!(merged.contains(&b2));
        Ok(())
    }

    /// A positive clearance implies the boxes do not intersect.
    fn check_clearance_agrees_with_intersects(
        b1: Bounds,
        b2: Bounds,
    ) -> Result<(), TestCaseError> {
        if b1.clearance(&b2) > 0.0 {
            prop_assert!(!b1.intersects(&b2));
        }
        if b1.intersects(&b2) {
            prop_assert!(b1.clearance(&b2) < 0.0);
        }
        Ok(())
    }

    /// Clipped segment endpoints lie inside the (slightly grown) bounds.
    fn check_clip_points_inside(
        bounds: Bounds,
        a: Point,
        b: Point,
    ) -> Result<(), TestCaseError> {
        if let Some((t0, t1)) = bounds.clip_segment(a, b) {
            let grown = bounds.add_padding(Insets::uniform(0.01));
            for t in [t0, t1] {
                let p = a.lerp(b, t);
                prop_assert!(p.x() >= grown.min_x() && p.x() <= grown.max_x());
                prop_assert!(p.y() >= grown.min_y() && p.y() <= grown.max_y());
            }
        }
        Ok(())
    }

    /// Translation keeps the size of the bounds.
    fn check_translate_keeps_size(bounds: Bounds, offset: Point) -> Result<(), TestCaseError> {
        let moved = bounds.translate(offset);
        prop_assert!(approx_eq!(f32, moved.width(), bounds.width(), epsilon = 0.001));
        prop_assert!(approx_eq!(f32, moved.height(), bounds.height(), epsilon = 0.001));
        Ok(())
    }

    proptest! {
        #[test]
        fn merge_contains_both(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_merge_contains_both(b1, b2)?;
        }

        #[test]
        fn clearance_agrees_with_intersects(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_clearance_agrees_with_intersects(b1, b2)?;
        }

        #[test]
        fn clip_points_inside(
            bounds in bounds_strategy(),
            a in point_strategy(),
            b in point_strategy(),
        ) {
            check_clip_points_inside(bounds, a, b)?;
        }

        #[test]
        fn translate_keeps_size(bounds in bounds_strategy(), offset in point_strategy()) {
            check_translate_keeps_size(bounds, offset)?;
        }
    }
}
