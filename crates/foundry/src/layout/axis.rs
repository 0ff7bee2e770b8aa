//! Flow-relative coordinates.
//!
//! Layout reasons in terms of the primary (flow) axis and the secondary axis
//! across it. [`Orientation`] converts between those and canvas x/y, so every
//! nesting level swaps axes the same way.

use foundry_core::geometry::{Bounds, Point, Size};

use crate::config::Orientation;

/// A value pair measured along the primary and secondary axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Flow {
    pub primary: f32,
    pub secondary: f32,
}

impl Flow {
    pub fn new(primary: f32, secondary: f32) -> Self {
        Self { primary, secondary }
    }
}

/// Horizontal and vertical gaps between siblings, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    horizontal: f32,
    vertical: f32,
}

impl Spacing {
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn horizontal(self) -> f32 {
        self.horizontal
    }

    pub fn vertical(self) -> f32 {
        self.vertical
    }

    /// The smaller of the two gaps.
    pub fn narrowest(self) -> f32 {
        self.horizontal.min(self.vertical)
    }

    /// Returns a copy with both gaps grown.
    pub fn widen(self, horizontal: f32, vertical: f32) -> Self {
        Self::new(self.horizontal + horizontal, self.vertical + vertical)
    }
}

impl Orientation {
    /// Projects a canvas point onto the flow axes.
    pub fn flow_point(self, point: Point) -> Flow {
        match self {
            Orientation::Horizontal => Flow::new(point.x(), point.y()),
            Orientation::Vertical => Flow::new(point.y(), point.x()),
        }
    }

    /// Maps flow coordinates back to a canvas point.
    pub fn canvas_point(self, flow: Flow) -> Point {
        match self {
            Orientation::Horizontal => Point::new(flow.primary, flow.secondary),
            Orientation::Vertical => Point::new(flow.secondary, flow.primary),
        }
    }

    /// Extent of a size along each flow axis.
    pub fn flow_extent(self, size: Size) -> Flow {
        match self {
            Orientation::Horizontal => Flow::new(size.width(), size.height()),
            Orientation::Vertical => Flow::new(size.height(), size.width()),
        }
    }

    /// Gaps along each flow axis.
    pub fn flow_gaps(self, spacing: Spacing) -> Flow {
        match self {
            Orientation::Horizontal => Flow::new(spacing.horizontal, spacing.vertical),
            Orientation::Vertical => Flow::new(spacing.vertical, spacing.horizontal),
        }
    }

    /// Minimum and maximum of the bounds along the secondary axis.
    pub fn secondary_range(self, bounds: Bounds) -> (f32, f32) {
        match self {
            Orientation::Horizontal => (bounds.min_y(), bounds.max_y()),
            Orientation::Vertical => (bounds.min_x(), bounds.max_x()),
        }
    }

    /// Minimum and maximum of the bounds along the primary axis.
    pub fn primary_range(self, bounds: Bounds) -> (f32, f32) {
        match self {
            Orientation::Horizontal => (bounds.min_x(), bounds.max_x()),
            Orientation::Vertical => (bounds.min_y(), bounds.max_y()),
        }
    }

    /// Canvas offset that moves something by `delta` along the secondary axis.
    pub fn secondary_offset(self, delta: f32) -> Point {
        self.canvas_point(Flow::new(0.0, delta))
    }
}
