//! Overlap prevention between siblings.
//!
//! Two placement strategies that guarantee clearance by construction:
//! a single forward [`sweep`] for siblings sharing a rank, and a uniform
//! [`grid`] for disconnected siblings.

use super::axis::Flow;

/// Number of grid cells along the primary axis before a new row starts.
pub const GRID_COLUMNS: usize = 4;

/// Resolves overlaps along one axis in a single pass.
///
/// `entries` are `(desired_start, extent)` pairs in placement order. Each
/// entry keeps its desired start unless that would leave less than `gap`
/// after the previous entry, in which case it starts at `previous end + gap`.
/// Returns the resolved starts.
pub fn sweep(entries: &[(f32, f32)], gap: f32) -> Vec<f32> {
    let mut starts = Vec::with_capacity(entries.len());
    let mut previous_end: Option<f32> = None;

    for &(desired, extent) in entries {
        let start = match previous_end {
            Some(end) if desired < end + gap => end + gap,
            _ => desired,
        };
        starts.push(start);
        previous_end = Some(start + extent);
    }

    starts
}

/// Tiles `extents` into uniform cells starting at `origin`.
///
/// Cells are as large as the largest item along each axis; `columns` cells
/// run along the primary axis before the next row starts along the
/// secondary axis. Returns each item's flow-space start.
pub fn grid(extents: &[Flow], columns: usize, gaps: Flow, origin: Flow) -> Vec<Flow> {
    let columns = columns.max(1);
    let cell = extents.iter().fold(Flow::default(), |cell, extent| {
        Flow::new(
            cell.primary.max(extent.primary),
            cell.secondary.max(extent.secondary),
        )
    });

    (0..extents.len())
        .map(|index| {
            let column = (index % columns) as f32;
            let row = (index / columns) as f32;
            Flow::new(
                origin.primary + column * (cell.primary + gaps.primary),
                origin.secondary + row * (cell.secondary + gaps.secondary),
            )
        })
        .collect()
}
