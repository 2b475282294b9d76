//! # Day/Night Terminator Projection
//!
//! The terminator is the great circle perpendicular to the sun vector. This
//! module samples that circle, rotates it by the solar declination, and
//! records for every raster row how far the illuminated region reaches to
//! either side of the sub-solar column on an equirectangular map.
//!
//! ## Width Table Layout
//! - One entry per raster row, row 0 at the top (north)
//! - An entry is the illuminated half-width in pixels, `0..=width/2`
//! - [`NO_BOUNDARY`] (-1) marks a row the terminator never crosses; after the
//!   polar fill these rows are all inside the dark polar cap
//! - A computed half-width of exactly 0 is stored as 1 so it can never be
//!   confused with the sentinel
//!
//! The projection only depends on the declination, so a renderer shifts the
//! same table horizontally as the sun's longitude moves through the day.

use crate::angle::{Degrees, Radians};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Entry for a row with no day/night boundary.
pub const NO_BOUNDARY: i32 = -1;

/// Number of increments across the half circle of the terminator.
pub const TERMINATOR_STEPS: u32 = 100;

/// Per-row illuminated half-widths, see the module docs for the encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidthTable {
    widths: Vec<i32>,
}

impl WidthTable {
    fn empty(height: u32) -> Self {
        Self {
            widths: vec![NO_BOUNDARY; height as usize],
        }
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Raw entries including the [`NO_BOUNDARY`] sentinel.
    pub fn as_slice(&self) -> &[i32] {
        &self.widths
    }

    /// Illuminated half-width of `row`, or `None` when the row has no boundary.
    pub fn half_width(&self, row: usize) -> Option<u32> {
        self.widths
            .get(row)
            .and_then(|&width| u32::try_from(width).ok())
    }

    /// Record a boundary found at raster row `row` (counted from the bottom
    /// of the projected circle, see [`raster_point`]).
    fn mark(&mut self, row: i64, column: i64) {
        let index = self.widths.len() - 1 - row as usize;
        self.widths[index] = if column == 0 { 1 } else { column as i32 };
    }
}

/// Project the terminator for a sun at `declination` onto a `width` x `height`
/// equirectangular raster.
///
/// Both dimensions must be at least 2.
///
/// The boundary is traced for `|declination|`; a southern declination uses the
/// same trace flipped top to bottom before the polar cap is filled. For any
/// nonzero `d` the tables for `d` and `-d` are therefore exact vertical
/// mirrors of each other on any raster height.
///
/// # Example
/// ```
/// use sunmap_lib::{terminator::project_terminator, Degrees};
///
/// // At an equinox the terminator is a meridian: a quarter of the map either side of the sun.
/// let table = project_terminator(Degrees(0.0), 360, 181);
/// assert!(table.as_slice().iter().filter(|&&w| w != -1).all(|&w| w == 90));
/// ```
pub fn project_terminator(declination: Degrees, width: u32, height: u32) -> WidthTable {
    debug_assert!(
        width >= 2 && height >= 2,
        "raster must be at least 2x2, got {width}x{height}"
    );

    let mut table = if declination.0 < 0.0 {
        let mut table = trace_boundary(Degrees(-declination.0), width, height);
        table.widths.reverse();
        table
    } else {
        trace_boundary(declination, width, height)
    };

    fill_polar_cap(&mut table, declination, width);
    table
}

/// Sample the terminator half circle with θ ascending from -π/2 to +π/2 and
/// record the boundary column of every row it crosses.
fn trace_boundary(declination: Degrees, width: u32, height: u32) -> WidthTable {
    let mut table = WidthTable::empty(height);
    let rotation = Degrees(-declination.0);
    let (s, c) = (rotation.sin(), rotation.cos());

    let mut previous: Option<(i64, i64)> = None;
    for step in 0..=TERMINATOR_STEPS {
        let fraction =
            f64::from(2 * step as i32 - TERMINATOR_STEPS as i32) / f64::from(TERMINATOR_STEPS);
        let theta = Radians(fraction * FRAC_PI_2);

        // Terminator point in the sun's frame, rotated by the declination
        let x = -s * theta.sin();
        let y = theta.cos();
        let z = c * theta.sin();

        let longitude = if x == 0.0 && y == 0.0 {
            Degrees(0.0)
        } else {
            Radians(y.atan2(x)).to_degrees()
        };
        let latitude = Radians(z.asin()).to_degrees();
        let (column, row) = raster_point(longitude, latitude, width, height);

        match previous {
            None => {}
            Some((_, previous_row)) if previous_row == row => table.mark(row, column),
            Some((previous_column, previous_row)) => {
                let slope = (column - previous_column) as f64 / (row - previous_row) as f64;
                let step = (row - previous_row).signum();
                let mut current = previous_row;
                while current != row {
                    current += step;
                    let offset = (slope * (current - previous_row) as f64).round() as i64;
                    table.mark(current, previous_column + offset);
                }
            }
        }
        previous = Some((column, row));
    }
    table
}

/// Map a point on the projected circle to (column, row).
///
/// `row` is `height - (lat + 90) * height / 180`, clamped onto the raster.
fn raster_point(longitude: Degrees, latitude: Degrees, width: u32, height: u32) -> (i64, i64) {
    let rows = f64::from(height);
    let row = (rows / 2.0 - latitude.0 * (rows / 180.0)).floor() as i64;
    let column = (longitude.0 * (f64::from(width) / 360.0)) as i64;
    (column, row.clamp(0, i64::from(height) - 1))
}

/// Light the polar cap on the summer side of the map.
///
/// The sampled half circle never reaches the pole facing the sun. Scan from
/// that pole's edge toward the equator; the first row holding a boundary and
/// every row before it become fully lit. A sun on the equator lights neither
/// cap.
fn fill_polar_cap(table: &mut WidthTable, declination: Degrees, width: u32) {
    let height = table.len();
    let full = (width / 2) as i32;

    let scan: Vec<usize> = if declination.0 > 0.0 {
        (0..=height / 2).collect()
    } else if declination.0 < 0.0 {
        ((height - 1) / 2..height).rev().collect()
    } else {
        return;
    };

    if let Some(edge) = scan
        .iter()
        .position(|&row| table.widths[row] != NO_BOUNDARY)
    {
        for &row in &scan[..=edge] {
            table.widths[row] = full;
        }
    }
}
