//! # Sun Map Rendering
//!
//! Turns a [`SunMap`] into night shading, for both a monochrome raster
//! (any embedded-graphics `DrawTarget`) and ASCII terminal output.
//!
//! Each width table entry is a half-width around the sun's column. The lit
//! span of a row is `sun_column ± half_width`, wrapped at the left and right
//! map edges; everything else on that row is night. Rows without a boundary
//! lie in the dark polar cap.

use crate::{latitude_to_row, longitude_to_column, Observer, SunMap};
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
};
use std::ops::Range;

/// ASCII cell on the day side
pub const DAY: char = '.';
/// ASCII cell on the night side
pub const NIGHT: char = '#';
/// ASCII sub-solar point
pub const SUN: char = 'O';
/// ASCII observer position
pub const OBSERVER: char = '+';

const SUN_MARKER_DIAMETER: u32 = 9;
const OBSERVER_MARKER_ARM: i32 = 4;

/// Illuminated columns of one row as one or two half-open spans (two when the
/// span wraps around the map edge). `None` means the whole row is dark.
pub fn lit_spans(half_width: Option<u32>, sun_column: u32, width: u32) -> Vec<Range<u32>> {
    let Some(half) = half_width else {
        return Vec::new();
    };
    if half.saturating_mul(2) >= width {
        return vec![0..width];
    }

    let start = (i64::from(sun_column) - i64::from(half)).rem_euclid(i64::from(width)) as u32;
    let end = start + 2 * half;
    if end <= width {
        vec![start..end]
    } else {
        vec![start..width, 0..end - width]
    }
}

/// Complement of [`lit_spans`] on a row of `width` pixels.
pub fn dark_spans(half_width: Option<u32>, sun_column: u32, width: u32) -> Vec<Range<u32>> {
    let mut lit = lit_spans(half_width, sun_column, width);
    lit.sort_by_key(|span| span.start);

    let mut dark = Vec::with_capacity(2);
    let mut cursor = 0;
    for span in lit {
        if span.start > cursor {
            dark.push(cursor..span.start);
        }
        cursor = cursor.max(span.end);
    }
    if cursor < width {
        dark.push(cursor..width);
    }
    dark
}

/// Draw night shading plus sun and observer markers.
///
/// Night pixels are drawn `On`; day pixels are left untouched, so clear the
/// target first (or draw over a day-side base map).
pub fn draw_map<D>(map: &SunMap, observer: Option<&Observer>, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let night = PrimitiveStyle::with_fill(BinaryColor::On);
    let sun_column = map.sun_column();

    for row in 0..map.height {
        for span in dark_spans(map.widths.half_width(row as usize), sun_column, map.width) {
            Rectangle::new(
                Point::new(span.start as i32, row as i32),
                Size::new(span.end - span.start, 1),
            )
            .into_styled(night)
            .draw(target)?;
        }
    }

    // The sub-solar point is always on the day side: dark ring, dark dot
    let sun_centre = Point::new(sun_column as i32, map.sun_row() as i32);
    Circle::with_center(sun_centre, SUN_MARKER_DIAMETER)
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(target)?;
    Circle::with_center(sun_centre, 3)
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(target)?;

    if let Some(observer) = observer {
        // Contrast against whichever side the observer is on
        let color = if map.sun.is_daylight_at(observer) {
            BinaryColor::On
        } else {
            BinaryColor::Off
        };
        let stroke = PrimitiveStyle::with_stroke(color, 1);
        let centre = Point::new(
            longitude_to_column(observer.longitude, map.width) as i32,
            latitude_to_row(observer.latitude, map.height) as i32,
        );
        Line::new(
            centre - Point::new(OBSERVER_MARKER_ARM, 0),
            centre + Point::new(OBSERVER_MARKER_ARM, 0),
        )
        .into_styled(stroke)
        .draw(target)?;
        Line::new(
            centre - Point::new(0, OBSERVER_MARKER_ARM),
            centre + Point::new(0, OBSERVER_MARKER_ARM),
        )
        .into_styled(stroke)
        .draw(target)?;
    }

    log::debug!(
        "drew {}x{} sun map, sun at column {}",
        map.width,
        map.height,
        sun_column
    );
    Ok(())
}

/// Render the map as text: a header line, one line per raster row, and a
/// longitude scale.
pub fn render_ascii(map: &SunMap, observer: Option<&Observer>) -> String {
    let width = map.width as usize;
    let sun_column = map.sun_column();
    let mut grid = vec![vec![DAY; width]; map.height as usize];

    for (row, cells) in grid.iter_mut().enumerate() {
        for span in dark_spans(map.widths.half_width(row), sun_column, map.width) {
            for cell in &mut cells[span.start as usize..span.end as usize] {
                *cell = NIGHT;
            }
        }
    }

    if let Some(observer) = observer {
        let column = longitude_to_column(observer.longitude, map.width) as usize;
        let row = latitude_to_row(observer.latitude, map.height) as usize;
        grid[row][column] = OBSERVER;
    }
    grid[map.sun_row() as usize][sun_column as usize] = SUN;

    let (sun_lat, sun_lon) = map.sun.subsolar_point();
    let mut out = format!(
        "Sun over {:.1} lat, {:.1} lon at {}\n",
        sun_lat, sun_lon, map.instant
    );
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out.push_str(&longitude_scale(width));
    out.push('\n');
    out
}

/// "180W", "0" and "180E" under the left edge, centre and right edge.
fn longitude_scale(width: usize) -> String {
    let mut scale = vec![' '; width.max(1)];
    let mut place = |text: &str, at: usize| {
        for (offset, ch) in text.chars().enumerate() {
            if let Some(cell) = scale.get_mut(at + offset) {
                *cell = ch;
            }
        }
    };
    place("0", width / 2);
    place("180E", width.saturating_sub(4));
    place("180W", 0);
    scale.into_iter().collect::<String>().trim_end().to_string()
}

/// Print the ASCII map to stdout.
pub fn draw_ascii(map: &SunMap, observer: Option<&Observer>) {
    print!("{}", render_ascii(map, observer));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::MapBuffer;
    use crate::{Degrees, Instant};

    fn solstice_map(width: u32, height: u32) -> SunMap {
        SunMap::compute(Instant::new(2024, 6, 21, 12, 0, 0), width, height, true).unwrap()
    }

    #[test]
    fn test_lit_spans_simple_and_wrapped() {
        assert_eq!(lit_spans(Some(10), 50, 100), vec![40..60]);
        assert_eq!(lit_spans(Some(10), 5, 100), vec![95..100, 0..15]);
        assert_eq!(lit_spans(Some(10), 95, 100), vec![85..100, 0..5]);
        assert_eq!(lit_spans(Some(50), 13, 100), vec![0..100]);
        assert!(lit_spans(None, 13, 100).is_empty());
    }

    #[test]
    fn test_dark_spans_complement_lit_spans() {
        assert_eq!(dark_spans(Some(10), 50, 100), vec![0..40, 60..100]);
        assert_eq!(dark_spans(Some(10), 5, 100), vec![15..95]);
        assert!(dark_spans(Some(50), 5, 100).is_empty());
        assert_eq!(dark_spans(None, 5, 100), vec![0..100]);

        for sun in [0, 1, 37, 99] {
            for half in [1, 7, 25, 49] {
                let lit: u32 = lit_spans(Some(half), sun, 100).iter().map(|s| s.end - s.start).sum();
                let dark: u32 = dark_spans(Some(half), sun, 100).iter().map(|s| s.end - s.start).sum();
                assert_eq!(lit, 2 * half);
                assert_eq!(lit + dark, 100);
            }
        }
    }

    #[test]
    fn test_ascii_solstice_layout() {
        let map = solstice_map(72, 36);
        let text = render_ascii(&map, None);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + 36 + 1);
        assert!(lines[0].starts_with("Sun over 23.4° lat"));
        // Midnight sun in the arctic, polar night in the antarctic
        assert!(lines[1].chars().all(|c| c == DAY));
        assert!(lines[36].chars().all(|c| c == NIGHT));
        assert_eq!(text.matches(SUN).count(), 1);
        assert!(lines[37].starts_with("180W"));
        assert!(lines[37].ends_with("180E"));
    }

    #[test]
    fn test_ascii_marks_observer() {
        let map = solstice_map(72, 36);
        let munich = Observer {
            latitude: Degrees(48.14),
            longitude: Degrees(11.58),
        };
        let text = render_ascii(&map, Some(&munich));
        let lines: Vec<&str> = text.lines().collect();
        let row = latitude_to_row(munich.latitude, 36) as usize;
        let column = longitude_to_column(munich.longitude, 72) as usize;
        assert_eq!(lines[1 + row].chars().nth(column), Some(OBSERVER));
    }

    #[test]
    fn test_draw_map_shades_winter_pole() {
        let map = solstice_map(360, 180);
        let mut buffer = MapBuffer::new(360, 180);
        draw_map(&map, None, &mut buffer).unwrap();

        assert_eq!(buffer.pixel(0, 0), Some(BinaryColor::Off));
        assert_eq!(buffer.pixel(0, 179), Some(BinaryColor::On));
        assert_eq!(buffer.pixel(map.sun_column(), map.sun_row()), Some(BinaryColor::On));

        // Roughly half the planet is dark at any moment
        let fraction = buffer.count_on() as f64 / (360.0 * 180.0);
        assert!((0.4..0.6).contains(&fraction), "night fraction {fraction}");
    }

    #[test]
    fn test_draw_map_observer_contrasts_with_background() {
        let map = solstice_map(360, 180);
        // Mid-Pacific is on the night side at 12:00 UTC
        let night_observer = Observer {
            latitude: Degrees(0.0),
            longitude: Degrees(179.0),
        };
        let mut buffer = MapBuffer::new(360, 180);
        draw_map(&map, Some(&night_observer), &mut buffer).unwrap();

        let column = longitude_to_column(night_observer.longitude, 360);
        let row = latitude_to_row(night_observer.latitude, 180);
        assert!(!map.sun.is_daylight_at(&night_observer));
        assert_eq!(buffer.pixel(column, row), Some(BinaryColor::Off));
        assert_eq!(buffer.pixel(column - 2, row), Some(BinaryColor::Off));
        assert_eq!(buffer.pixel(column - 6, row), Some(BinaryColor::On));
    }
}
