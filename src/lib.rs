//! # Sun Map Core Library
//!
//! This library computes everything the GPS status sun map needs to shade the
//! night side of an equirectangular world map: where the sun is, and where the
//! day/night boundary falls on each raster row.
//!
//! ## Pipeline
//!
//! 1. **Instant**: a UTC civil date/time, from the system clock or a fixture
//! 2. **Ephemeris**: [`ephemeris::sun_position`] turns its Julian date into a
//!    [`SunPosition`] (right ascension, declination, radius vector, sub-solar
//!    longitude)
//! 3. **Terminator**: [`terminator::project_terminator`] turns the declination
//!    and the raster size into a [`WidthTable`]
//! 4. **Render**: [`renderer`] shades each row around the sub-solar column
//!
//! Both computation stages are pure functions of their inputs. Nothing is
//! cached between calls and nothing is shared, so a map can be recomputed from
//! any thread at any time.
//!
//! ## Core Types
//!
//! - [`Instant`]: UTC calendar fields, second resolution
//! - [`SunPosition`]: the ephemeris result for one instant
//! - [`Observer`]: an optional position marker on the map
//! - [`SunMap`]: one complete snapshot (instant, sun, width table)

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod angle;
pub mod config;
pub mod ephemeris;
pub mod framebuffer;
pub mod renderer;
pub mod terminator;

pub use angle::{fix_angle, Degrees, Radians};
pub use ephemeris::{EphemerisError, JulianDate};
pub use terminator::WidthTable;

/// A UTC point in time with second resolution.
///
/// Fields are proleptic Gregorian calendar values; `month` is 1 = Jan … 12 = Dec.
///
/// # Example
/// ```
/// use sunmap_lib::Instant;
///
/// let j2000 = Instant::new(2000, 1, 1, 12, 0, 0);
/// assert_eq!(j2000.julian_date().0, 2451545.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instant {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl Instant {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        Utc::now().into()
    }

    /// Parse an RFC 3339 timestamp such as `2024-06-21T12:00:00Z`.
    ///
    /// Offsets are honoured and converted to UTC.
    pub fn parse_rfc3339(text: &str) -> Result<Self, chrono::ParseError> {
        let parsed = DateTime::parse_from_rfc3339(text)?;
        Ok(parsed.with_timezone(&Utc).into())
    }

    pub fn seconds_of_day(&self) -> u32 {
        self.hour * 3600 + self.minute * 60 + self.second
    }

    pub fn julian_date(&self) -> JulianDate {
        ephemeris::julian_date(self)
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(time: DateTime<Utc>) -> Self {
        Self::new(
            time.year(),
            time.month(),
            time.day(),
            time.hour(),
            time.minute(),
            // Leap seconds are reported as second 59 + 1e9 ns; clamp to the civil field.
            time.second().min(59),
        )
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Position of the sun for one instant.
///
/// - `right_ascension`: equatorial, `[0, 360)`
/// - `declination`: equatorial, `[-90, 90]` (in practice within ±23.45)
/// - `radius_vector`: Earth–Sun distance in AU (~0.983–1.017)
/// - `subsolar_longitude`: `[0, 360)`, measured eastward from the
///   antimeridian, so 180 means the sun stands over Greenwich. This is also the
///   sun's horizontal position on a map whose left edge is 180° W.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    pub right_ascension: Degrees,
    pub declination: Degrees,
    pub radius_vector: f64,
    pub subsolar_longitude: Degrees,
}

impl SunPosition {
    /// Geographic sub-solar point as (latitude, longitude), longitude in `[-180, 180)`.
    pub fn subsolar_point(&self) -> (Degrees, Degrees) {
        (
            self.declination,
            Degrees(self.subsolar_longitude.0 - 180.0),
        )
    }

    /// Elevation of the sun above the horizon of `observer`, ignoring refraction.
    pub fn elevation_at(&self, observer: &Observer) -> Degrees {
        let (sun_lat, sun_lon) = self.subsolar_point();
        let hour_angle = Degrees(observer.longitude.0 - sun_lon.0);
        let sin_elevation = observer.latitude.sin() * sun_lat.sin()
            + observer.latitude.cos() * sun_lat.cos() * hour_angle.cos();
        Radians(sin_elevation.clamp(-1.0, 1.0).asin()).to_degrees()
    }

    pub fn is_daylight_at(&self, observer: &Observer) -> bool {
        self.elevation_at(observer).0 > 0.0
    }
}

/// A location drawn as a marker on the map (the device's last GPS fix).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Degrees north of the equator
    pub latitude: Degrees,
    /// Degrees east of Greenwich
    pub longitude: Degrees,
}

/// Everything the renderer needs for one frame.
///
/// # Example
/// ```
/// use sunmap_lib::{Instant, SunMap};
///
/// let map = SunMap::compute(Instant::new(2024, 6, 21, 12, 0, 0), 360, 180, true).unwrap();
/// assert_eq!(map.widths.len(), 180);
/// assert!(map.sun.declination.0 > 23.0);
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct SunMap {
    pub instant: Instant,
    pub julian_date: JulianDate,
    pub sun: SunPosition,
    pub widths: WidthTable,
    pub width: u32,
    pub height: u32,
}

impl SunMap {
    /// Run the ephemeris and project the terminator onto a `width` x `height` raster.
    pub fn compute(
        instant: Instant,
        width: u32,
        height: u32,
        apparent: bool,
    ) -> Result<Self, EphemerisError> {
        let julian_date = instant.julian_date();
        let sun = ephemeris::sun_position(julian_date, apparent)?;
        let widths = terminator::project_terminator(sun.declination, width, height);
        log::debug!(
            "sun map for {}: dec {:.3}, sub-solar {:.3}, {}x{}",
            instant,
            sun.declination,
            sun.subsolar_longitude,
            width,
            height
        );

        Ok(Self {
            instant,
            julian_date,
            sun,
            widths,
            width,
            height,
        })
    }

    /// Raster column directly beneath the sun.
    pub fn sun_column(&self) -> u32 {
        let column = (self.sun.subsolar_longitude.0 * f64::from(self.width) / 360.0).floor() as i64;
        column.rem_euclid(i64::from(self.width)) as u32
    }

    /// Raster row directly beneath the sun.
    pub fn sun_row(&self) -> u32 {
        latitude_to_row(self.sun.declination, self.height)
    }

    /// Whether pixel (`x`, `y`) lies on the day side.
    pub fn is_lit(&self, x: u32, y: u32) -> bool {
        renderer::lit_spans(
            self.widths.half_width(y as usize),
            self.sun_column(),
            self.width,
        )
        .iter()
        .any(|span| span.contains(&x))
    }
}

/// Raster column for a geographic longitude on a map spanning 180° W … 180° E.
pub fn longitude_to_column(longitude: Degrees, width: u32) -> u32 {
    let column = ((longitude.0 + 180.0) * f64::from(width) / 360.0).floor() as i64;
    column.rem_euclid(i64::from(width)) as u32
}

/// Raster row for a geographic latitude, north at row 0.
pub fn latitude_to_row(latitude: Degrees, height: u32) -> u32 {
    let row = ((90.0 - latitude.0) * f64::from(height) / 180.0).floor() as i64;
    row.clamp(0, i64::from(height) - 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_instant_from_datetime() {
        let time = Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap();
        let instant = Instant::from(time);
        assert_eq!(instant, Instant::new(2024, 3, 20, 3, 6, 0));
        assert_eq!(instant.seconds_of_day(), 3 * 3600 + 6 * 60);
    }

    #[test]
    fn test_instant_parse_with_offset() {
        let instant = Instant::parse_rfc3339("2024-06-21T14:30:00+02:00").unwrap();
        assert_eq!(instant, Instant::new(2024, 6, 21, 12, 30, 0));
        assert!(Instant::parse_rfc3339("yesterday").is_err());
    }

    #[test]
    fn test_instant_display() {
        let instant = Instant::new(2024, 1, 3, 4, 5, 6);
        assert_eq!(instant.to_string(), "2024-01-03 04:05:06 UTC");
    }

    #[test]
    fn test_subsolar_point_at_noon_is_near_greenwich() {
        let map = SunMap::compute(Instant::new(2000, 1, 1, 12, 0, 0), 360, 180, true).unwrap();
        let (lat, lon) = map.sun.subsolar_point();
        assert!((lat.0 + 23.03).abs() < 0.05, "latitude {}", lat.0);
        // Equation of time puts the sun slightly east of Greenwich on Jan 1.
        assert!((0.0..2.0).contains(&lon.0), "longitude {}", lon.0);
        assert_eq!(map.sun_column(), 180);
    }

    #[test]
    fn test_elevation_at_subsolar_point_is_zenith() {
        let map = SunMap::compute(Instant::new(2024, 6, 21, 12, 0, 0), 360, 180, true).unwrap();
        let (lat, lon) = map.sun.subsolar_point();
        let overhead = Observer {
            latitude: lat,
            longitude: lon,
        };
        assert!((map.sun.elevation_at(&overhead).0 - 90.0).abs() < 1e-4);

        let antipode = Observer {
            latitude: Degrees(-lat.0),
            longitude: Degrees(lon.0 + 180.0),
        };
        assert!((map.sun.elevation_at(&antipode).0 + 90.0).abs() < 1e-4);
        assert!(map.sun.is_daylight_at(&overhead));
        assert!(!map.sun.is_daylight_at(&antipode));
    }

    #[test]
    fn test_midnight_sun_in_arctic_summer() {
        // Tromsø at local midnight near the June solstice
        let map = SunMap::compute(Instant::new(2024, 6, 21, 23, 0, 0), 360, 180, true).unwrap();
        let tromso = Observer {
            latitude: Degrees(69.65),
            longitude: Degrees(18.96),
        };
        assert!(map.sun.is_daylight_at(&tromso));
    }

    #[test]
    fn test_is_lit_matches_sun_and_antipode() {
        let map = SunMap::compute(Instant::new(2024, 9, 22, 12, 0, 0), 360, 181, true).unwrap();
        assert!(map.is_lit(map.sun_column(), map.sun_row()));
        let anti_column = (map.sun_column() + 180) % 360;
        assert!(!map.is_lit(anti_column, 90));
    }

    #[test]
    fn test_raster_coordinate_helpers() {
        assert_eq!(longitude_to_column(Degrees(-180.0), 360), 0);
        assert_eq!(longitude_to_column(Degrees(0.0), 360), 180);
        assert_eq!(longitude_to_column(Degrees(180.0), 360), 0);
        assert_eq!(latitude_to_row(Degrees(90.0), 180), 0);
        assert_eq!(latitude_to_row(Degrees(0.0), 180), 90);
        assert_eq!(latitude_to_row(Degrees(-90.0), 180), 179);
    }
}
