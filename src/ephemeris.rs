//! Low-precision solar ephemeris
//!
//! Classical mean-element theory of the sun (Newcomb's elements referred to
//! the 1900 epoch) with a one-term nutation and aberration correction.
//! Accuracy: about 0.01° in longitude for dates within a few centuries of
//! 1900; plenty for placing a terminator on a phone-sized world map.
//!
//! All angles cross function boundaries as [`Degrees`] or [`Radians`]; the
//! published polynomials are in degrees, the trigonometry in radians.

use crate::angle::{fix_angle, Degrees, Radians};
use crate::{Instant, SunPosition};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Julian date of the 1900 January 0.5 epoch the element polynomials refer to.
const EPOCH_1900: f64 = 2_415_020.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Residual of Kepler's equation (radians) accepted as converged.
pub const KEPLER_TOLERANCE: f64 = 1e-6;
/// Newton iterations allowed before giving up.
pub const KEPLER_MAX_ITERATIONS: usize = 100;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    /// Newton iteration for the eccentric anomaly never met [`KEPLER_TOLERANCE`].
    #[error("Kepler's equation did not converge after {iterations} iterations (M = {mean_anomaly}°, e = {eccentricity})")]
    KeplerDiverged {
        mean_anomaly: f64,
        eccentricity: f64,
        iterations: usize,
    },
}

/// Continuous day count; whole days begin at noon UT.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JulianDate(pub f64);

impl JulianDate {
    /// Julian centuries elapsed since the 1900 epoch.
    fn centuries_since_1900(self) -> f64 {
        (self.0 - EPOCH_1900) / DAYS_PER_JULIAN_CENTURY
    }
}

/// Convert a proleptic-Gregorian UTC instant to a Julian date.
///
/// Integer day number first, with the year starting in March so the leap day
/// falls at the end; then the time of day as a fraction. Not meaningful before
/// the 1582 calendar reform.
pub fn julian_date(instant: &Instant) -> JulianDate {
    // March = 0 … December = 9, January/February = 10/11 of the previous year
    let (year, month) = if instant.month > 2 {
        (i64::from(instant.year), i64::from(instant.month) - 3)
    } else {
        (i64::from(instant.year) - 1, i64::from(instant.month) + 9)
    };
    let century = year / 100;
    let year_in_century = year - 100 * century;

    let day_number = i64::from(instant.day)
        + (century * 146_097) / 4
        + (year_in_century * 1_461) / 4
        + (month * 153 + 2) / 5
        + 1_721_119;

    JulianDate((day_number as f64 - 0.5) + f64::from(instant.seconds_of_day()) / SECONDS_PER_DAY)
}

/// Solve Kepler's equation `E - e·sin(E) = M` for the eccentric anomaly.
///
/// Newton-Raphson from `E₀ = M`. For the Earth's orbit (e ≈ 0.0167) this
/// settles in three or four steps.
///
/// # Errors
/// [`EphemerisError::KeplerDiverged`] after [`KEPLER_MAX_ITERATIONS`] steps
/// without the residual dropping below [`KEPLER_TOLERANCE`] (only reachable
/// with non-finite or wildly unphysical inputs).
pub fn kepler_solve(mean_anomaly: Degrees, eccentricity: f64) -> Result<Radians, EphemerisError> {
    let m = mean_anomaly.to_radians().0;
    let mut e_anomaly = m;

    for iteration in 0..KEPLER_MAX_ITERATIONS {
        let residual = e_anomaly - eccentricity * e_anomaly.sin() - m;
        if residual.abs() < KEPLER_TOLERANCE {
            log::trace!("kepler converged after {iteration} iterations");
            return Ok(Radians(e_anomaly));
        }
        e_anomaly -= residual / (1.0 - eccentricity * e_anomaly.cos());
    }

    Err(EphemerisError::KeplerDiverged {
        mean_anomaly: mean_anomaly.0,
        eccentricity,
        iterations: KEPLER_MAX_ITERATIONS,
    })
}

/// Greenwich Mean Sidereal Time in hours, `[0, 24)`.
pub fn gmst(jd: JulianDate) -> f64 {
    let midnight = (jd.0 + 0.5).floor() - 0.5;
    let t = (midnight - EPOCH_1900) / DAYS_PER_JULIAN_CENTURY;
    let theta0 = 6.646_065_6 + 2_400.051_262 * t + 0.000_025_81 * t * t;
    let day_fraction = (jd.0 + 0.5) - (jd.0 + 0.5).floor();

    fold_hours(theta0 + day_fraction * 24.0 * 1.002_737_908)
}

/// Fold into `[0, 24)`; a tiny negative input rounds up to 24 under
/// `rem_euclid` and maps to 0.
fn fold_hours(hours: f64) -> f64 {
    let folded = hours.rem_euclid(24.0);
    if folded >= 24.0 {
        0.0
    } else {
        folded
    }
}

/// Position of the sun at `jd`.
///
/// With `apparent` set, the longitude and obliquity are corrected for
/// nutation and aberration (the position an observer would actually see);
/// otherwise the true geometric position is returned.
///
/// # Errors
/// Propagates [`EphemerisError`] from [`kepler_solve`].
pub fn sun_position(jd: JulianDate, apparent: bool) -> Result<SunPosition, EphemerisError> {
    let t = jd.centuries_since_1900();
    let t2 = t * t;
    let t3 = t2 * t;

    let mean_longitude = fix_angle(Degrees(279.696_68 + 36_000.768_92 * t + 0.000_302_5 * t2));
    let mean_anomaly = fix_angle(Degrees(
        358.475_83 + 35_999.049_75 * t - 0.000_150 * t2 - 0.000_003_3 * t3,
    ));
    let eccentricity = 0.016_751_04 - 0.000_041_8 * t - 0.000_000_126 * t2;

    let eccentric_anomaly = kepler_solve(mean_anomaly, eccentricity)?;
    let true_anomaly = fix_angle(
        Radians(
            2.0 * (((1.0 + eccentricity) / (1.0 - eccentricity)).sqrt()
                * Radians(eccentric_anomaly.0 / 2.0).tan())
            .atan(),
        )
        .to_degrees(),
    );

    let mut longitude = Degrees(mean_longitude.0 + true_anomaly.0 - mean_anomaly.0);
    let mut obliquity = Degrees(23.452_294 - 0.013_012_5 * t - 0.000_001_64 * t2 + 0.000_000_503 * t3);

    if apparent {
        let node = fix_angle(Degrees(259.18 - 1_934.142 * t));
        longitude.0 -= 0.005_69 + 0.004_79 * node.sin();
        obliquity.0 += 0.002_56 * node.cos();
    }

    let radius_vector =
        1.000_000_2 * (1.0 - eccentricity * eccentricity) / (1.0 + eccentricity * true_anomaly.cos());
    let right_ascension = fix_angle(
        Radians((obliquity.cos() * longitude.sin()).atan2(longitude.cos())).to_degrees(),
    );
    let declination = Radians((obliquity.sin() * longitude.sin()).asin()).to_degrees();
    let subsolar_longitude = fix_angle(Degrees(180.0 + right_ascension.0 - gmst(jd) * 15.0));

    Ok(SunPosition {
        right_ascension,
        declination,
        radius_vector,
        subsolar_longitude,
    })
}
