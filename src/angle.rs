//! # Angle Units
//!
//! The solar formulas are published in degrees but every trigonometric call
//! wants radians. Each value carries its unit in its type so a forgotten
//! conversion fails to compile instead of producing a plausible wrong answer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An angle in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

/// An angle in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Radians(pub f64);

impl Degrees {
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }

    pub fn sin(self) -> f64 {
        self.to_radians().sin()
    }

    pub fn cos(self) -> f64 {
        self.to_radians().cos()
    }
}

impl Radians {
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }

    pub fn sin(self) -> f64 {
        self.0.sin()
    }

    pub fn cos(self) -> f64 {
        self.0.cos()
    }

    pub fn tan(self) -> f64 {
        self.0.tan()
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*}°", p, self.0),
            None => write!(f, "{}°", self.0),
        }
    }
}

/// Normalize any finite angle to `[0, 360)`.
///
/// Equivalent to `a - 360 * floor(a / 360)`. The remainder is taken with
/// `rem_euclid` so huge inputs stay in range, and a tiny negative input whose
/// sum with 360 rounds up to exactly 360 maps to 0.
pub fn fix_angle(angle: Degrees) -> Degrees {
    let folded = angle.0.rem_euclid(360.0);
    if folded >= 360.0 {
        Degrees(0.0)
    } else {
        Degrees(folded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_angle_basic_values() {
        assert_eq!(fix_angle(Degrees(0.0)), Degrees(0.0));
        assert_eq!(fix_angle(Degrees(360.0)), Degrees(0.0));
        assert_eq!(fix_angle(Degrees(725.0)), Degrees(5.0));
        assert_eq!(fix_angle(Degrees(-90.0)), Degrees(270.0));
        assert_eq!(fix_angle(Degrees(-720.0)), Degrees(0.0));
    }

    #[test]
    fn test_fix_angle_tiny_negative_stays_below_360() {
        let folded = fix_angle(Degrees(-1e-20));
        assert!((0.0..360.0).contains(&folded.0), "got {}", folded.0);
    }

    #[test]
    fn test_unit_round_trip() {
        let angle = Degrees(123.456);
        let back = angle.to_radians().to_degrees();
        assert!((back.0 - angle.0).abs() < 1e-12);
        assert!((Degrees(90.0).sin() - 1.0).abs() < 1e-15);
        assert!(Degrees(90.0).cos().abs() < 1e-15);
    }

    #[test]
    fn test_display_respects_precision() {
        assert_eq!(format!("{:.1}", Degrees(23.4393)), "23.4°");
    }
}
