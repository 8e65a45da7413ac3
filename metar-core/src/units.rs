//! Unit conversions used when rendering decoded reports.
//!
//! Every function keeps full precision; callers round with [`display_round`]
//! only at the final render step.

const MPH_PER_KNOT: f64 = 1.15078;
const MB_PER_INHG: f64 = 33.8639;
const KNOTS_PER_MPS: f64 = 1.94384;
const METERS_PER_MILE: f64 = 1609.0;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn knots_to_mph(knots: f64) -> f64 {
    knots * MPH_PER_KNOT
}

pub fn inhg_to_millibar(inhg: f64) -> f64 {
    inhg * MB_PER_INHG
}

pub fn millibar_to_inhg(millibar: f64) -> f64 {
    millibar / MB_PER_INHG
}

pub fn mps_to_knots(mps: f64) -> f64 {
    mps * KNOTS_PER_MPS
}

/// Metres to statute miles, rounded to one decimal place.
pub fn meters_to_miles(meters: f64) -> f64 {
    (meters / METERS_PER_MILE * 10.0).round() / 10.0
}

/// Round half away from zero to the nearest integer.
pub fn display_round(value: f64) -> i64 {
    // f64::round already rounds half away from zero.
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-4.0, 25)]
    #[case(-17.0, 1)]
    #[case(9.0, 48)]
    #[case(32.0, 90)]
    #[case(0.0, 32)]
    fn fahrenheit_for_display(#[case] celsius: f64, #[case] expected: i64) {
        assert_eq!(display_round(celsius_to_fahrenheit(celsius)), expected);
    }

    #[rstest]
    #[case(8.0, 9)]
    #[case(15.0, 17)]
    #[case(25.0, 29)]
    #[case(35.0, 40)]
    fn mph_for_display(#[case] knots: f64, #[case] expected: i64) {
        assert_eq!(display_round(knots_to_mph(knots)), expected);
    }

    #[test]
    fn altimeter_to_millibar() {
        assert_eq!(display_round(inhg_to_millibar(30.34)), 1027);
    }

    #[test]
    fn millibar_to_altimeter() {
        let inhg = millibar_to_inhg(1015.0);
        assert!((inhg - 29.97).abs() < 0.01, "got {inhg}");
    }

    #[test]
    fn meters_round_to_one_decimal() {
        assert_eq!(meters_to_miles(8000.0), 5.0);
        assert_eq!(meters_to_miles(1200.0), 0.7);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(display_round(2.5), 3);
        assert_eq!(display_round(-2.5), -3);
        assert_eq!(display_round(-0.4), 0);
    }
}
