//! Compass helpers for wind direction

const CARDINALS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Width of one compass sector in degrees
const SECTOR_DEGREES: f64 = 360.0 / 16.0;

/// Wrap any angle into [0, 360)
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Convert wind direction to a 16-point cardinal direction.
///
/// Each sector is 22.5° wide and centred on its label, so `N` covers
/// [348.75, 11.25).
#[must_use]
pub fn cardinal(degrees: f64) -> &'static str {
    let shifted = normalize_degrees(degrees) + SECTOR_DEGREES / 2.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let sector = (shifted / SECTOR_DEGREES).floor() as usize;
    CARDINALS[sector % CARDINALS.len()]
}

/// Check if an angle is within a directional range, handling 360-degree wraparound
#[must_use]
pub fn is_angle_in_range(angle: f64, start: f64, stop: f64) -> bool {
    let angle = normalize_degrees(angle);
    // a range given as 0..=360 means every direction
    if stop - start >= 360.0 {
        return true;
    }
    let start = normalize_degrees(start);
    let stop = normalize_degrees(stop);

    if start <= stop {
        angle >= start && angle <= stop
    } else {
        // Range wraps around 360/0 degrees
        angle >= start || angle <= stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "N")]
    #[case(90.0, "E")]
    #[case(180.0, "S")]
    #[case(270.0, "W")]
    #[case(45.0, "NE")]
    #[case(11.24, "N")]
    #[case(11.25, "NNE")]
    #[case(33.74, "NNE")]
    #[case(33.75, "NE")]
    #[case(348.74, "NNW")]
    #[case(348.75, "N")]
    #[case(359.9, "N")]
    #[case(360.0, "N")]
    #[case(-90.0, "W")]
    #[case(202.5, "SSW")]
    fn test_cardinal(#[case] degrees: f64, #[case] expected: &str) {
        assert_eq!(cardinal(degrees), expected);
    }

    #[test]
    fn test_cardinal_covers_every_label_in_order() {
        let labels: Vec<&str> = (0..16).map(|i| cardinal(f64::from(i) * 22.5)).collect();
        assert_eq!(labels, CARDINALS);
    }

    #[rstest]
    #[case(90.0, 45.0, 180.0, true)]
    #[case(45.0, 45.0, 180.0, true)]
    #[case(180.0, 45.0, 180.0, true)]
    #[case(44.9, 45.0, 180.0, false)]
    #[case(200.0, 45.0, 180.0, false)]
    #[case(350.0, 337.5, 22.5, true)]
    #[case(10.0, 337.5, 22.5, true)]
    #[case(180.0, 337.5, 22.5, false)]
    #[case(123.0, 0.0, 360.0, true)]
    fn test_is_angle_in_range(
        #[case] angle: f64,
        #[case] start: f64,
        #[case] stop: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(is_angle_in_range(angle, start, stop), expected);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-10.0), 350.0);
        assert_eq!(normalize_degrees(0.0), 0.0);
    }
}
