//! Human-readable distance and duration strings for the directions panel.

/// Format a distance: kilometres with one decimal from 1000 m, whole metres
/// below.
///
/// # Examples
///
/// ```
/// use wayfinder_core::format_distance;
///
/// assert_eq!(format_distance(1234.0), "1.2 km");
/// assert_eq!(format_distance(349.6), "350 m");
/// ```
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{:.0} m", meters.max(0.0).round())
    }
}

/// Format a duration as `"H hr M min"` or `"M min"`, truncating seconds.
///
/// # Examples
///
/// ```
/// use wayfinder_core::format_duration;
///
/// assert_eq!(format_duration(3900.0), "1 hr 5 min");
/// assert_eq!(format_duration(59.0), "0 min");
/// ```
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        // Durations beyond u64 seconds are not meaningful for a route.
        seconds.floor() as u64
    } else {
        0
    };
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    if hours > 0 {
        format!("{hours} hr {minutes} min")
    } else {
        format!("{minutes} min")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0 m")]
    #[case(999.4, "999 m")]
    #[case(1000.0, "1.0 km")]
    #[case(15_340.0, "15.3 km")]
    fn formats_distances(#[case] meters: f64, #[case] expected: &str) {
        assert_eq!(format_distance(meters), expected);
    }

    #[rstest]
    #[case(0.0, "0 min")]
    #[case(600.0, "10 min")]
    #[case(7260.0, "2 hr 1 min")]
    #[case(-5.0, "0 min")]
    fn formats_durations(#[case] seconds: f64, #[case] expected: &str) {
        assert_eq!(format_duration(seconds), expected);
    }
}
