//! Timecode and frame-rate helpers.
//!
//! Shared parsing and formatting that does not belong in any single public
//! module.

use std::time::Duration;

use crate::error::FramesiftError;

/// Parse a time value given as raw seconds (`"75"`, `"12.5"`) or as
/// `MM:SS` / `HH:MM:SS[.fff]`.
///
/// # Errors
///
/// Returns [`FramesiftError::InvalidTimecode`] for empty, negative,
/// malformed or unrepresentably large values.
pub fn parse_timecode(value: &str) -> Result<Duration, FramesiftError> {
    let trimmed = value.trim();
    let invalid = || FramesiftError::InvalidTimecode(value.to_string());
    if trimmed.is_empty() {
        return Err(invalid());
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid());
        }
        return Duration::try_from_secs_f64(seconds).map_err(|_| invalid());
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds_str) = match parts.as_slice() {
        [hours, minutes, seconds] => (
            hours.parse::<u64>().map_err(|_| invalid())?,
            minutes.parse::<u64>().map_err(|_| invalid())?,
            *seconds,
        ),
        [minutes, seconds] => (0, minutes.parse::<u64>().map_err(|_| invalid())?, *seconds),
        _ => return Err(invalid()),
    };

    let seconds = seconds_str.parse::<f64>().map_err(|_| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    let total_seconds = (hours as f64 * 3600.0) + (minutes as f64 * 60.0) + seconds;
    Duration::try_from_secs_f64(total_seconds).map_err(|_| invalid())
}

/// Render a duration as `HH:MM:SS.mmm`.
pub fn format_timecode(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = (total % 60) as f64 + f64::from(duration.subsec_millis()) / 1000.0;
    format!("{hours:02}:{minutes:02}:{seconds:06.3}")
}

/// Parse a probe frame rate such as `"30000/1001"` or `"25"` into frames
/// per second.
///
/// # Errors
///
/// Returns [`FramesiftError::InvalidFrameRate`] for malformed values and a
/// zero denominator.
pub fn parse_frame_rate(value: &str) -> Result<f64, FramesiftError> {
    let invalid = || FramesiftError::InvalidFrameRate(value.to_string());
    let trimmed = value.trim();

    let rate = match trimmed.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.trim().parse().map_err(|_| invalid())?;
            let denominator: f64 = denominator.trim().parse().map_err(|_| invalid())?;
            if denominator == 0.0 {
                return Err(invalid());
            }
            numerator / denominator
        }
        None => trimmed.parse().map_err(|_| invalid())?,
    };

    if rate.is_finite() && rate >= 0.0 {
        Ok(rate)
    } else {
        Err(invalid())
    }
}

/// Frame count implied by a frame rate and a duration in seconds, rounded
/// half-to-even.
pub fn frames_from_rate_and_duration(frames_per_second: f64, duration_seconds: f64) -> u64 {
    (frames_per_second * duration_seconds).round_ties_even().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        format_timecode, frames_from_rate_and_duration, parse_frame_rate, parse_timecode,
    };
    use crate::error::FramesiftError;

    #[test]
    fn parse_timecode_formats() {
        let seconds = parse_timecode("75").unwrap();
        assert_eq!(seconds.as_secs(), 75);

        let mm_ss = parse_timecode("01:15").unwrap();
        assert_eq!(mm_ss.as_secs(), 75);

        let hh_mm_ss = parse_timecode("00:01:15.5").unwrap();
        assert_eq!(hh_mm_ss.as_millis(), 75_500);

        assert!(parse_timecode("").is_err());
        assert!(parse_timecode("-3").is_err());
        assert!(parse_timecode("1:2:3:4").is_err());
        assert!(parse_timecode("aa:10").is_err());
    }

    #[test]
    fn parse_timecode_rejects_overflow() {
        for value in ["1e30", "99999999999999999:00:00", "00:00:1e300"] {
            assert!(
                matches!(parse_timecode(value), Err(FramesiftError::InvalidTimecode(_))),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn format_timecode_pads_fields() {
        assert_eq!(format_timecode(Duration::from_millis(3_723_250)), "01:02:03.250");
        assert_eq!(format_timecode(Duration::ZERO), "00:00:00.000");
    }

    #[test]
    fn parse_frame_rate_fraction_and_plain() {
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.970_029).abs() < 1e-5);
        assert_eq!(parse_frame_rate("25").unwrap(), 25.0);
        assert!(parse_frame_rate("25/0").is_err());
        assert!(parse_frame_rate("fast").is_err());
    }

    #[test]
    fn recount_rounds_half_to_even() {
        assert_eq!(frames_from_rate_and_duration(24.0, 10.0), 240);
        assert_eq!(frames_from_rate_and_duration(1.0, 2.5), 2);
        assert_eq!(frames_from_rate_and_duration(1.0, 3.5), 4);
    }
}
