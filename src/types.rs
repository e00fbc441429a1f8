use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

/// What the loop does after a successful rebuild.
///
/// - `Normal`: (re)start the configured program as a long-running child.
/// - `Test`: run the test command to completion instead; nothing is left
///   running between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RunMode {
    #[default]
    Normal,
    Test,
}

/// Which change-detection backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    /// Scan directory modification times on every poll.
    #[default]
    Poll,
    /// Collect events from the platform file watcher between polls.
    Notify,
}

impl FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "poll" => Ok(DetectorKind::Poll),
            "notify" => Ok(DetectorKind::Notify),
            other => Err(format!(
                "invalid detector: {other} (expected \"poll\" or \"notify\")"
            )),
        }
    }
}

/// Parse a simple duration string like `"200ms"`, `"1s"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_duration("200ms"), Ok(Duration::from_millis(200)));
        assert_eq!(parse_duration("1s"), Ok(Duration::from_secs(1)));
        assert_eq!(parse_duration(" 2m "), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("200").is_err());
        assert!(parse_duration("ms").is_err());
        assert!(parse_duration("5 days").is_err());
    }

    #[test]
    fn huge_minute_and_hour_values_are_out_of_range() {
        let err = parse_duration("400000000000000000h").unwrap_err();
        assert!(err.contains("out of range"), "unexpected error: {err}");
        assert!(parse_duration("400000000000000000m").is_err());
        // Still fits once multiplied.
        assert_eq!(
            parse_duration("5124095576030431h"),
            Ok(Duration::from_secs(5_124_095_576_030_431 * 3600))
        );
    }

    #[test]
    fn detector_kind_from_str() {
        assert_eq!("poll".parse::<DetectorKind>(), Ok(DetectorKind::Poll));
        assert_eq!(" Notify ".parse::<DetectorKind>(), Ok(DetectorKind::Notify));
        assert!("inotify".parse::<DetectorKind>().is_err());
    }
}
