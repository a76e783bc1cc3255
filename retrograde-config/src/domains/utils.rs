//! Duration parsing and serde defaults shared by the domains

use std::time::Duration;

/// Parse a human-readable duration such as `90s`, `5m` or `1h 30m`.
///
/// YAML durations go through `humantime_serde`, which accepts the same
/// syntax, so a run time reads the same in a file, an environment variable
/// and on the command line.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime::parse_duration(value.trim())
        .map_err(|e| format!("invalid duration '{}': {}", value.trim(), e))
}

pub fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration(" 5m ").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h 30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("soon").is_err());
    }
}
