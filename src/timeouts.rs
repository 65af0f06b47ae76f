//! Engine timeout configuration.
//!
//! The engine enforces one overall request timeout, given either as
//! `timeoutSeconds` or `timeoutMilliseconds`. A non-zero millisecond value
//! takes precedence over the seconds value. No caller-side timer exists: a
//! request suspended in the engine finishes when the engine says so.

use std::time::Duration;

/// Overall request timeout as the two payload fields the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    pub seconds: u64,
    pub milliseconds: u64,
}

impl Timeout {
    /// Engine default: 60 seconds.
    pub fn api_defaults() -> Self {
        Self { seconds: 60, milliseconds: 0 }
    }

    /// Split a duration into the payload fields.
    ///
    /// Whole seconds go to `seconds`; anything with a sub-second part is sent
    /// as milliseconds so precision is not lost.
    pub fn from_duration(duration: Duration) -> Self {
        if duration.subsec_millis() == 0 {
            Self { seconds: duration.as_secs(), milliseconds: 0 }
        } else {
            Self {
                seconds: 0,
                milliseconds: duration.as_millis().min(u64::MAX as u128) as u64,
            }
        }
    }

    /// Timeout the engine will actually apply.
    pub fn effective(&self) -> Duration {
        if self.milliseconds > 0 {
            Duration::from_millis(self.milliseconds)
        } else {
            Duration::from_secs(self.seconds)
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::api_defaults()
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Self::from_duration(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_defaults() {
        let t = Timeout::api_defaults();
        assert_eq!(t.seconds, 60);
        assert_eq!(t.milliseconds, 0);
        assert_eq!(t.effective(), Duration::from_secs(60));
    }

    #[test]
    fn test_whole_seconds_use_seconds_field() {
        let t = Timeout::from_duration(Duration::from_secs(10));
        assert_eq!(t, Timeout { seconds: 10, milliseconds: 0 });
    }

    #[test]
    fn test_sub_second_precision_uses_milliseconds() {
        let t = Timeout::from_duration(Duration::from_millis(2500));
        assert_eq!(t, Timeout { seconds: 0, milliseconds: 2500 });
        assert_eq!(t.effective(), Duration::from_millis(2500));
    }

    #[test]
    fn test_milliseconds_take_precedence() {
        let t = Timeout { seconds: 30, milliseconds: 750 };
        assert_eq!(t.effective(), Duration::from_millis(750));
    }
}
