use std::fmt;

/// Non-negative span of whole seconds, displayed as `HH:MM:SS`.
///
/// Hours keep growing past 24, so a block that has lasted four days reads
/// `96:00:00` rather than wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ElapsedTime(u64);

impl ElapsedTime {
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// `|now - started|`; a start time in the future still yields a positive span.
    pub fn between(started_epoch_seconds: i64, now_epoch_seconds: i64) -> Self {
        Self(now_epoch_seconds.abs_diff(started_epoch_seconds))
    }

    pub fn as_secs(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0 / 3_600;
        let minutes = (self.0 % 3_600) / 60;
        let seconds = self.0 % 60;
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}
