use serde::{Deserialize, Serialize};

use crate::domain::elapsed::ElapsedTime;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Slack mention markup, e.g. `<@U123>`.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single active block, if any.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub blocker: UserId,
    pub blocked: UserId,
    pub blocked_at_epoch_seconds: i64,
}

impl BlockRecord {
    pub fn new(blocker: UserId, blocked: UserId, blocked_at_epoch_seconds: i64) -> Self {
        Self { blocker, blocked, blocked_at_epoch_seconds }
    }

    pub fn elapsed(&self, now_epoch_seconds: i64) -> ElapsedTime {
        ElapsedTime::between(self.blocked_at_epoch_seconds, now_epoch_seconds)
    }
}

/// Cumulative seconds a user has spent on each side of a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTotals {
    pub total_time_blocked: u64,
    pub total_time_blocking: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockRole {
    Blocked,
    Blocking,
}

impl BlockRole {
    pub fn as_field(self) -> &'static str {
        match self {
            Self::Blocked => "total_time_blocked",
            Self::Blocking => "total_time_blocking",
        }
    }
}
