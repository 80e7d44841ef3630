use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monthly AI credit allowance.
pub(crate) const USAGE_LIMIT: u32 = 15;

/// Persisted AI credit usage for the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageQuota {
    pub(crate) count: u32,
    /// First instant of the next period; at or after this the count resets.
    pub(crate) reset_date: DateTime<Utc>,
}

impl UsageQuota {
    pub(crate) fn remaining(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.count)
    }
}
