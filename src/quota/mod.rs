//! Monthly AI credit tracking.
//!
//! The state is reconciled lazily: every accessor first checks whether the
//! clock has reached `reset_date` and, if so, starts a fresh period. There is
//! no background timer, so a session left idle across a month boundary still
//! resets on its next read.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};

use crate::db::{self, KvStore, QUOTA_KEY};
use crate::models::{UsageQuota, USAGE_LIMIT};

/// First local midnight of the month after `now`, in UTC.
pub(crate) fn next_reset<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return now.with_timezone(&Utc);
    };
    match now.timezone().from_local_datetime(&first).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST jump; the naive instant is close enough.
        None => first.and_utc(),
    }
}

pub(crate) fn fresh<Tz: TimeZone>(now: &DateTime<Tz>) -> UsageQuota {
    UsageQuota {
        count: 0,
        reset_date: next_reset(now),
    }
}

/// Replace `state` with a fresh period once `now` has reached its reset date.
pub(crate) fn reconcile<Tz: TimeZone>(state: UsageQuota, now: &DateTime<Tz>) -> UsageQuota {
    if now.with_timezone(&Utc) >= state.reset_date {
        fresh(now)
    } else {
        state
    }
}

/// Consume one credit. At the limit the state is returned unchanged.
pub(crate) fn increment(state: UsageQuota, limit: u32) -> UsageQuota {
    if state.count < limit {
        UsageQuota {
            count: state.count + 1,
            ..state
        }
    } else {
        state
    }
}

pub(crate) fn is_limit_reached(state: &UsageQuota, limit: u32) -> bool {
    state.count >= limit
}

/// Usage quota backed by the key-value store. Never fails: unreadable or
/// unwritable state is logged and treated as a fresh period.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QuotaTracker {
    limit: u32,
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(USAGE_LIMIT)
    }
}

impl QuotaTracker {
    pub(crate) fn new(limit: u32) -> Self {
        Self { limit }
    }

    pub(crate) fn limit(&self) -> u32 {
        self.limit
    }

    pub(crate) fn state(&self, store: &dyn KvStore) -> UsageQuota {
        self.state_at(store, &Local::now())
    }

    pub(crate) fn state_at<Tz: TimeZone>(&self, store: &dyn KvStore, now: &DateTime<Tz>) -> UsageQuota {
        let stored: Option<UsageQuota> = db::load_json(store, QUOTA_KEY);
        let current = match stored {
            Some(state) => {
                let reconciled = reconcile(state, now);
                if reconciled != state {
                    tracing::info!(
                        previous_count = state.count,
                        reset_date = %reconciled.reset_date,
                        "usage period rolled over"
                    );
                    db::save_json(store, QUOTA_KEY, &reconciled);
                }
                reconciled
            }
            None => {
                let state = fresh(now);
                db::save_json(store, QUOTA_KEY, &state);
                state
            }
        };
        // A hand-edited store could hold more than the limit.
        UsageQuota {
            count: current.count.min(self.limit),
            ..current
        }
    }

    pub(crate) fn increment(&self, store: &dyn KvStore) -> UsageQuota {
        self.increment_at(store, &Local::now())
    }

    pub(crate) fn increment_at<Tz: TimeZone>(&self, store: &dyn KvStore, now: &DateTime<Tz>) -> UsageQuota {
        let state = self.state_at(store, now);
        let next = increment(state, self.limit);
        if next != state {
            db::save_json(store, QUOTA_KEY, &next);
            tracing::debug!(count = next.count, limit = self.limit, "AI credit consumed");
        } else {
            tracing::debug!(limit = self.limit, "increment ignored at limit");
        }
        next
    }

    pub(crate) fn is_limit_reached(&self, store: &dyn KvStore) -> bool {
        self.is_limit_reached_at(store, &Local::now())
    }

    pub(crate) fn is_limit_reached_at<Tz: TimeZone>(&self, store: &dyn KvStore, now: &DateTime<Tz>) -> bool {
        is_limit_reached(&self.state_at(store, now), self.limit)
    }
}
