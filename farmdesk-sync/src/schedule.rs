//! When a replication attempt is due.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often the scheduler wakes up, and how stale the last successful
/// sync must be before it pushes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulePolicy {
    pub check_interval: Duration,
    pub due_after: Duration,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(15 * 60),
            due_after: Duration::from_secs(60 * 60),
        }
    }
}

impl SchedulePolicy {
    pub fn is_due(&self, last_sync: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        is_due(last_sync, now, self.due_after)
    }

    /// Earliest time the next attempt becomes due, `None` if it already is.
    pub fn next_due(
        &self,
        last_sync: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if self.is_due(last_sync, now) {
            return None;
        }
        let due_after = TimeDelta::from_std(self.due_after).ok()?;
        last_sync.map(|last| last + due_after)
    }
}

/// `true` when there has never been a successful sync, or when at least
/// `due_after` has elapsed since the last one.
///
/// A `last_sync` later than `now` (clock moved backwards) is not due.
pub fn is_due(last_sync: Option<DateTime<Utc>>, now: DateTime<Utc>, due_after: Duration) -> bool {
    let Some(last) = last_sync else {
        return true;
    };
    match (now - last).to_std() {
        Ok(elapsed) => elapsed >= due_after,
        Err(_) => false,
    }
}
