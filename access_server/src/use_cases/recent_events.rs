use std::time::Duration;

use crate::domain::entities::{AttendanceEvent, Role};
use crate::domain::ports::AttendanceLedger;
use crate::use_cases::storage::with_timeout;

pub const DEFAULT_RECENT_LIMIT: i64 = 10;
pub const MAX_RECENT_LIMIT: i64 = 100;

#[derive(Debug, PartialEq, Eq)]
pub enum RecentEventsError {
    InvalidLimit,
    StorageFailure(String),
}

// Lists the newest events of one ledger for the kiosk display.
pub struct RecentEventsUseCase<L> {
    pub ledger: L,
    pub storage_timeout: Duration,
}

impl<L> RecentEventsUseCase<L>
where
    L: AttendanceLedger,
{
    pub async fn execute(
        &self,
        role: Role,
        limit: Option<i64>,
    ) -> Result<Vec<AttendanceEvent>, RecentEventsError> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);
        if !(1..=MAX_RECENT_LIMIT).contains(&limit) {
            return Err(RecentEventsError::InvalidLimit);
        }

        with_timeout(
            self.storage_timeout,
            "recent events read",
            self.ledger.recent(role, limit),
        )
        .await
        .map_err(RecentEventsError::StorageFailure)
    }
}
