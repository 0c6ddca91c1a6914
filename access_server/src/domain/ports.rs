use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::entities::{AttendanceDraft, AttendanceEvent, Person, Role};

// Port for reading the two allow-lists. Only active records are returned.
#[async_trait]
pub trait PersonDirectory: Send + Sync {
    async fn find_active(&self, role: Role, email: &str) -> Result<Option<Person>, String>;
}

// Port for the per-role attendance ledgers.
#[async_trait]
pub trait AttendanceLedger: Send + Sync {
    // Appends the person's next event. Under one per-(role, email) critical section
    // the implementation stamps the lab-local date and time, counts that day's prior
    // events and inserts, so time order and parity can never disagree.
    async fn append(&self, role: Role, draft: AttendanceDraft)
    -> Result<AttendanceEvent, String>;

    // Events of one day in ascending time order.
    async fn events_on(&self, role: Role, date: NaiveDate) -> Result<Vec<AttendanceEvent>, String>;

    // Newest events first.
    async fn recent(&self, role: Role, limit: i64) -> Result<Vec<AttendanceEvent>, String>;
}

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
