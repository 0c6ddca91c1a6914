use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::calendar::LabCalendar;
use crate::domain::door::DoorActuator;
use crate::domain::ports::Clock;
use crate::interface_adapters::stores::{PostgresAttendanceLedger, PostgresPersonDirectory};
use crate::use_cases::AdmissionPolicy;

// Reader token settings shared with the token handler.
#[derive(Clone, Debug)]
pub struct ReaderTokenSettings {
    pub secret: Option<String>,
    pub ttl_seconds: u64,
    pub station_id: String,
}

// Application state shared by every request.
#[derive(Clone)]
pub struct AppState {
    // Shared database pool for allow-lists and ledgers.
    pub db: PgPool,
    // We use Arc<dyn Trait> to hold any door implementation (dependency injection).
    pub door: Arc<dyn DoorActuator>,
    pub calendar: LabCalendar,
    pub policy: AdmissionPolicy,
    pub storage_timeout: Duration,
    pub reader: ReaderTokenSettings,
}

impl AppState {
    pub fn directory(&self) -> PostgresPersonDirectory {
        PostgresPersonDirectory {
            db: self.db.clone(),
        }
    }

    pub fn ledger(&self) -> PostgresAttendanceLedger {
        PostgresAttendanceLedger {
            db: self.db.clone(),
            calendar: self.calendar,
        }
    }
}

// System clock adapter used by the use cases.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
