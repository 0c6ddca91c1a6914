use std::time::Duration;

use crate::domain::entities::{AttendanceDraft, AttendanceEvent, Role};
use crate::domain::errors::ScanError;
use crate::domain::ports::AttendanceLedger;
use crate::use_cases::storage::with_timeout;

pub const SCAN_METHOD: &str = "QR";

// Appends the next Entrance/Exit event for a person to their role's ledger.
pub struct RecordAttendanceUseCase<L> {
    pub ledger: L,
    pub storage_timeout: Duration,
}

impl<L> RecordAttendanceUseCase<L>
where
    L: AttendanceLedger,
{
    pub async fn execute(
        &self,
        role: Role,
        email: &str,
        name: &str,
        surname: &str,
    ) -> Result<AttendanceEvent, ScanError> {
        let draft = AttendanceDraft {
            name: name.to_string(),
            surname: surname.to_string(),
            email: email.to_string(),
            method: SCAN_METHOD.to_string(),
        };

        with_timeout(
            self.storage_timeout,
            "attendance append",
            self.ledger.append(role, draft),
        )
        .await
        .map_err(ScanError::StorageFailure)
    }
}
