// Use cases layer: the scan pipeline and its supporting workflows.

pub mod admission;
pub mod occupancy;
pub mod process_scan;
pub mod reader_token;
pub mod recent_events;
pub mod record_attendance;
pub mod resolve_identity;
pub mod validate_payload;

mod storage;
#[cfg(test)]
pub(crate) mod test_support;

pub use admission::{AdmissionDecision, AdmissionPolicy, OccupancyReading, SpecialCase};
pub use occupancy::OccupancyUseCase;
pub use process_scan::{ProcessScanUseCase, ScanOutcome};
pub use reader_token::{IssueReaderTokenUseCase, IssuedReaderToken, ReaderClaims, TokenError};
pub use recent_events::{RecentEventsError, RecentEventsUseCase};
pub use record_attendance::RecordAttendanceUseCase;
pub use resolve_identity::ResolveIdentityUseCase;
pub use validate_payload::validate_payload;
