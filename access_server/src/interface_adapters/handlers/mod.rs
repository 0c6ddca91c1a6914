pub mod door;
pub mod reader;
pub mod scan;
pub mod status;

use axum::{Json, http::StatusCode};
use chrono::SecondsFormat;

use crate::domain::ports::Clock;
use crate::interface_adapters::protocol::{ErrorResponse, SpecialMessageDto};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::SpecialCase;

pub const SERVICE_NAME: &str = "QR Lector API";

// Helper to build a JSON error response.
pub(crate) fn error_response(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.into(),
            path: None,
        }),
    )
}

// Current instant in the lab timezone, formatted for responses.
pub(crate) fn lab_timestamp(state: &AppState) -> String {
    state
        .calendar
        .local(SystemClock.now())
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub(crate) fn special_message(case: SpecialCase) -> SpecialMessageDto {
    SpecialMessageDto {
        kind: case.code(),
        title: case.title(),
        message: case.message(),
        style: case.style(),
    }
}
