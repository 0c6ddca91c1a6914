use axum::{Json, extract::State, http::StatusCode};

use crate::domain::door::DoorCommand;
use crate::domain::entities::{EventType, Role};
use crate::domain::ports::Clock;
use crate::interface_adapters::handlers::{error_response, lab_timestamp, special_message};
use crate::interface_adapters::protocol::{
    CheckAndOpenRequest, CheckAndOpenResponse, ErrorResponse, OpenDoorRequest, OpenDoorResponse,
};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::{OccupancyReading, OccupancyUseCase};

const INVALID_USER_TYPE: &str = "Tipo de usuario no válido";

// Opens the door for a caller that already holds an authorization.
#[tracing::instrument(
    name = "open_door",
    skip_all,
    fields(user_type = ?body.user_type, authorized = body.authorized)
)]
pub async fn open_door(
    State(state): State<AppState>,
    Json(body): Json<OpenDoorRequest>,
) -> Result<Json<OpenDoorResponse>, (StatusCode, Json<ErrorResponse>)> {
    if !body.authorized {
        tracing::warn!("unauthorized door open attempt");
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Apertura de puerta no autorizada",
        ));
    }

    let user_type = body.user_type.unwrap_or_default();
    let user_name = body.user_name.unwrap_or_default();
    let role = Role::parse(&user_type)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, INVALID_USER_TYPE))?;

    state
        .door
        .open(DoorCommand {
            role,
            display_name: user_name.clone(),
        })
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "failed to open door");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.message())
        })?;

    tracing::info!(actor = %user_name, "door opened");

    Ok(Json(OpenDoorResponse {
        success: true,
        message: "Puerta abierta exitosamente".to_string(),
        user_type,
        user_name,
        timestamp: lab_timestamp(&state),
    }))
}

// Runs the admission policy for an explicit role/action pair and opens the door
// when it allows entry. Door failures are reported beside the verdict.
#[tracing::instrument(
    name = "check_and_open",
    skip_all,
    fields(user_type = %body.user_type, action_type = %body.action_type, user_email = ?body.user_email)
)]
pub async fn check_and_open(
    State(state): State<AppState>,
    Json(body): Json<CheckAndOpenRequest>,
) -> Result<Json<CheckAndOpenResponse>, (StatusCode, Json<ErrorResponse>)> {
    if body.user_type.trim().is_empty()
        || body.user_name.trim().is_empty()
        || body.action_type.trim().is_empty()
    {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Datos requeridos: userType, userName, actionType",
        ));
    }

    let event_type = EventType::parse(&body.action_type)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "actionType inválido"))?;

    let Some(role) = Role::parse(&body.user_type) else {
        tracing::warn!("invalid user type for door check");
        return Ok(Json(CheckAndOpenResponse {
            success: true,
            authorized: false,
            reason: INVALID_USER_TYPE,
            user_type: body.user_type,
            user_name: body.user_name,
            action_type: body.action_type,
            door_opened: false,
            door_error: None,
            special_message: None,
            timestamp: lab_timestamp(&state),
        }));
    };

    let occupancy = OccupancyUseCase {
        ledger: state.ledger(),
        calendar: state.calendar,
        storage_timeout: state.storage_timeout,
    };
    let reading = match occupancy.currently_present(SystemClock.now()).await {
        Ok(snapshot) => OccupancyReading::Present(snapshot.count()),
        Err(err) => {
            tracing::error!(error = %err, "occupancy unavailable");
            OccupancyReading::Unavailable
        }
    };
    let decision = state.policy.decide(role, event_type, reading);

    let mut door_opened = false;
    let mut door_error = None;
    if decision.authorized {
        let command = DoorCommand {
            role,
            display_name: body.user_name.clone(),
        };
        match state.door.open(command).await {
            Ok(()) => door_opened = true,
            Err(err) => {
                tracing::error!(error = %err, "failed to open door after authorization");
                door_error = Some(err.message());
            }
        }
    }

    tracing::info!(
        authorized = decision.authorized,
        reason = decision.reason,
        door_opened,
        "door check completed"
    );

    Ok(Json(CheckAndOpenResponse {
        success: true,
        authorized: decision.authorized,
        reason: decision.reason,
        user_type: body.user_type,
        user_name: body.user_name,
        action_type: body.action_type,
        door_opened,
        door_error,
        special_message: decision.special_case.map(special_message),
        timestamp: lab_timestamp(&state),
    }))
}
