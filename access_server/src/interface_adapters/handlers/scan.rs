use axum::{Json, extract::State, http::StatusCode};
use chrono::SecondsFormat;

use crate::domain::door::DoorCommand;
use crate::domain::entities::Role;
use crate::domain::errors::ScanError;
use crate::interface_adapters::handlers::{lab_timestamp, special_message};
use crate::interface_adapters::protocol::{DoorDecisionDto, ProcessScanRequest, ScanResponse};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::{ProcessScanUseCase, ScanOutcome};

const INTERNAL_MESSAGE_LIMIT: usize = 50;

// Handler for a decoded QR submitted by a reader.
#[tracing::instrument(name = "process_scan", skip_all)]
pub async fn process_scan(
    State(state): State<AppState>,
    Json(body): Json<ProcessScanRequest>,
) -> (StatusCode, Json<ScanResponse>) {
    let Some(raw) = body.qr_data.filter(|value| !value.is_null()) else {
        return rejection(&state, StatusCode::BAD_REQUEST, "Datos QR requeridos".to_string());
    };

    let use_case = ProcessScanUseCase::new(
        SystemClock,
        state.directory(),
        state.ledger(),
        state.calendar,
        state.policy,
        state.storage_timeout,
    );

    match use_case.execute(&raw).await {
        Ok(outcome) => {
            tracing::info!(
                email = %outcome.person.email,
                role = outcome.person.role.code(),
                event = outcome.event.event_type.label(),
                registro_id = outcome.event.id,
                door = outcome.decision.authorized,
                reason = outcome.decision.reason,
                "scan recorded"
            );
            if outcome.decision.authorized {
                spawn_door_open(&state, &outcome);
            }
            (StatusCode::OK, Json(success_response(outcome)))
        }
        Err(err) => map_scan_error(&state, err),
    }
}

// The door is actuated out of band so relay latency or failure never changes the verdict.
fn spawn_door_open(state: &AppState, outcome: &ScanOutcome) {
    let door = state.door.clone();
    let command = DoorCommand {
        role: outcome.person.role,
        display_name: outcome.person.display_name(),
    };
    tokio::spawn(async move {
        let actor = command.display_name.clone();
        match door.open(command).await {
            Ok(()) => tracing::info!(%actor, "door opened"),
            Err(err) => tracing::error!(%actor, error = %err, "door actuation failed"),
        }
    });
}

fn success_response(outcome: ScanOutcome) -> ScanResponse {
    let ScanOutcome {
        person,
        event,
        decision,
        processed_at,
    } = outcome;

    ScanResponse {
        success: true,
        message: person.display_name(),
        tipo: Some(event.event_type.label()),
        usuario_tipo: Some(person.role.code()),
        fecha: Some(event.date.format("%Y-%m-%d").to_string()),
        hora: Some(event.time.format("%H:%M:%S").to_string()),
        timestamp: processed_at.to_rfc3339_opts(SecondsFormat::Secs, false),
        registro_id: Some(event.id),
        door: Some(DoorDecisionDto {
            should_open: decision.authorized,
            reason: decision.reason,
            assistants_present: decision.assistants_present,
            special_message: decision.special_case.map(special_message),
        }),
        ..ScanResponse::default()
    }
}

fn map_scan_error(state: &AppState, err: ScanError) -> (StatusCode, Json<ScanResponse>) {
    match err {
        ScanError::Invalid(reason) => {
            tracing::info!(reason = %reason, "scan rejected");
            rejection(state, StatusCode::BAD_REQUEST, reason.message().to_string())
        }
        ScanError::NotFound {
            email,
            claimed_role,
        } => {
            tracing::warn!(%email, claimed_role = claimed_role.code(), "unauthorized scan");
            let (message, error_type) = match claimed_role {
                Role::Student => (
                    "Estudiante no registrado - solicita ser agregado",
                    "ESTUDIANTE_NO_REGISTRADO",
                ),
                Role::Assistant => ("No Autorizado", "USUARIO_NO_AUTORIZADO"),
            };
            let (status, Json(mut response)) =
                rejection(state, StatusCode::BAD_REQUEST, message.to_string());
            response.email = Some(email);
            response.error_type = Some(error_type);
            (status, Json(response))
        }
        ScanError::StorageFailure(message) => {
            tracing::error!(error = %message, "scan aborted by storage failure");
            let truncated: String = message.chars().take(INTERNAL_MESSAGE_LIMIT).collect();
            rejection(
                state,
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error interno: {truncated}"),
            )
        }
    }
}

fn rejection(
    state: &AppState,
    status: StatusCode,
    message: String,
) -> (StatusCode, Json<ScanResponse>) {
    (
        status,
        Json(ScanResponse {
            success: false,
            message,
            timestamp: lab_timestamp(state),
            ..ScanResponse::default()
        }),
    )
}
