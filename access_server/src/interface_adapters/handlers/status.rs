use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, Uri},
};

use crate::domain::entities::Role;
use crate::domain::ports::Clock;
use crate::interface_adapters::handlers::{SERVICE_NAME, error_response, lab_timestamp};
use crate::interface_adapters::protocol::{
    DbTestResponse, ErrorResponse, HealthResponse, OccupancyResponse, PresentAssistantDto,
    RecentEventDto, RecentQuery, RecentResponse, VersionResponse,
};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::interface_adapters::stores;
use crate::use_cases::{OccupancyUseCase, RecentEventsError, RecentEventsUseCase};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// Who is inside right now, for the door panel and dashboards.
#[tracing::instrument(name = "assistants_status", skip_all)]
pub async fn assistants_status(
    State(state): State<AppState>,
) -> Result<Json<OccupancyResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = OccupancyUseCase {
        ledger: state.ledger(),
        calendar: state.calendar,
        storage_timeout: state.storage_timeout,
    };

    let snapshot = use_case
        .currently_present(SystemClock.now())
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "failed to read occupancy");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error interno verificando estado de ayudantes",
            )
        })?;

    tracing::debug!(count = snapshot.count(), "assistant occupancy");

    Ok(Json(OccupancyResponse {
        success: true,
        assistants_present: !snapshot.is_empty(),
        count: snapshot.count(),
        assistants: snapshot
            .people
            .into_iter()
            .map(|person| PresentAssistantDto {
                email: person.email,
                nombre: person.name,
                apellido: person.surname,
                hora_entrada: person.since.format("%H:%M:%S").to_string(),
            })
            .collect(),
        timestamp: lab_timestamp(&state),
    }))
}

// Newest ledger entries, assistant ledger unless `role` selects another.
pub async fn recent_events(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<RecentResponse>, (StatusCode, Json<ErrorResponse>)> {
    let role = match query.role.as_deref() {
        None => Role::Assistant,
        Some(value) => Role::parse(value)
            .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Tipo de usuario no válido"))?,
    };

    let use_case = RecentEventsUseCase {
        ledger: state.ledger(),
        storage_timeout: state.storage_timeout,
    };

    let events = use_case
        .execute(role, query.limit)
        .await
        .map_err(|err| match err {
            RecentEventsError::InvalidLimit => error_response(
                StatusCode::BAD_REQUEST,
                "El límite debe estar entre 1 y 100",
            ),
            RecentEventsError::StorageFailure(message) => {
                tracing::error!(error = %message, "failed to read recent events");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error obteniendo registros")
            }
        })?;

    let data: Vec<RecentEventDto> = events
        .into_iter()
        .map(|event| RecentEventDto {
            id: event.id,
            fecha: event.date.format("%Y-%m-%d").to_string(),
            hora: event.time.format("%H:%M:%S").to_string(),
            dia: event.weekday_label,
            nombre: event.name,
            apellido: event.surname,
            email: event.email,
            metodo: event.method,
            tipo: event.event_type.label(),
        })
        .collect();

    Ok(Json(RecentResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: lab_timestamp(&state),
        service: SERVICE_NAME,
        version: VERSION,
    })
}

pub async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        success: true,
        service: SERVICE_NAME,
        version: VERSION,
        timestamp: lab_timestamp(&state),
    })
}

pub async fn db_test(
    State(state): State<AppState>,
) -> Result<Json<DbTestResponse>, (StatusCode, Json<ErrorResponse>)> {
    let probe = tokio::time::timeout(state.storage_timeout, stores::ping(&state.db)).await;

    match probe {
        Ok(Ok(())) => Ok(Json(DbTestResponse {
            success: true,
            message: "Conexión a base de datos exitosa",
            timestamp: lab_timestamp(&state),
        })),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "database probe failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error conectando a base de datos",
            ))
        }
        Err(_) => {
            tracing::error!("database probe timed out");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error conectando a base de datos",
            ))
        }
    }
}

pub async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            message: "Endpoint no encontrado".to_string(),
            path: Some(uri.to_string()),
        }),
    )
}
