use axum::{Json, extract::State, http::StatusCode};

use crate::interface_adapters::handlers::error_response;
use crate::interface_adapters::protocol::{ErrorResponse, ReaderTokenResponse};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::{IssueReaderTokenUseCase, TokenError};

// Handler for issuing the rotating token shown on a reader display.
pub async fn reader_token(
    State(state): State<AppState>,
) -> Result<Json<ReaderTokenResponse>, (StatusCode, Json<ErrorResponse>)> {
    let use_case = IssueReaderTokenUseCase {
        clock: SystemClock,
        secret: state.reader.secret.clone(),
        ttl_seconds: state.reader.ttl_seconds,
        station_id: state.reader.station_id.clone(),
    };

    let issued = use_case.execute().map_err(|err| match err {
        TokenError::MissingSecret => {
            tracing::error!("READER_QR_SECRET is not configured");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuración inválida: falta READER_QR_SECRET",
            )
        }
        TokenError::Signing(message) => {
            tracing::error!(error = %message, "failed to sign reader token");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error generando token")
        }
    })?;

    Ok(Json(ReaderTokenResponse {
        success: true,
        token: issued.token,
        station_id: issued.station_id,
        expires_in: issued.expires_in,
    }))
}
