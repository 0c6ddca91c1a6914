use serde::{Deserialize, Serialize};
use serde_json::Value;

// Request payload for scan processing. `qrData` is either the raw decoded string
// or an already parsed object.
#[derive(Debug, Deserialize)]
pub struct ProcessScanRequest {
    #[serde(rename = "qrData")]
    pub qr_data: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct SpecialMessageDto {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub message: &'static str,
    pub style: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorDecisionDto {
    pub should_open: bool,
    pub reason: &'static str,
    pub assistants_present: bool,
    pub special_message: Option<SpecialMessageDto>,
}

// Admission result returned to the reader UI.
#[derive(Debug, Default, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario_tipo: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora: Option<String>,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registro_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "errorType", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub door: Option<DoorDecisionDto>,
}

#[derive(Debug, Serialize)]
pub struct PresentAssistantDto {
    pub email: String,
    pub nombre: String,
    pub apellido: String,
    #[serde(rename = "horaEntrada")]
    pub hora_entrada: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyResponse {
    pub success: bool,
    pub assistants_present: bool,
    pub count: usize,
    pub assistants: Vec<PresentAssistantDto>,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecentEventDto {
    pub id: i64,
    pub fecha: String,
    pub hora: String,
    pub dia: String,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub metodo: String,
    pub tipo: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RecentResponse {
    pub success: bool,
    pub data: Vec<RecentEventDto>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenDoorRequest {
    pub user_type: Option<String>,
    pub user_name: Option<String>,
    #[serde(default)]
    pub authorized: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenDoorResponse {
    pub success: bool,
    pub message: String,
    pub user_type: String,
    pub user_name: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAndOpenRequest {
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub user_name: String,
    pub user_email: Option<String>,
    #[serde(default)]
    pub action_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAndOpenResponse {
    pub success: bool,
    pub authorized: bool,
    pub reason: &'static str,
    pub user_type: String,
    pub user_name: String,
    pub action_type: String,
    pub door_opened: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub door_error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_message: Option<SpecialMessageDto>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderTokenResponse {
    pub success: bool,
    pub token: String,
    pub station_id: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub success: bool,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct DbTestResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
