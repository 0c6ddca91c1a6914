use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use validator::ValidateEmail;

use crate::domain::entities::{Role, ScanPayload};
use crate::domain::errors::ValidationError;

// Maximum clock distance between the phone that rendered the QR and this server.
pub const FRESHNESS_TOLERANCE_MS: i64 = 15_000;

const MAX_NAME_LEN: usize = 100;

const NAME_ALIASES: [&str; 2] = ["name", "nombre"];
const SURNAME_ALIASES: [&str; 2] = ["surname", "apellido"];
const ROLE_ALIASES: [&str; 3] = ["tipoUsuario", "type", "tipo"];

// Normalizes a decoded QR payload into the canonical schema.
// Accepts either a JSON object or a string holding serialized JSON.
pub fn validate_payload(raw: &Value, now: DateTime<Utc>) -> Result<ScanPayload, ValidationError> {
    let parsed;
    let fields = match raw {
        Value::Object(fields) => fields,
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text)
                .map_err(|_| ValidationError::MalformedPayload)?;
            parsed
                .as_object()
                .ok_or(ValidationError::MalformedPayload)?
        }
        _ => return Err(ValidationError::MalformedPayload),
    };

    // Freshness first: a stale payload is rejected whatever else it carries.
    let issued_at_ms = fields
        .get("timestamp")
        .and_then(Value::as_i64)
        .filter(|value| *value > 0)
        .ok_or(ValidationError::MissingTimestamp)?;
    if (now.timestamp_millis() - issued_at_ms).abs() > FRESHNESS_TOLERANCE_MS {
        return Err(ValidationError::Expired);
    }

    let name = first_present(fields, &NAME_ALIASES)?;
    let surname = first_present(fields, &SURNAME_ALIASES)?;
    let email = fields
        .get("email")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    let (Some(name), Some(surname)) = (name, surname) else {
        return Err(ValidationError::IncompleteData);
    };
    if email.is_empty() {
        return Err(ValidationError::IncompleteData);
    }
    if !email.validate_email() {
        return Err(ValidationError::InvalidEmail);
    }

    let role = match first_present(fields, &ROLE_ALIASES)? {
        Some(value) => Role::parse(&value).ok_or(ValidationError::InvalidRole)?,
        None => return Err(ValidationError::IncompleteData),
    };

    Ok(ScanPayload {
        name,
        surname,
        email: email.to_string(),
        role,
        issued_at_ms,
    })
}

// Returns the first non-empty string among the aliases. Non-string values are malformed.
fn first_present(
    fields: &Map<String, Value>,
    aliases: &[&str],
) -> Result<Option<String>, ValidationError> {
    for alias in aliases {
        match fields.get(*alias) {
            None | Some(Value::Null) => continue,
            Some(Value::String(value)) => {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                if value.chars().count() > MAX_NAME_LEN {
                    return Err(ValidationError::MalformedPayload);
                }
                return Ok(Some(value.to_string()));
            }
            Some(_) => return Err(ValidationError::MalformedPayload),
        }
    }
    Ok(None)
}
