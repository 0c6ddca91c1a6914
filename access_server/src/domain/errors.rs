use std::fmt;

use crate::domain::entities::Role;

// Reasons a scanned payload is rejected before touching storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationError {
    MalformedPayload,
    InvalidEmail,
    InvalidRole,
    MissingTimestamp,
    Expired,
    IncompleteData,
}

impl ValidationError {
    // Message shown on the reader screen.
    pub fn message(self) -> &'static str {
        match self {
            ValidationError::MalformedPayload => "Formato QR inválido",
            ValidationError::InvalidEmail => "Email inválido en el QR",
            ValidationError::InvalidRole => "Tipo de usuario inválido en el QR",
            ValidationError::MissingTimestamp => "QR sin timestamp válido",
            ValidationError::Expired => "QR expirado o inválido",
            ValidationError::IncompleteData => "Datos QR incompletos",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ValidationError::MalformedPayload => "malformed payload",
            ValidationError::InvalidEmail => "invalid email",
            ValidationError::InvalidRole => "invalid role",
            ValidationError::MissingTimestamp => "missing timestamp",
            ValidationError::Expired => "expired payload",
            ValidationError::IncompleteData => "incomplete data",
        };
        f.write_str(kind)
    }
}

// Terminal outcomes of the scan pipeline that do not produce an attendance record.
#[derive(Debug, PartialEq, Eq)]
pub enum ScanError {
    Invalid(ValidationError),
    NotFound { email: String, claimed_role: Role },
    StorageFailure(String),
}

impl From<ValidationError> for ScanError {
    fn from(err: ValidationError) -> Self {
        ScanError::Invalid(err)
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Invalid(err) => write!(f, "scan rejected: {err}"),
            ScanError::NotFound { email, claimed_role } => {
                write!(f, "unknown person {email} (claimed {})", claimed_role.code())
            }
            ScanError::StorageFailure(message) => write!(f, "storage failure: {message}"),
        }
    }
}
