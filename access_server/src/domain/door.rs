use async_trait::async_trait;
use std::fmt;

use crate::domain::entities::Role;

// Actor metadata sent along with an authorized open request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoorCommand {
    pub role: Role,
    pub display_name: String,
}

#[derive(Debug)]
pub enum DoorError {
    NotConfigured,
    Unreachable(String),
    Unauthorized,
    Failed(String),
}

impl DoorError {
    // Message returned by the door endpoints.
    pub fn message(&self) -> &'static str {
        match self {
            DoorError::NotConfigured => "Configuración de puerta no disponible",
            DoorError::Unreachable(_) => "Sistema de puerta no disponible",
            DoorError::Unauthorized => "Error de autenticación con sistema de puerta",
            DoorError::Failed(_) => "Error interno abriendo puerta",
        }
    }
}

impl fmt::Display for DoorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorError::NotConfigured => write!(f, "door actuator not configured"),
            DoorError::Unreachable(err) => write!(f, "door actuator unreachable: {err}"),
            DoorError::Unauthorized => write!(f, "door actuator rejected credentials"),
            DoorError::Failed(err) => write!(f, "door actuation failed: {err}"),
        }
    }
}

impl std::error::Error for DoorError {}

// Handlers depend on this trait; the ESPHome client and the script runner implement it.
#[async_trait]
pub trait DoorActuator: Send + Sync {
    async fn open(&self, command: DoorCommand) -> Result<(), DoorError>;
}
