use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::domain::door::{DoorActuator, DoorCommand, DoorError};

// Thin wrapper around reqwest for the ESPHome door relay.
#[derive(Clone)]
pub struct EspHomeDoorClient {
    http: Client,
    pub base_url: String,
    pub entity_id: String,
    token: Option<String>,
}

impl EspHomeDoorClient {
    pub fn new(
        base_url: impl Into<String>,
        entity_id: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            entity_id: entity_id.into(),
            token,
        })
    }

    fn press_url(&self) -> String {
        format!(
            "{}/button/{}/press",
            self.base_url.trim_end_matches('/'),
            self.entity_id
        )
    }
}

#[async_trait]
impl DoorActuator for EspHomeDoorClient {
    async fn open(&self, command: DoorCommand) -> Result<(), DoorError> {
        let mut request = self.http.post(self.press_url()).json(&serde_json::json!({}));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(
            role = command.role.code(),
            actor = %command.display_name,
            has_token = self.token.is_some(),
            "pressing door relay"
        );

        let response = request.send().await.map_err(|err| {
            if err.is_connect() || err.is_timeout() {
                DoorError::Unreachable(err.to_string())
            } else {
                DoorError::Failed(err.to_string())
            }
        })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DoorError::Unauthorized),
            status => Err(DoorError::Failed(format!("relay answered {status}"))),
        }
    }
}

// Runs a local program that drives the relay. The actor is passed through the
// environment so the script needs no argument parsing.
#[derive(Clone)]
pub struct ScriptDoorActuator {
    pub program: String,
    pub timeout: Duration,
}

#[async_trait]
impl DoorActuator for ScriptDoorActuator {
    async fn open(&self, command: DoorCommand) -> Result<(), DoorError> {
        let mut child = tokio::process::Command::new(&self.program)
            .env("DOOR_ACTOR_ROLE", command.role.code())
            .env("DOOR_ACTOR_NAME", &command.display_name)
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| DoorError::Unreachable(err.to_string()))?;

        let status = tokio::time::timeout(self.timeout, child.wait())
            .await
            .map_err(|_| DoorError::Failed("door script timed out".to_string()))?
            .map_err(|err| DoorError::Failed(err.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(DoorError::Failed(format!("door script exited with {status}")))
        }
    }
}

// Used when no relay is configured; every request reports the missing setup.
#[derive(Clone)]
pub struct DisabledDoor;

#[async_trait]
impl DoorActuator for DisabledDoor {
    async fn open(&self, _command: DoorCommand) -> Result<(), DoorError> {
        Err(DoorError::NotConfigured)
    }
}
