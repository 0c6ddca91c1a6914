use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::Clock;

// Tokens shorter than this cannot survive one display refresh cycle.
pub const MIN_READER_TOKEN_TTL_SECONDS: u64 = 15;

// Claims embedded in the QR shown by a reader station.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReaderClaims {
    pub station_id: String,
    pub nonce: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct IssuedReaderToken {
    pub token: String,
    pub station_id: String,
    pub expires_in: u64,
}

#[derive(Debug)]
pub enum TokenError {
    MissingSecret,
    Signing(String),
}

// Issues short-lived signed tokens for the rotating reader display.
pub struct IssueReaderTokenUseCase<C> {
    pub clock: C,
    pub secret: Option<String>,
    pub ttl_seconds: u64,
    pub station_id: String,
}

impl<C> IssueReaderTokenUseCase<C>
where
    C: Clock,
{
    pub fn execute(&self) -> Result<IssuedReaderToken, TokenError> {
        let secret = self
            .secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or(TokenError::MissingSecret)?;

        let expires_in = self.ttl_seconds.max(MIN_READER_TOKEN_TTL_SECONDS);
        let issued_at = self.clock.now().timestamp();
        let claims = ReaderClaims {
            station_id: self.station_id.clone(),
            nonce: Uuid::new_v4().to_string(),
            iat: issued_at,
            exp: issued_at + expires_in as i64,
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|err| TokenError::Signing(err.to_string()))?;

        Ok(IssuedReaderToken {
            token,
            station_id: self.station_id.clone(),
            expires_in,
        })
    }
}
