use chrono_tz::Tz;
use std::{env, net::IpAddr, str::FromStr, time::Duration};

// Runtime settings read once at startup.

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_LAB_TIMEZONE: Tz = chrono_tz::America::Santiago;
pub const DEFAULT_MIN_ASSISTANTS_PRESENT: usize = 1;
pub const DEFAULT_DOOR_ENTITY_ID: &str = "button.door_open";
pub const DEFAULT_DOOR_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_READER_QR_TTL: u64 = 60;
pub const DEFAULT_STATION_ID: &str = "lector-web";

// Where door actuation requests go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DoorSettings {
    EspHome {
        base_url: String,
        entity_id: String,
        token: Option<String>,
        timeout: Duration,
    },
    Script {
        program: String,
        timeout: Duration,
    },
    Disabled,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub storage_timeout: Duration,
    pub lab_timezone: Tz,
    pub min_assistants_present: usize,
    pub door: DoorSettings,
    pub reader_secret: Option<String>,
    pub reader_ttl_seconds: u64,
    pub station_id: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Builds settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_url =
            get("DATABASE_URL").ok_or_else(|| "DATABASE_URL is required".to_string())?;

        let host = parse_or(&get, "HOST", IpAddr::from([0, 0, 0, 0]));
        let port = parse_or(&get, "PORT", DEFAULT_PORT);
        let db_max_connections =
            parse_or(&get, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS).max(1);
        let storage_timeout =
            Duration::from_millis(parse_or(&get, "STORAGE_TIMEOUT_MS", DEFAULT_STORAGE_TIMEOUT_MS));
        let lab_timezone = parse_or(&get, "LAB_TIMEZONE", DEFAULT_LAB_TIMEZONE);

        let mut min_assistants_present =
            parse_or(&get, "MIN_ASSISTANTS_PRESENT", DEFAULT_MIN_ASSISTANTS_PRESENT);
        if min_assistants_present == 0 {
            tracing::warn!("MIN_ASSISTANTS_PRESENT must be at least 1, using 1");
            min_assistants_present = 1;
        }

        let door_timeout =
            Duration::from_millis(parse_or(&get, "DOOR_TIMEOUT_MS", DEFAULT_DOOR_TIMEOUT_MS));
        let door = if let Some(base_url) = get("ESPHOME_URL") {
            DoorSettings::EspHome {
                base_url,
                entity_id: get("ESPHOME_DOOR_ENTITY_ID")
                    .unwrap_or_else(|| DEFAULT_DOOR_ENTITY_ID.to_string()),
                token: get("ESPHOME_TOKEN"),
                timeout: door_timeout,
            }
        } else if let Some(program) = get("DOOR_SCRIPT") {
            DoorSettings::Script {
                program,
                timeout: door_timeout,
            }
        } else {
            DoorSettings::Disabled
        };

        Ok(Self {
            host,
            port,
            database_url,
            db_max_connections,
            storage_timeout,
            lab_timezone,
            min_assistants_present,
            door,
            reader_secret: get("READER_QR_SECRET"),
            reader_ttl_seconds: parse_or(&get, "READER_QR_TTL", DEFAULT_READER_QR_TTL),
            station_id: get("STATION_ID").unwrap_or_else(|| DEFAULT_STATION_ID.to_string()),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> T
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "invalid setting, using default");
            default
        }),
    }
}
