// Framework bootstrap for the access server runtime.

use crate::domain::calendar::LabCalendar;
use crate::domain::door::DoorActuator;
use crate::frameworks::config::{DoorSettings, Settings};
use crate::frameworks::db;
use crate::interface_adapters::clients::{DisabledDoor, EspHomeDoorClient, ScriptDoorActuator};
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::{AppState, ReaderTokenSettings};
use crate::use_cases::AdmissionPolicy;

use sqlx::PgPool;
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Serve the API on an already bound listener until a shutdown signal arrives.
pub async fn run(listener: tokio::net::TcpListener, state: AppState) -> Result<()> {
    let address = listener.local_addr()?;
    let app = app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let settings = Settings::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        std::io::Error::other(e)
    })?;

    let pool = db::connect_pool(
        &settings.database_url,
        settings.db_max_connections,
        settings.storage_timeout,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "failed to connect to database");
        std::io::Error::other(format!("failed to connect to database: {e}"))
    })?;

    db::run_migrations(&pool).await.map_err(|e| {
        tracing::error!(error = %e, "failed to run migrations");
        std::io::Error::other(format!("failed to run migrations: {e}"))
    })?;

    let state = build_state(&settings, pool.clone())?;

    let address = SocketAddr::new(settings.host, settings.port);

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    let served = run(listener, state).await;

    // Drain pooled connections once the server has stopped accepting requests.
    pool.close().await;
    tracing::info!("database pool closed");

    served
}

pub fn build_state(settings: &Settings, db: PgPool) -> Result<AppState> {
    let door = build_door(&settings.door)?;

    tracing::debug!(
        lab_timezone = %settings.lab_timezone,
        min_assistants_present = settings.min_assistants_present,
        storage_timeout_ms = settings.storage_timeout.as_millis(),
        reader_secret_configured = settings.reader_secret.is_some(),
        "access server configured"
    );

    Ok(AppState {
        db,
        door,
        calendar: LabCalendar::new(settings.lab_timezone),
        policy: AdmissionPolicy {
            min_assistants_present: settings.min_assistants_present,
        },
        storage_timeout: settings.storage_timeout,
        reader: ReaderTokenSettings {
            secret: settings.reader_secret.clone(),
            ttl_seconds: settings.reader_ttl_seconds,
            station_id: settings.station_id.clone(),
        },
    })
}

fn build_door(settings: &DoorSettings) -> Result<Arc<dyn DoorActuator>> {
    match settings {
        DoorSettings::EspHome {
            base_url,
            entity_id,
            token,
            timeout,
        } => {
            let client =
                EspHomeDoorClient::new(base_url.clone(), entity_id.clone(), token.clone(), *timeout)
                    .map_err(|e| {
                        std::io::Error::other(format!("failed to initialize door client: {e}"))
                    })?;
            tracing::info!(base_url = %base_url, entity_id = %entity_id, "door relay via ESPHome");
            Ok(Arc::new(client))
        }
        DoorSettings::Script { program, timeout } => {
            tracing::info!(program = %program, "door relay via local script");
            Ok(Arc::new(ScriptDoorActuator {
                program: program.clone(),
                timeout: *timeout,
            }))
        }
        DoorSettings::Disabled => {
            tracing::warn!("no door relay configured, door requests will fail");
            Ok(Arc::new(DisabledDoor))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
