//! Session configuration composition
//!
//! The session is taken whole from the device configuration, else from the
//! top level, else synthesized with a free local port and a fresh id.

use serde::Serialize;
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tracing::debug;
use uuid::Uuid;

use crate::config::{DetoxConfig, DeviceConfig, SessionLayer};
use crate::error::{Error, Result};

/// Composed session section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub auto_start: bool,
    pub server: String,
    pub session_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ask the OS for a currently unused local TCP port.
pub async fn allocate_free_port() -> Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .map_err(Error::PortAllocation)?;
    let addr = listener.local_addr().map_err(Error::PortAllocation)?;
    Ok(addr.port())
}

/// Fresh random session identifier.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

async fn default_session() -> Result<SessionLayer> {
    let port = allocate_free_port().await?;
    let session = SessionLayer {
        auto_start: Some(true),
        server: Some(format!("ws://localhost:{}", port)),
        session_id: Some(generate_session_id()),
        extra: Map::new(),
    };
    debug!(server = ?session.server, "Synthesized default session");
    Ok(session)
}

/// Compose and validate the session section.
pub async fn compose_session_config(
    detox_config: &DetoxConfig,
    device_config: &DeviceConfig,
) -> Result<SessionConfig> {
    let session = match device_config
        .session
        .as_ref()
        .or(detox_config.session.as_ref())
    {
        Some(session) => session.clone(),
        None => default_session().await?,
    };

    let server = session
        .server
        .filter(|server| !server.is_empty())
        .ok_or_else(|| {
            Error::runtime("session.server property is missing, should hold the server address")
        })?;

    let session_id = session
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            Error::runtime("session.sessionId property is missing, should hold the server session id")
        })?;

    Ok(SessionConfig {
        auto_start: session.auto_start.unwrap_or(false),
        server,
        session_id,
        extra: session.extra,
    })
}
