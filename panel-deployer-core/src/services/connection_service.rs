//! Connection test service

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::error::CoreError;
use crate::remote::close_quietly;
use crate::services::ServiceContext;

const PROBE_COMMAND: &str = "echo ok";

/// Result of a connection test.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResult {
    pub success: bool,
    pub host: String,
    /// Connect plus probe round trip.
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Checks that the configured host is reachable and usable
pub struct ConnectionService {
    ctx: Arc<ServiceContext>,
}

impl ConnectionService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Open a session, run a trivial command, close it.
    pub async fn test_connection(&self) -> ConnectionTestResult {
        let config = self.ctx.config().await;
        let connection = &config.connection;
        let started = Instant::now();

        let outcome = match self.ctx.open_session(connection).await {
            Ok(session) => {
                let result = ServiceContext::executor(connection)
                    .exec_checked(session.as_ref(), PROBE_COMMAND, "connection test")
                    .await;
                close_quietly(session.as_ref()).await;
                result.and_then(|r| {
                    if r.stdout.trim() == "ok" {
                        Ok(())
                    } else {
                        Err(CoreError::RemoteIo(format!(
                            "unexpected probe output: {}",
                            r.stdout.trim()
                        )))
                    }
                })
            }
            Err(e) => Err(e),
        };

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match outcome {
            Ok(()) => {
                log::info!("[connection] {} reachable ({latency_ms} ms)", connection.host);
                ConnectionTestResult {
                    success: true,
                    host: connection.host.clone(),
                    latency_ms,
                    error: None,
                }
            }
            Err(e) => ConnectionTestResult {
                success: false,
                host: connection.host.clone(),
                latency_ms,
                error: Some(e.to_string()),
            },
        }
    }
}
