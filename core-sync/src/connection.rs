//! # Connection Pipeline
//!
//! Ordered reachability and ownership checks against one media app.
//!
//! ## Steps
//!
//! ```text
//! IcmpPing -> TcpConnect -> WsPing -> Register (admin only)
//! ```
//!
//! Steps run strictly in sequence. The first failing step decides the
//! resulting [`ConnectionStatus`]; if every step passes the media app is
//! [`ConnectionStatus::Online`]. Each step is bounded by the connection
//! timeout, and a step that runs out of time counts as failed.
//!
//! An `Online` result leaves the transport connection open (and, for an
//! admin check, registered). Callers release it with
//! [`MediaAppConnectionService::disconnect`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{ClientRole, MediaAppTransport, RegistrationOutcome};
use core_catalog::{MediaAppRole, MediaStationDocument, MediaStationRepository};
use tracing::{debug, instrument, warn};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::progress::{Progress, StepObserver};

/// Outcome of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Online,
    IcmpPingFailed,
    TcpConnectionFailed,
    WsPingFailed,
    RegistrationFailed,
}

impl ConnectionStatus {
    pub fn is_online(&self) -> bool {
        *self == ConnectionStatus::Online
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectionStatus::Online => "online",
            ConnectionStatus::IcmpPingFailed => "host did not answer the ping",
            ConnectionStatus::TcpConnectionFailed => "connection could not be opened",
            ConnectionStatus::WsPingFailed => "media app did not answer the ping",
            ConnectionStatus::RegistrationFailed => "registration was refused",
        };
        f.write_str(text)
    }
}

/// One step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStep {
    IcmpPing,
    TcpConnect,
    WsPing,
    Register,
}

const ADMIN_STEPS: &[ConnectionStep] = &[
    ConnectionStep::IcmpPing,
    ConnectionStep::TcpConnect,
    ConnectionStep::WsPing,
    ConnectionStep::Register,
];

const USER_STEPS: &[ConnectionStep] = &[
    ConnectionStep::IcmpPing,
    ConnectionStep::TcpConnect,
    ConnectionStep::WsPing,
];

impl ConnectionStep {
    /// Steps run for a check with the given role
    pub fn pipeline(role: ClientRole) -> &'static [ConnectionStep] {
        match role {
            ClientRole::Admin => ADMIN_STEPS,
            ClientRole::User => USER_STEPS,
        }
    }

    pub fn failure_status(&self) -> ConnectionStatus {
        match self {
            ConnectionStep::IcmpPing => ConnectionStatus::IcmpPingFailed,
            ConnectionStep::TcpConnect => ConnectionStatus::TcpConnectionFailed,
            ConnectionStep::WsPing => ConnectionStatus::WsPingFailed,
            ConnectionStep::Register => ConnectionStatus::RegistrationFailed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConnectionStep::IcmpPing => "IcmpPing",
            ConnectionStep::TcpConnect => "TcpConnect",
            ConnectionStep::WsPing => "WsPing",
            ConnectionStep::Register => "Register",
        }
    }
}

/// Run a transport call under a time bound
pub(crate) async fn bounded<T, F>(operation: &'static str, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = BridgeResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(SyncError::Timeout {
            operation,
            timeout: limit,
        }),
    }
}

pub struct MediaAppConnectionService {
    repository: Arc<MediaStationRepository>,
    transport: Arc<dyn MediaAppTransport>,
    config: SyncConfig,
}

impl MediaAppConnectionService {
    pub fn new(
        repository: Arc<MediaStationRepository>,
        transport: Arc<dyn MediaAppTransport>,
        config: SyncConfig,
    ) -> Self {
        Self {
            repository,
            transport,
            config,
        }
    }

    /// Run the pipeline for `role` against `address`
    ///
    /// The observer receives one message per executed step.
    #[instrument(skip(self, on_step))]
    pub async fn check_connection(
        &self,
        address: &str,
        role: ClientRole,
        on_step: StepObserver<'_>,
    ) -> ConnectionStatus {
        self.run_pipeline(address, role, &mut Progress::new(on_step))
            .await
    }

    pub(crate) async fn run_pipeline(
        &self,
        address: &str,
        role: ClientRole,
        progress: &mut Progress<'_>,
    ) -> ConnectionStatus {
        let mut opened = false;

        for step in ConnectionStep::pipeline(role) {
            let passed = match self.run_step(*step, address, role, progress).await {
                Ok(passed) => passed,
                Err(e) => {
                    debug!(address, step = step.name(), error = %e, "Connection step errored");
                    false
                }
            };

            if !passed {
                let status = step.failure_status();
                progress.failure(&format!("{} {}: {}", step.name(), address, status));
                if opened {
                    self.disconnect(address).await;
                }
                return status;
            }

            if *step == ConnectionStep::TcpConnect {
                opened = true;
            }
            progress.step(&format!("{} {}: ok", step.name(), address));
        }

        ConnectionStatus::Online
    }

    async fn run_step(
        &self,
        step: ConnectionStep,
        address: &str,
        role: ClientRole,
        progress: &mut Progress<'_>,
    ) -> Result<bool> {
        let limit = self.config.connection_timeout;
        match step {
            ConnectionStep::IcmpPing => {
                bounded("ICMP ping", limit, self.transport.ping_host(address)).await
            }
            ConnectionStep::TcpConnect => {
                bounded("connect", limit, self.transport.open(address)).await?;
                Ok(true)
            }
            ConnectionStep::WsPing => bounded("ping", limit, self.transport.ping(address)).await,
            ConnectionStep::Register => {
                let outcome = bounded("register", limit, self.transport.register(address, role)).await?;
                Ok(registration_accepted(outcome, address, progress))
            }
        }
    }

    /// Open the connection to a media app and register with `role`
    ///
    /// Skips the reachability probes of the full pipeline. On failure the
    /// connection is closed again.
    pub(crate) async fn connect(
        &self,
        address: &str,
        role: ClientRole,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        let limit = self.config.connection_timeout;
        if let Err(e) = bounded("connect", limit, self.transport.open(address)).await {
            debug!(address, error = %e, "Could not open connection");
            return Err(SyncError::Connectivity {
                address: address.to_string(),
                status: ConnectionStatus::TcpConnectionFailed,
            });
        }

        let accepted = match bounded("register", limit, self.transport.register(address, role)).await {
            Ok(outcome) => registration_accepted(outcome, address, progress),
            Err(e) => {
                debug!(address, error = %e, "Registration errored");
                false
            }
        };
        if !accepted {
            self.close(address).await;
            return Err(SyncError::Connectivity {
                address: address.to_string(),
                status: ConnectionStatus::RegistrationFailed,
            });
        }
        Ok(())
    }

    /// Unregister from a media app and close its connection
    ///
    /// Failures are logged only; the connection is considered gone either way.
    pub async fn disconnect(&self, address: &str) {
        let limit = self.config.connection_timeout;
        if let Err(e) = bounded("unregister", limit, self.transport.unregister(address)).await {
            debug!(address, error = %e, "Unregister failed");
        }
        self.close(address).await;
    }

    async fn close(&self, address: &str) {
        if let Err(e) = bounded("close", self.config.connection_timeout, self.transport.close(address)).await {
            debug!(address, error = %e, "Close failed");
        }
    }

    /// Check the controller and every media app its catalog lists
    ///
    /// Returns `false` as soon as one of them is not online. An empty
    /// controller catalog means there is nothing else to check.
    ///
    /// # Errors
    ///
    /// Only an unknown station is an error.
    #[instrument(skip(self))]
    pub async fn check_online_status_of_all_media_apps(&self, station_id: i32) -> Result<bool> {
        let station = self.repository.get_media_station(station_id).await?;
        let Some(controller) = station.get_controller() else {
            warn!(station_id, "Station has no controller");
            return Ok(false);
        };
        let controller_ip = controller.ip.clone();

        let status = self
            .check_connection(&controller_ip, ClientRole::Admin, None)
            .await;
        if !status.is_online() {
            return Ok(false);
        }

        let result = self.check_listed_media_apps(&controller_ip).await;
        self.disconnect(&controller_ip).await;
        Ok(result)
    }

    async fn check_listed_media_apps(&self, controller_ip: &str) -> bool {
        let contents = match bounded(
            "get contents",
            self.config.connection_timeout,
            self.transport.get_contents(controller_ip),
        )
        .await
        {
            Ok(contents) => contents,
            Err(e) => {
                warn!(address = controller_ip, error = %e, "Could not fetch controller catalog");
                return false;
            }
        };

        let Some(data) = contents.filter(|data| !is_blank(data)) else {
            debug!(address = controller_ip, "Controller catalog is empty");
            return true;
        };

        let document: MediaStationDocument = match core_catalog::document::parse(&data) {
            Ok(document) => document,
            Err(e) => {
                warn!(address = controller_ip, error = %e, "Controller catalog is unreadable");
                return false;
            }
        };

        for app in document
            .media_apps
            .iter()
            .filter(|app| app.role != MediaAppRole::Controller)
        {
            let status = self.check_connection(&app.ip, ClientRole::Admin, None).await;
            if !status.is_online() {
                warn!(media_app_id = app.id, address = %app.ip, %status, "Media app is not online");
                return false;
            }
            self.disconnect(&app.ip).await;
        }
        true
    }
}

/// Whether a registration outcome lets the client proceed
fn registration_accepted(
    outcome: RegistrationOutcome,
    address: &str,
    progress: &mut Progress<'_>,
) -> bool {
    match outcome {
        RegistrationOutcome::Accepted => true,
        RegistrationOutcome::AcceptedAdvisoryBlocked => {
            progress.step(&format!(
                "Registered at {}, another client holds an advisory claim",
                address
            ));
            true
        }
        RegistrationOutcome::Rejected => false,
    }
}

pub(crate) fn is_blank(data: &[u8]) -> bool {
    data.iter().all(u8::is_ascii_whitespace)
}
