//! Composition root shared by the HTTP handlers
//!
//! `AppServices` bundles the poller, key pool and repository that `main`
//! constructs once at startup. Handlers never reach a global; they receive
//! this struct through axum state.

use std::sync::Arc;

use key_pool::{CredentialPool, PoolStatus};
use poller::{ForceTickResult, Poller, PollerStatus};
use serde::Serialize;
use video_store::VideoRepository;

/// Shared service handles. Cheap to clone.
#[derive(Clone)]
pub struct AppServices {
    pub poller: Arc<Poller>,
    pub pool: Arc<CredentialPool>,
    pub repository: Arc<dyn VideoRepository>,
}

/// Response body for `GET /api/admin/status`.
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub background_service: PollerStatus,
    pub youtube_api: PoolStatus,
    pub system: SystemHealth,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    /// `healthy` while the poller runs, `stopped` otherwise
    pub status: &'static str,
}

/// Response body for start/stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlMessage {
    pub message: &'static str,
}

impl AppServices {
    pub fn new(
        poller: Arc<Poller>,
        pool: Arc<CredentialPool>,
        repository: Arc<dyn VideoRepository>,
    ) -> Self {
        Self {
            poller,
            pool,
            repository,
        }
    }

    pub async fn get_system_status(&self) -> SystemStatus {
        let background_service = self.poller.status().await;
        let youtube_api = self.pool.status().await;
        let status = if background_service.running {
            "healthy"
        } else {
            "stopped"
        };
        SystemStatus {
            background_service,
            youtube_api,
            system: SystemHealth { status },
        }
    }

    pub async fn start_polling(&self) -> ControlMessage {
        let message = if self.poller.start().await {
            "Background fetching started successfully"
        } else {
            "Background fetching is already running"
        };
        ControlMessage { message }
    }

    pub async fn stop_polling(&self) -> ControlMessage {
        let message = if self.poller.stop().await {
            "Background fetching stopped successfully"
        } else {
            "Background fetching is not running"
        };
        ControlMessage { message }
    }

    pub async fn force_tick(&self) -> ForceTickResult {
        self.poller.force_tick().await
    }

    pub async fn get_poller_status(&self) -> PollerStatus {
        self.poller.status().await
    }

    pub async fn get_credential_status(&self) -> PoolStatus {
        self.pool.status().await
    }
}
