//! Liveness and readiness probes.
//!
//! Both probes answer with a small JSON body naming the lifecycle phase and
//! the store backing the ledger, so an operator can spot a deployment that
//! silently fell back to in-memory state.
use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;

use super::cache_control::NO_STORE;

/// Store backing the loyalty ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStorage {
    Postgres,
    InMemory,
}

/// Server lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Starting,
    Serving,
    Draining,
}

impl Phase {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Starting,
            1 => Self::Serving,
            _ => Self::Draining,
        }
    }
}

/// Shared probe state.
pub struct HealthState {
    phase: AtomicU8,
    storage: LedgerStorage,
}

#[derive(Serialize)]
struct ProbeBody {
    phase: Phase,
    storage: LedgerStorage,
}

impl HealthState {
    /// New state in [`Phase::Starting`].
    pub fn new(storage: LedgerStorage) -> Self {
        Self {
            phase: AtomicU8::new(Phase::Starting as u8),
            storage,
        }
    }

    /// Called once the listener is bound and handler state is built.
    pub fn mark_ready(&self) {
        // Never leave Draining once shutdown has begun.
        let _ = self.phase.compare_exchange(
            Phase::Starting as u8,
            Phase::Serving as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Fail both probes so load balancers stop routing during shutdown.
    pub fn begin_draining(&self) {
        self.phase.store(Phase::Draining as u8, Ordering::Release);
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn storage(&self) -> LedgerStorage {
        self.storage
    }

    fn respond(&self, healthy: bool) -> HttpResponse {
        let mut response = if healthy {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, NO_STORE))
            .json(ProbeBody {
                phase: self.phase(),
                storage: self.storage,
            })
    }
}

/// Readiness probe: 200 only while serving.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Accepting ledger traffic"),
        (status = 503, description = "Starting up or draining")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.respond(state.phase() == Phase::Serving)
}

/// Liveness probe: 200 until draining starts.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive"),
        (status = 503, description = "Draining for shutdown")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.respond(state.phase() != Phase::Draining)
}
