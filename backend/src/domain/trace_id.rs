//! Correlation identifier shared by request logs, error bodies and the
//! `trace-id` response header.
//!
//! The [`Trace`](crate::middleware::Trace) middleware installs one per request
//! in Tokio task-local storage. Spawned tasks do not inherit it; wrap their
//! futures in [`TraceId::scope`] when correlation matters.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::Serialize;
use uuid::Uuid;

/// Response header carrying the trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

tokio::task_local! {
    static CURRENT: TraceId;
}

/// UUID tagging every log line and error raised while serving a request.
///
/// # Examples
/// ```
/// use barbershop_backend::domain::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id = TraceId::generate();
/// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
/// assert_eq!(TraceId::current(), None);
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random (v4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse an inbound `trace-id` header value.
    ///
    /// Only UUIDs are adopted; anything else returns `None` and the caller
    /// generates its own identifier.
    #[must_use]
    pub fn from_upstream(header_value: &str) -> Option<Self> {
        header_value.trim().parse().ok()
    }

    /// Identifier installed for the running task.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(Self::clone).ok()
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Drive `work` to completion with `id` installed as the current trace.
    pub async fn scope<F: Future>(id: Self, work: F) -> F::Output {
        CURRENT.scope(id, work).await
    }
}

impl From<Uuid> for TraceId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(raw).map(Self)
    }
}
