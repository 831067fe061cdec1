//! Shared cache-control policies for HTTP handlers.

/// Ledger responses are per-caller and must always be revalidated.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Probe responses must never be cached by intermediaries.
pub const NO_STORE: &str = "no-store";

/// Build the standard cache-control header tuple for private API responses.
pub const fn private_no_cache_header() -> (&'static str, &'static str) {
    ("Cache-Control", PRIVATE_NO_CACHE_MUST_REVALIDATE)
}
