//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); log lines carry
//! structured fields instead.
//!
//! ```bash
//! RUST_LOG=info cargo run     # state transitions
//! RUST_LOG=debug cargo run    # requests, dedup hits, reveal start/cancel
//! ```
//!
//! ## What Gets Traced
//!
//! - **Slots**: `Loading`, `Ready`, `Failed`, `Reset`, each with `resource` and `token`.
//!   Stale completions show up as `warn` "Discarding stale completion".
//! - **Turns**: reveal start, display, failure and retry with `turn_id` and `attempt`.
//! - **Actors**: start and shutdown.
//!
//! ```text
//! INFO Loading resource="picture" token=#1
//! INFO Ready resource="picture" token=#1
//! INFO Loading resource="image" token=#1
//! WARN Turn failed turn_id=turn_1 attempt=1 error=Network error: timeout
//! INFO Retrying turn_id=turn_1 attempt=2
//! ```

/// Installs the global subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
