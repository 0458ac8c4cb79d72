//! Environment variable names used by this crate for convenient
//! configuration of the sink from services.
//!
//! These are purely helpers; [`SinkProvider`](crate::provider::SinkProvider)
//! itself never reads the environment.

/// Redis connection descriptor, e.g. `localhost:6379` or `redis://host/0`.
pub const LOG_SINK_REDIS_CONNECTION_ENV: &str = "LOG_SINK_REDIS_CONNECTION";

/// Destination list key.
pub const LOG_SINK_REDIS_LIST_KEY_ENV: &str = "LOG_SINK_REDIS_LIST_KEY";

/// Minimum level, e.g. `Information` or `warn`.
pub const LOG_SINK_MINIMUM_LEVEL_ENV: &str = "LOG_SINK_MINIMUM_LEVEL";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable, treating unset and non-unicode as absent.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
