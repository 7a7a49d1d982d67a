//! Query logging capability.

use log::Level;
use sqlnest_core::Value;

/// Target used by [`DefaultLogger`].
pub const QUERY_LOG_TARGET: &str = "sqlnest::query";

/// Records every statement right before it is dispatched.
///
/// Called synchronously on the dispatch path; implementations must not panic
/// and have no way to fail the query.
pub trait QueryLogger: Send + Sync {
    fn log_query(&self, sql: &str, params: &[Value]);
}

/// Discards everything. The session default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl QueryLogger for NoopLogger {
    fn log_query(&self, _sql: &str, _params: &[Value]) {}
}

/// Writes `Query: <sql> -- params: <json>` through the `log` facade.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLogger {
    level: Level,
}

impl DefaultLogger {
    pub fn new() -> Self {
        Self { level: Level::Info }
    }

    /// Log at a different level.
    pub fn with_level(level: Level) -> Self {
        Self { level }
    }

    /// The line written for a statement.
    pub fn format(sql: &str, params: &[Value]) -> String {
        if params.is_empty() {
            return format!("Query: {}", sql);
        }
        let rendered = serde_json::to_string(params)
            .unwrap_or_else(|_| format!("<{} unserializable params>", params.len()));
        format!("Query: {} -- params: {}", sql, rendered)
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryLogger for DefaultLogger {
    fn log_query(&self, sql: &str, params: &[Value]) {
        log::log!(target: QUERY_LOG_TARGET, self.level, "{}", Self::format(sql, params));
    }
}
