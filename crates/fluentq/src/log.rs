//! Statement logging through `tracing`.
//!
//! Every compiled statement is emitted under [`QUERY_TARGET`] right before
//! it is handed to the executor, at the level chosen by [`QueryConfig`].

use crate::client::PreparedQuery;
use crate::config::QueryConfig;
use tracing::Level;

/// Target of statement events, for filtering with `RUST_LOG=fluentq.query=debug`.
pub const QUERY_TARGET: &str = "fluentq.query";

/// What a statement is run for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// A row-returning query
    Select,
    /// A derived `count(...)` query
    Count,
    /// An update/delete statement
    Execute,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Select => "select",
            QueryKind::Count => "count",
            QueryKind::Execute => "execute",
        }
    }
}

pub(crate) fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn truncate_query(config: &QueryConfig, text: &str) -> String {
    match config.max_logged_query_length {
        Some(max) if text.len() > max => format!("{}...", truncate_bytes(text, max)),
        _ => text.to_string(),
    }
}

/// Emit `query` as a tracing event before it is handed to the executor.
pub(crate) fn log_query(config: &QueryConfig, kind: QueryKind, query: &PreparedQuery) {
    /// Dispatch a tracing event at a runtime-determined level.
    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                Level::ERROR => tracing::error!($($field)*),
                Level::WARN  => tracing::warn!($($field)*),
                Level::INFO  => tracing::info!($($field)*),
                Level::DEBUG => tracing::debug!($($field)*),
                Level::TRACE => tracing::trace!($($field)*),
            }
        };
    }

    let text = truncate_query(config, &query.text);
    match query.window {
        Some(window) => emit_at_level!(
            config.effective_level(),
            target: QUERY_TARGET,
            kind = kind.as_str(),
            param_count = query.param_count(),
            offset = window.offset,
            limit = window.limit,
            query = %text,
        ),
        None => emit_at_level!(
            config.effective_level(),
            target: QUERY_TARGET,
            kind = kind.as_str(),
            param_count = query.param_count(),
            query = %text,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_bytes("abc", 10), "abc");
        assert_eq!(truncate_bytes("abcdef", 3), "abc");
        // 'é' is two bytes
        assert_eq!(truncate_bytes("aé", 2), "a");
    }

    #[test]
    fn truncate_query_appends_ellipsis() {
        let config = QueryConfig::new().max_logged_query_length(6);
        assert_eq!(truncate_query(&config, "SELECT _this"), "SELECT...");
        assert_eq!(truncate_query(&config.no_truncate(), "SELECT _this"), "SELECT _this");
    }

    #[test]
    fn statements_share_one_target() {
        assert_eq!(QUERY_TARGET, "fluentq.query");
        let q = PreparedQuery::new("SELECT _this FROM User _this")
            .with_window(Some(crate::pagination::RowWindow::new(0, 1)));
        log_query(&QueryConfig::new(), QueryKind::Select, &q);
    }

    #[test]
    fn log_query_without_subscriber_is_silent() {
        let q = PreparedQuery::new("SELECT _this FROM User _this");
        log_query(&QueryConfig::new().show_query(true), QueryKind::Select, &q);
    }
}
