//! The store executor abstraction.
//!
//! The builder never talks to a database directly; it hands compiled text and
//! parameters to a [`StoreExecutor`] supplied by the caller. Placeholders in
//! the text are `:name` for named parameters and `?N` (1-based) for
//! positional ones.

use crate::error::{QueryError, QueryResult};
use crate::pagination::RowWindow;
use crate::row::Row;
use crate::value::Value;
use std::collections::BTreeMap;

/// A statement ready to run against the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    pub text: String,
    pub positional: BTreeMap<usize, Value>,
    pub named: BTreeMap<String, Value>,
    /// Row offset/limit to apply to read queries.
    pub window: Option<RowWindow>,
}

impl PreparedQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            positional: BTreeMap::new(),
            named: BTreeMap::new(),
            window: None,
        }
    }

    pub fn with_window(mut self, window: Option<RowWindow>) -> Self {
        self.window = window;
        self
    }

    /// Total number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.positional.len() + self.named.len()
    }
}

/// A synchronous query executor.
///
/// Implementations own connectivity, statement preparation and row-window
/// support. Errors they raise should be wrapped with [`QueryError::store`] and
/// are passed through the builder unchanged.
pub trait StoreExecutor {
    /// Prepare `text` with its parameter maps.
    ///
    /// The default implementation only bundles the inputs; executors that
    /// cache or validate statements override it.
    fn prepare(
        &self,
        text: &str,
        positional: &BTreeMap<usize, Value>,
        named: &BTreeMap<String, Value>,
    ) -> QueryResult<PreparedQuery> {
        Ok(PreparedQuery {
            text: text.to_string(),
            positional: positional.clone(),
            named: named.clone(),
            window: None,
        })
    }

    /// Run a read query and return all rows inside its window.
    fn query(&self, query: &PreparedQuery) -> QueryResult<Vec<Row>>;

    /// Run a read query that must return exactly one row.
    ///
    /// Semantics of the default implementation:
    /// - 0 rows: store error "query returned no rows"
    /// - 1 row: returns that row
    /// - multiple rows: store error naming the row count
    fn query_one(&self, query: &PreparedQuery) -> QueryResult<Row> {
        let mut rows = self.query(query)?;
        match rows.len() {
            0 => Err(QueryError::store("query returned no rows")),
            1 => Ok(rows.remove(0)),
            n => Err(QueryError::store(format!(
                "query returned {n} rows, expected exactly one"
            ))),
        }
    }

    /// Run an update/delete statement and return the affected row count.
    fn execute(&self, query: &PreparedQuery) -> QueryResult<u64>;

    /// Run `f`, which issues several statements, as one unit.
    ///
    /// The default runs `f` directly, so its statements are not isolated
    /// from concurrent writes. Transactional executors can open a
    /// transaction or snapshot around the call.
    fn snapshot<R, F>(&self, f: F) -> QueryResult<R>
    where
        Self: Sized,
        F: FnOnce(&Self) -> QueryResult<R>,
    {
        f(self)
    }
}
