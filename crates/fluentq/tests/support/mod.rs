//! In-memory executor shared by the integration tests.
//!
//! `MemoryStore` does not interpret statements. It answers count statements
//! with the number of stored rows, returns the stored rows (inside the row
//! window) for everything else, and records what it was asked to run.

#![allow(dead_code)]

use fluentq::{
    Entity, FromRow, PreparedQuery, QueryError, QueryResult, Row, StoreExecutor, Value,
};
use std::cell::{Cell, RefCell};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub sort: i32,
}

impl Entity for User {
    fn entity_name() -> &'static str {
        "User"
    }
}

impl FromRow for User {
    fn from_row(row: &Row) -> QueryResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            sort: row.try_get("sort")?,
        })
    }
}

pub struct Book;

impl Entity for Book {
    fn entity_name() -> &'static str {
        "Book"
    }
}

pub const NAMES: [&str; 6] = ["alice", "beatrice", "carol", "dolores", "ellen", "ellen"];

pub fn user_rows() -> Vec<Row> {
    let columns: Arc<[String]> = Arc::from(vec![
        "id".to_string(),
        "name".to_string(),
        "sort".to_string(),
    ]);
    NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            Row::new(
                columns.clone(),
                vec![Value::Int(i as i64 + 1), Value::from(*name), Value::Int(i as i64)],
            )
        })
        .collect()
}

#[derive(Default)]
pub struct MemoryStore {
    rows: Vec<Row>,
    affected: u64,
    fail_with: Option<String>,
    pub log: RefCell<Vec<PreparedQuery>>,
    pub snapshots: Cell<usize>,
}

impl MemoryStore {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn users() -> Self {
        Self::new(user_rows())
    }

    /// Report `n` affected rows from `execute`.
    pub fn affecting(mut self, n: u64) -> Self {
        self.affected = n;
        self
    }

    /// Fail every statement with a store error.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.log.borrow().iter().map(|q| q.text.clone()).collect()
    }

    fn record(&self, query: &PreparedQuery) -> QueryResult<()> {
        self.log.borrow_mut().push(query.clone());
        match self.fail_with {
            Some(ref message) => Err(QueryError::store(message.clone())),
            None => Ok(()),
        }
    }
}

impl StoreExecutor for MemoryStore {
    fn query(&self, query: &PreparedQuery) -> QueryResult<Vec<Row>> {
        self.record(query)?;
        if query.text.contains("count(") {
            return Ok(vec![Row::scalar("count", self.rows.len() as i64)]);
        }
        Ok(match query.window {
            Some(window) => window.apply(self.rows.iter().cloned()).collect(),
            None => self.rows.clone(),
        })
    }

    fn execute(&self, query: &PreparedQuery) -> QueryResult<u64> {
        self.record(query)?;
        Ok(self.affected)
    }

    fn snapshot<R, F>(&self, f: F) -> QueryResult<R>
    where
        Self: Sized,
        F: FnOnce(&Self) -> QueryResult<R>,
    {
        self.snapshots.set(self.snapshots.get() + 1);
        f(self)
    }
}
