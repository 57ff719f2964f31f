//! Fluent query builder.
//!
//! A [`QueryBuilder`] accumulates the structural parts of one query (mode,
//! FROM/JOIN entities, projection, WHERE segments, ORDER BY / GROUP BY,
//! windowing) and compiles them into text with `:name` / `?N` placeholders.
//! Terminal calls such as [`QueryBuilder::get_result_list`] consume the
//! builder and run the compiled statement through a
//! [`StoreExecutor`](crate::StoreExecutor).
//!
//! # Usage
//!
//! ```ignore
//! use fluentq::{Predicate, SortDir};
//!
//! // Structural query
//! let books: Vec<Book> = fluentq::select::<Book>()
//!     .filter([Predicate::equal("author", "Le Guin")])
//!     .order_by("title", SortDir::Asc)
//!     .get_result_list(&store)?;
//!
//! // SELECT u FROM Book b JOIN b.user u
//! let readers = fluentq::select::<User>()
//!     .from::<Book>("b")
//!     .join::<User>("user", "u")
//!     .get_untyped_result_list(&store)?;
//!
//! // Raw text with an explicit named parameter
//! let page = fluentq::query::<Person>("SELECT m FROM Person m WHERE m.name = :name")
//!     .param_named("name", "alice")
//!     .page(2, 10)
//!     .get_paged_result(&store)?;
//! ```

mod builder;
mod clause;
mod count;
mod exec;

#[cfg(test)]
mod tests;

pub use count::derive_count_query;

use crate::config::QueryConfig;
use crate::entity::{AliasMap, AliasedEntity, Entity};
use crate::pagination::{Paginator, RowWindow};
use crate::predicate::Predicate;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Start a whole-entity SELECT over `E`.
pub fn select<E: Entity>() -> QueryBuilder<E> {
    QueryBuilder::new().select()
}

/// Start a DELETE over `E`.
pub fn delete<E: Entity>() -> QueryBuilder<E> {
    QueryBuilder::new().delete()
}

/// Start a query from raw text whose rows map to `E`.
pub fn query<E: Entity>(text: impl Into<String>) -> QueryBuilder<E> {
    QueryBuilder::new().query(text)
}

/// Statement kind of a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Select,
    Delete,
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    fn to_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// How a WHERE segment attaches to the segments before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Connective {
    And,
    Or,
}

impl Connective {
    fn to_sql(self) -> &'static str {
        match self {
            Connective::And => " AND ",
            Connective::Or => " OR ",
        }
    }
}

/// One `where/and/or` call: its connective and the AND-merged predicates.
#[derive(Debug, Clone)]
pub(crate) struct WhereSegment {
    pub(crate) connective: Connective,
    pub(crate) predicate: Predicate,
}

#[derive(Debug, Clone)]
pub(crate) enum Projection {
    /// The whole target entity, by its alias
    Entity,
    /// Explicit column list
    Columns(Vec<String>),
}

#[derive(Debug, Clone)]
pub(crate) struct JoinSpec {
    pub(crate) entity: AliasedEntity,
    /// Association column on the join source
    pub(crate) column: String,
}

/// An ORDER BY or GROUP BY item. `alias` of `None` means the default alias.
#[derive(Debug, Clone)]
pub(crate) struct ColumnRef {
    pub(crate) alias: Option<String>,
    pub(crate) column: String,
}

/// The output of [`QueryBuilder::build`]: text plus everything the executor
/// needs to bind it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub text: String,
    /// `?N` parameters, explicit ones and those bound from predicates
    pub positional: BTreeMap<usize, Value>,
    /// `:name` parameters
    pub named: BTreeMap<String, Value>,
    pub window: Option<RowWindow>,
}

/// Builder for one SELECT or DELETE query over entity `E`.
///
/// Methods consume and return the builder. Precondition violations (select
/// after delete, a clause before select/delete, page 0) do not panic; they
/// are recorded and reported as [`QueryError::IllegalState`](crate::QueryError)
/// by the next `build()` or terminal call.
pub struct QueryBuilder<E> {
    pub(crate) config: QueryConfig,
    pub(crate) mode: Option<Mode>,
    pub(crate) projection: Projection,
    pub(crate) distinct: bool,
    /// Secondary FROM entity, replacing `E` in the FROM clause
    pub(crate) from: Option<AliasedEntity>,
    pub(crate) join: Option<JoinSpec>,
    pub(crate) aliases: AliasMap,
    /// Raw statement head, bypassing SELECT/FROM/JOIN construction
    pub(crate) raw: Option<String>,
    pub(crate) segments: Vec<WhereSegment>,
    pub(crate) order_by: Vec<(ColumnRef, SortDir)>,
    pub(crate) group_by: Vec<ColumnRef>,
    pub(crate) positional: BTreeMap<usize, Value>,
    pub(crate) named: BTreeMap<String, Value>,
    pub(crate) paginator: Paginator,
    pub(crate) build_error: Option<String>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for QueryBuilder<E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            mode: self.mode,
            projection: self.projection.clone(),
            distinct: self.distinct,
            from: self.from.clone(),
            join: self.join.clone(),
            aliases: self.aliases.clone(),
            raw: self.raw.clone(),
            segments: self.segments.clone(),
            order_by: self.order_by.clone(),
            group_by: self.group_by.clone(),
            positional: self.positional.clone(),
            named: self.named.clone(),
            paginator: self.paginator.clone(),
            build_error: self.build_error.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for QueryBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("mode", &self.mode)
            .field("projection", &self.projection)
            .field("distinct", &self.distinct)
            .field("from", &self.from)
            .field("join", &self.join)
            .field("raw", &self.raw)
            .field("segments", &self.segments.len())
            .field("window", &self.paginator.window())
            .field("build_error", &self.build_error)
            .finish()
    }
}
