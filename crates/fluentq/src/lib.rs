//! # fluentq
//!
//! A fluent builder for JPQL-style queries over named entities.
//!
//! ## Features
//!
//! - **Predicate trees**: AND/OR/NOT combinations of simple column conditions
//! - **Null handling**: predicates with a missing value are dropped or rejected, per [`NullPolicy`]
//! - **Structural or raw**: build SELECT/FROM/JOIN from entities, or start from raw text
//! - **Count derivation**: every query has a matching `count(...)` form, raw text included
//! - **Pagination**: page or offset windows and [`Page`] results with total counts
//! - **Executor agnostic**: statements run through a caller-supplied [`StoreExecutor`]
//!
//! ## Example
//!
//! ```ignore
//! use fluentq::{Predicate, SortDir};
//!
//! let page = fluentq::select::<User>()
//!     .filter([
//!         Predicate::is_not_null("name"),
//!         Predicate::equal("status", form.status), // dropped when None
//!     ])
//!     .or([Predicate::equal("role", "admin")])
//!     .order_by("name", SortDir::Asc)
//!     .page(2, 20)
//!     .get_paged_result(&store)?;
//!
//! // SELECT _this FROM User _this WHERE (_this.name IS NOT NULL AND _this.status = ?1)
//! //   OR (_this.role = ?2) ORDER BY _this.name ASC
//! ```

pub mod client;
pub mod compiler;
pub mod config;
pub mod entity;
pub mod error;
pub mod log;
pub mod pagination;
pub mod predicate;
pub mod query;
pub mod repo;
pub mod row;
pub mod value;

pub use client::{PreparedQuery, StoreExecutor};
pub use compiler::{NullPolicy, PredicateCompiler};
pub use config::{LogLevel, QueryConfig};
pub use entity::{AliasMap, AliasedEntity, Entity, EntityRef};
pub use error::{QueryError, QueryResult, StoreError};
pub use log::QueryKind;
pub use pagination::{Page, Paginator, RowWindow};
pub use predicate::{Op, Predicate, PredicateKind};
pub use query::{CompiledQuery, Mode, QueryBuilder, SortDir, delete, derive_count_query, query, select};
pub use repo::Repository;
pub use row::{FromRow, FromValue, Row};
pub use value::Value;
