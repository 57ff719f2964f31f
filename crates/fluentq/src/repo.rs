//! Per-entity convenience queries.

use crate::client::StoreExecutor;
use crate::config::QueryConfig;
use crate::entity::Entity;
use crate::error::QueryResult;
use crate::predicate::Predicate;
use crate::query::QueryBuilder;
use crate::row::{FromRow, Row};
use std::marker::PhantomData;

/// Common read queries over entity `E`, run through executor `X`.
///
/// # Example
/// ```ignore
/// let users = Repository::<User, _>::new(store);
/// let total = users.total_count()?;
/// let names = users.column_values("name", [Predicate::is_not_null("name")])?;
/// ```
pub struct Repository<E, X> {
    exec: X,
    config: QueryConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, X: StoreExecutor> Repository<E, X> {
    pub fn new(exec: X) -> Self {
        Self::with_config(exec, QueryConfig::default())
    }

    pub fn with_config(exec: X, config: QueryConfig) -> Self {
        Self {
            exec,
            config,
            _entity: PhantomData,
        }
    }

    pub fn executor(&self) -> &X {
        &self.exec
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// A fresh builder over `E` carrying this repository's configuration.
    pub fn begin_query(&self) -> QueryBuilder<E> {
        QueryBuilder::with_config(self.config.clone())
    }

    /// Number of `E` rows.
    pub fn total_count(&self) -> QueryResult<i64> {
        self.begin_query().select().count(&self.exec)
    }

    /// Every `E` row.
    pub fn find_all(&self) -> QueryResult<Vec<E>>
    where
        E: FromRow,
    {
        self.begin_query().select().get_result_list(&self.exec)
    }

    /// Distinct values of `column` among rows matching `predicates`,
    /// one single-column row per value.
    pub fn column_values(
        &self,
        column: &str,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> QueryResult<Vec<Row>> {
        self.begin_query()
            .select_columns([column])
            .filter(predicates)
            .group_by(column)
            .get_untyped_result_list(&self.exec)
    }
}
