//! Terminal calls: compile, run through the executor, shape the result.

use super::{CompiledQuery, QueryBuilder};
use crate::client::{PreparedQuery, StoreExecutor};
use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::log::{QueryKind, log_query};
use crate::pagination::Page;
use crate::row::{FromRow, Row};

impl<E: Entity> QueryBuilder<E> {
    // ==================== Internal helpers ====================

    fn prepare(&self, exec: &impl StoreExecutor, compiled: CompiledQuery) -> QueryResult<PreparedQuery> {
        let prepared = exec.prepare(&compiled.text, &compiled.positional, &compiled.named)?;
        Ok(prepared.with_window(compiled.window))
    }

    fn run_count(&self, exec: &impl StoreExecutor) -> QueryResult<i64> {
        let prepared = self.prepare(exec, self.build_count()?)?;
        log_query(&self.config, QueryKind::Count, &prepared);
        let row = exec.query_one(&prepared)?;
        row.try_get::<i64>(0usize)
    }

    fn run_query(&self, exec: &impl StoreExecutor) -> QueryResult<Vec<Row>> {
        let prepared = self.prepare(exec, self.build()?)?;
        log_query(&self.config, QueryKind::Select, &prepared);
        exec.query(&prepared)
    }

    // ==================== Scalars ====================

    /// Number of matching rows.
    pub fn count(self, exec: &impl StoreExecutor) -> QueryResult<i64> {
        self.run_count(exec)
    }

    /// Whether at least one row matches.
    pub fn has_result(self, exec: &impl StoreExecutor) -> QueryResult<bool> {
        Ok(self.run_count(exec)? != 0)
    }

    /// Whether no row matches.
    pub fn has_no_result(self, exec: &impl StoreExecutor) -> QueryResult<bool> {
        Ok(self.run_count(exec)? == 0)
    }

    /// Run an update/delete statement and return the affected row count.
    pub fn execute(self, exec: &impl StoreExecutor) -> QueryResult<u64> {
        let prepared = self.prepare(exec, self.build()?)?;
        log_query(&self.config, QueryKind::Execute, &prepared);
        exec.execute(&prepared)
    }

    // ==================== Rows ====================

    /// The single result row.
    ///
    /// Zero or several rows are reported by the executor, see
    /// [`StoreExecutor::query_one`].
    pub fn get_single_result(self, exec: &impl StoreExecutor) -> QueryResult<Row> {
        let prepared = self.prepare(exec, self.build()?)?;
        log_query(&self.config, QueryKind::Select, &prepared);
        exec.query_one(&prepared)
    }

    /// First matching entity, fetched with a window of one row.
    pub fn get_first_result(self, exec: &impl StoreExecutor) -> QueryResult<Option<E>>
    where
        E: FromRow,
    {
        self.get_first_row(exec)?
            .map(|row| E::from_row(&row))
            .transpose()
    }

    /// First matching row, fetched with a window of one row.
    pub fn get_first_row(mut self, exec: &impl StoreExecutor) -> QueryResult<Option<Row>> {
        self.paginator.limit(0, 1);
        Ok(self.run_query(exec)?.into_iter().next())
    }

    /// All matching entities inside the current window.
    pub fn get_result_list(self, exec: &impl StoreExecutor) -> QueryResult<Vec<E>>
    where
        E: FromRow,
    {
        self.get_result_list_as::<E>(exec)
    }

    /// All matching rows decoded as `R`, e.g. a tuple for a column projection.
    pub fn get_result_list_as<R: FromRow>(self, exec: &impl StoreExecutor) -> QueryResult<Vec<R>> {
        let rows = self.run_query(exec)?;
        rows.iter().map(R::from_row).collect()
    }

    /// All matching rows, undecoded.
    pub fn get_untyped_result_list(self, exec: &impl StoreExecutor) -> QueryResult<Vec<Row>> {
        self.run_query(exec)
    }

    // ==================== Pages ====================

    /// The current page of entities together with the total count.
    ///
    /// Requires [`page`](Self::page); fails with [`QueryError::NotPaginated`]
    /// otherwise.
    pub fn get_paged_result(self, exec: &impl StoreExecutor) -> QueryResult<Page<E>>
    where
        E: FromRow,
    {
        self.get_paged_result_as::<E>(exec)
    }

    /// Like [`get_paged_result`](Self::get_paged_result), decoding rows as `R`.
    ///
    /// Runs a count statement and then the windowed data statement inside
    /// [`StoreExecutor::snapshot`]. Unless the executor isolates the two, a
    /// concurrent write between them can make `total` and `data` disagree.
    pub fn get_paged_result_as<R: FromRow>(
        self,
        exec: &impl StoreExecutor,
    ) -> QueryResult<Page<R>> {
        self.validate()?;
        let (Some(page), Some(size)) = (self.paginator.page_number(), self.paginator.page_size())
        else {
            return Err(QueryError::NotPaginated);
        };

        exec.snapshot(|exec| {
            let total = self.run_count(exec)?;
            let total = u64::try_from(total)
                .map_err(|_| QueryError::decode("count", format!("negative row count {total}")))?;
            let rows = self.run_query(exec)?;
            let data = rows.iter().map(R::from_row).collect::<QueryResult<Vec<_>>>()?;
            Ok(Page::new(page, size, total, data))
        })
    }
}
