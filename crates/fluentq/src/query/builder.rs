//! Fluent state-building methods of [`QueryBuilder`].

use super::{ColumnRef, Connective, JoinSpec, Mode, Projection, QueryBuilder, SortDir, WhereSegment};
use crate::compiler::NullPolicy;
use crate::config::QueryConfig;
use crate::entity::{AliasMap, AliasedEntity, Entity, EntityRef};
use crate::error::QueryError;
use crate::pagination::Paginator;
use crate::predicate::Predicate;
use crate::value::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

impl<E: Entity> Default for QueryBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> QueryBuilder<E> {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(QueryConfig::default())
    }

    /// Create a builder using `config` for its default alias, null policy
    /// and statement logging.
    pub fn with_config(config: QueryConfig) -> Self {
        let aliases = AliasMap::new(config.default_alias.clone());
        Self {
            config,
            mode: None,
            projection: Projection::Entity,
            distinct: false,
            from: None,
            join: None,
            aliases,
            raw: None,
            segments: Vec::new(),
            order_by: Vec::new(),
            group_by: Vec::new(),
            positional: BTreeMap::new(),
            named: BTreeMap::new(),
            paginator: Paginator::new(),
            build_error: None,
            _entity: PhantomData,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Alias of the primary entity.
    pub fn default_alias(&self) -> &str {
        self.aliases.default_alias()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn null_policy(&self) -> NullPolicy {
        self.config.null_policy
    }

    /// Whether `page()` is the active windowing mode.
    pub fn is_paged(&self) -> bool {
        self.paginator.is_paged()
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Whether a raw statement head was given through [`query`](Self::query).
    pub fn is_raw(&self) -> bool {
        self.raw.is_some()
    }

    // ==================== Internal helpers ====================

    /// Record the first precondition violation; later ones are dropped.
    pub(crate) fn fail(&mut self, err: QueryError) {
        if self.build_error.is_none() {
            self.build_error = Some(match err {
                QueryError::IllegalState(message) => message,
                other => other.to_string(),
            });
        }
    }

    /// Clause-building calls need a mode or a raw statement head.
    fn require_mode(&mut self, call: &str) {
        if self.mode.is_none() && self.raw.is_none() {
            self.fail(QueryError::illegal_state(format!(
                "{call}() called before select() or delete()"
            )));
        }
    }

    /// DELETE statements only ever address `E` under the default alias.
    fn reject_in_delete(&mut self, call: &str) {
        if self.mode == Some(Mode::Delete) {
            self.fail(QueryError::illegal_state(format!(
                "{call}() is not supported in Delete mode"
            )));
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        match self.mode {
            None => self.mode = Some(mode),
            Some(current) => self.fail(QueryError::illegal_state(format!(
                "{mode:?} mode requested but builder is already in {current:?} mode"
            ))),
        }
    }

    // ==================== Mode ====================

    /// Select whole `E` entities.
    pub fn select(mut self) -> Self {
        self.set_mode(Mode::Select);
        self
    }

    /// Select whole `N` entities, keeping all state built so far.
    ///
    /// ```ignore
    /// // SELECT u FROM Book b JOIN b.user u
    /// QueryBuilder::<Book>::new().select_as::<User>().from::<Book>("b").join::<User>("user", "u")
    /// ```
    pub fn select_as<N: Entity>(self) -> QueryBuilder<N> {
        self.retarget::<N>().select()
    }

    /// Select a column projection instead of whole entities.
    ///
    /// A bare column is qualified with the default alias. A dotted entry
    /// passes through only when its first segment is an alias bound by
    /// [`from`](Self::from) or [`join`](Self::join); any other dotted entry
    /// is qualified with the default alias as well.
    pub fn select_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_mode(Mode::Select);
        self.projection = Projection::Columns(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Delete matching `E` entities.
    pub fn delete(mut self) -> Self {
        self.set_mode(Mode::Delete);
        self
    }

    /// Change the result entity without touching the built state.
    pub(crate) fn retarget<N: Entity>(self) -> QueryBuilder<N> {
        QueryBuilder {
            config: self.config,
            mode: self.mode,
            projection: self.projection,
            distinct: self.distinct,
            from: self.from,
            join: self.join,
            aliases: self.aliases,
            raw: self.raw,
            segments: self.segments,
            order_by: self.order_by,
            group_by: self.group_by,
            positional: self.positional,
            named: self.named,
            paginator: self.paginator,
            build_error: self.build_error,
            _entity: PhantomData,
        }
    }

    // ==================== FROM / JOIN ====================

    /// Put entity `F` aliased as `alias` in the FROM clause instead of `E`.
    ///
    /// Select mode only; on a delete builder this records `IllegalState`.
    pub fn from<F: Entity>(mut self, alias: impl Into<String>) -> Self {
        self.require_mode("from");
        self.reject_in_delete("from");
        let entity = AliasedEntity::new(EntityRef::of::<F>(), alias);
        self.aliases.bind(&entity.entity, entity.alias.clone());
        self.from = Some(entity);
        self
    }

    /// Join entity `J` through `column` of the FROM entity, aliased as `alias`.
    ///
    /// Renders ` JOIN source.column alias`, where `source` is the alias given
    /// to [`from`](Self::from) or else the default alias. Only one join is
    /// kept; a second call replaces the first. Select mode only.
    pub fn join<J: Entity>(mut self, column: impl Into<String>, alias: impl Into<String>) -> Self {
        self.require_mode("join");
        self.reject_in_delete("join");
        let entity = AliasedEntity::new(EntityRef::of::<J>(), alias);
        self.aliases.bind(&entity.entity, entity.alias.clone());
        self.join = Some(JoinSpec {
            entity,
            column: column.into(),
        });
        self
    }

    /// Select distinct rows. Idempotent.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== WHERE ====================

    /// AND-merge `predicates` and attach them to the WHERE clause with AND.
    ///
    /// The first non-empty call opens the clause with ` WHERE `. No
    /// predicates, or predicates that all drop under the ignore policy, leave
    /// the clause unchanged.
    pub fn filter(self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.push_segment("filter", Connective::And, predicates)
    }

    /// Same as [`filter`](Self::filter).
    pub fn and(self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.push_segment("and", Connective::And, predicates)
    }

    /// AND-merge `predicates` and attach them to the WHERE clause with OR.
    pub fn or(self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.push_segment("or", Connective::Or, predicates)
    }

    fn push_segment(
        mut self,
        call: &str,
        connective: Connective,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> Self {
        self.require_mode(call);
        let predicates: Vec<Predicate> = predicates.into_iter().collect();
        if predicates.is_empty() {
            return self;
        }
        self.segments.push(WhereSegment {
            connective,
            predicate: Predicate::and(predicates),
        });
        self
    }

    // ==================== Ordering & Grouping ====================

    /// Append `default_alias.column direction` to ORDER BY.
    pub fn order_by(self, column: impl Into<String>, direction: SortDir) -> Self {
        self.push_order(None, column.into(), direction)
    }

    /// Append `alias.column direction` to ORDER BY.
    pub fn order_by_alias(
        self,
        alias: impl Into<String>,
        column: impl Into<String>,
        direction: SortDir,
    ) -> Self {
        self.push_order(Some(alias.into()), column.into(), direction)
    }

    fn push_order(mut self, alias: Option<String>, column: String, direction: SortDir) -> Self {
        self.require_mode("order_by");
        self.order_by.push((ColumnRef { alias, column }, direction));
        self
    }

    /// Append `default_alias.column` to GROUP BY.
    pub fn group_by(self, column: impl Into<String>) -> Self {
        self.push_group(None, column.into())
    }

    /// Append `alias.column` to GROUP BY.
    pub fn group_by_alias(self, alias: impl Into<String>, column: impl Into<String>) -> Self {
        self.push_group(Some(alias.into()), column.into())
    }

    fn push_group(mut self, alias: Option<String>, column: String) -> Self {
        self.require_mode("group_by");
        self.group_by.push(ColumnRef { alias, column });
        self
    }

    // ==================== Raw text & parameters ====================

    /// Use `text` as the statement head instead of a built SELECT/FROM/JOIN.
    ///
    /// Any projection, FROM or JOIN state built so far is discarded. WHERE,
    /// GROUP BY and ORDER BY calls still append after the raw text.
    pub fn query(mut self, text: impl Into<String>) -> Self {
        self.raw = Some(text.into());
        self.projection = Projection::Entity;
        self.from = None;
        self.join = None;
        self.aliases.clear();
        self
    }

    /// Bind `value` to the `?position` placeholder. Last write wins.
    pub fn param(mut self, position: usize, value: impl Into<Value>) -> Self {
        if position == 0 {
            self.fail(QueryError::illegal_state(
                "positional parameters are 1-based, got ?0",
            ));
            return self;
        }
        self.positional.insert(position, value.into());
        self
    }

    /// Bind `value` to the `:name` placeholder. Last write wins.
    pub fn param_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Drop (`true`) or reject (`false`) predicates whose required value is
    /// null. Takes effect when the query is compiled.
    pub fn ignore_null(mut self, ignore: bool) -> Self {
        self.config.null_policy = NullPolicy::from_ignore(ignore);
        self
    }

    pub fn with_null_policy(mut self, policy: NullPolicy) -> Self {
        self.config.null_policy = policy;
        self
    }

    // ==================== Windowing ====================

    /// Window by 1-based page number and page size, marking the query as
    /// paged. A missing argument makes this a no-op.
    pub fn page(mut self, page: impl Into<Option<u64>>, size: impl Into<Option<u64>>) -> Self {
        if let Err(e) = self.paginator.page(page, size) {
            self.fail(e);
        }
        self
    }

    /// Window by row offset and count, marking the query as not paged. A
    /// missing argument makes this a no-op.
    pub fn limit(mut self, offset: impl Into<Option<u64>>, count: impl Into<Option<u64>>) -> Self {
        self.paginator.limit(offset, count);
        self
    }
}
