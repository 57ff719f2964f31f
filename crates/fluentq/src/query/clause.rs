//! Compilation of builder state into statement text.
//!
//! Clause order: head (SELECT ... FROM / DELETE FROM / raw text), JOIN,
//! WHERE, GROUP BY, ORDER BY. Count statements omit ORDER BY and the row
//! window.

use super::{ColumnRef, CompiledQuery, Mode, Projection, QueryBuilder, derive_count_query};
use crate::compiler::PredicateCompiler;
use crate::entity::{Entity, EntityRef};
use crate::error::{QueryError, QueryResult};

impl<E: Entity> QueryBuilder<E> {
    /// Compile the row-returning (or delete) statement.
    ///
    /// Predicates are rendered now, under the null policy active at this
    /// point; a rejected predicate fails the build.
    pub fn build(&self) -> QueryResult<CompiledQuery> {
        self.compile(false)
    }

    /// Compile the count statement over the same filter state.
    pub fn build_count(&self) -> QueryResult<CompiledQuery> {
        self.compile(true)
    }

    pub(crate) fn validate(&self) -> QueryResult<()> {
        if let Some(ref err) = self.build_error {
            return Err(QueryError::IllegalState(err.clone()));
        }
        if self.mode.is_none() && self.raw.is_none() {
            return Err(QueryError::illegal_state(
                "no select(), delete() or query() given",
            ));
        }
        Ok(())
    }

    fn compile(&self, count: bool) -> QueryResult<CompiledQuery> {
        self.validate()?;

        let mut text = self.render_head(count)?;
        self.render_join(&mut text);

        // Predicate values are numbered after the highest explicit position.
        let first_index = self
            .positional
            .keys()
            .next_back()
            .map_or(1, |last| last + 1);
        let mut compiler =
            PredicateCompiler::new(self.config.null_policy, &self.aliases, first_index);

        let mut opened = false;
        for segment in &self.segments {
            let rendered = compiler.compile(&segment.predicate)?;
            if rendered.is_empty() {
                continue;
            }
            text.push_str(if opened {
                segment.connective.to_sql()
            } else {
                " WHERE "
            });
            text.push_str(&rendered);
            opened = true;
        }

        if !self.group_by.is_empty() {
            let items: Vec<String> = self.group_by.iter().map(|c| self.render_ref(c)).collect();
            text.push_str(" GROUP BY ");
            text.push_str(&items.join(", "));
        }

        if !count && !self.order_by.is_empty() {
            let items: Vec<String> = self
                .order_by
                .iter()
                .map(|(c, dir)| format!("{} {}", self.render_ref(c), dir.to_sql()))
                .collect();
            text.push_str(" ORDER BY ");
            text.push_str(&items.join(", "));
        }

        let mut positional = self.positional.clone();
        positional.extend(compiler.into_params());

        Ok(CompiledQuery {
            text,
            positional,
            named: self.named.clone(),
            window: if count { None } else { self.paginator.window() },
        })
    }

    fn render_head(&self, count: bool) -> QueryResult<String> {
        if let Some(ref raw) = self.raw {
            return if count {
                derive_count_query(raw)
            } else {
                Ok(raw.clone())
            };
        }

        let default_alias = self.aliases.default_alias();
        match self.mode {
            Some(Mode::Delete) if count => Err(QueryError::illegal_state(
                "count() is not available for delete queries",
            )),
            Some(Mode::Delete) => Ok(format!(
                "DELETE FROM {} {default_alias}",
                E::entity_name()
            )),
            _ => {
                let projection = self.render_projection();
                let selected = match (count, self.distinct) {
                    (true, true) => format!("count(DISTINCT {projection})"),
                    (true, false) => format!("count({projection})"),
                    (false, true) => format!("DISTINCT {projection}"),
                    (false, false) => projection,
                };
                let from = match self.from {
                    Some(ref from) => format!("{} {}", from.entity.name(), from.alias),
                    None => format!("{} {default_alias}", E::entity_name()),
                };
                Ok(format!("SELECT {selected} FROM {from}"))
            }
        }
    }

    fn render_projection(&self) -> String {
        match self.projection {
            Projection::Entity => self.aliases.resolve(&EntityRef::of::<E>()).to_string(),
            Projection::Columns(ref columns) => columns
                .iter()
                .map(|c| self.qualify(c))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// `alias.column` passes through when `alias` was bound by from/join;
    /// everything else gets the default alias prefix.
    fn qualify(&self, column: &str) -> String {
        match column.split_once('.') {
            Some((head, _)) if self.aliases.is_bound_alias(head) => column.to_string(),
            _ => format!("{}.{column}", self.aliases.default_alias()),
        }
    }

    fn render_join(&self, text: &mut String) {
        if self.raw.is_some() || self.mode == Some(Mode::Delete) {
            return;
        }
        if let Some(ref join) = self.join {
            let source = match self.from {
                Some(ref from) => from.alias.as_str(),
                None => self.aliases.default_alias(),
            };
            text.push_str(&format!(
                " JOIN {source}.{} {}",
                join.column, join.entity.alias
            ));
        }
    }

    fn render_ref(&self, item: &ColumnRef) -> String {
        let alias = item
            .alias
            .as_deref()
            .unwrap_or(self.aliases.default_alias());
        format!("{alias}.{}", item.column)
    }
}
