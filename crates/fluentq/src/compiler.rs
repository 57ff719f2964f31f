//! Rendering of predicate trees into clause text.
//!
//! [`PredicateCompiler`] walks a [`Predicate`] depth-first, binds every leaf
//! value as a positional `?N` parameter and applies the active [`NullPolicy`]
//! to leaves whose required value is null.

use crate::entity::AliasMap;
use crate::error::{QueryError, QueryResult};
use crate::predicate::{Leaf, Node, Op, Operand, Predicate, Target};
use crate::value::Value;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// What to do with a predicate whose required value is null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Drop the predicate silently.
    #[default]
    Ignore,
    /// Fail with [`QueryError::InvalidPredicate`].
    Reject,
}

impl NullPolicy {
    /// `true` maps to [`NullPolicy::Ignore`].
    pub fn from_ignore(ignore: bool) -> Self {
        if ignore { Self::Ignore } else { Self::Reject }
    }
}

/// Renders predicate trees and collects their bound values.
///
/// One compiler is used per compiled statement so that placeholder numbers
/// keep increasing across all WHERE segments.
#[derive(Debug)]
pub struct PredicateCompiler<'a> {
    policy: NullPolicy,
    aliases: &'a AliasMap,
    next_index: usize,
    params: BTreeMap<usize, Value>,
}

impl<'a> PredicateCompiler<'a> {
    /// Create a compiler whose first placeholder is `?{first_index}`.
    pub fn new(policy: NullPolicy, aliases: &'a AliasMap, first_index: usize) -> Self {
        Self {
            policy,
            aliases,
            next_index: first_index.max(1),
            params: BTreeMap::new(),
        }
    }

    pub fn policy(&self) -> NullPolicy {
        self.policy
    }

    /// Render `predicate`. An empty string means the predicate was dropped.
    ///
    /// Under [`NullPolicy::Reject`] the first invalid leaf in document order
    /// aborts compilation; nothing is bound in that case.
    pub fn compile(&mut self, predicate: &Predicate) -> QueryResult<String> {
        if self.policy == NullPolicy::Reject {
            if let Some(leaf) = predicate.first_invalid() {
                return Err(QueryError::invalid_predicate(
                    leaf.column(),
                    format!("null value for operator {}", leaf.op()),
                ));
            }
        }
        Ok(self.render(predicate))
    }

    /// Values bound so far, keyed by placeholder position.
    pub fn into_params(self) -> BTreeMap<usize, Value> {
        self.params
    }

    fn render(&mut self, predicate: &Predicate) -> String {
        match &predicate.0 {
            Node::Simple(leaf) => {
                if leaf.is_valid() {
                    self.render_leaf(leaf)
                } else {
                    String::new()
                }
            }
            Node::And(children) => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|c| self.render(c))
                    .filter(|s| !s.is_empty())
                    .collect();
                if parts.is_empty() {
                    String::new()
                } else {
                    format!("({})", parts.join(" AND "))
                }
            }
            // Empty children still take their slot between the ORs.
            Node::Or(children) => {
                if predicate.is_empty() {
                    return String::new();
                }
                let parts: Vec<String> = children.iter().map(|c| self.render(c)).collect();
                format!("({})", parts.join(" OR "))
            }
            Node::Not(inner) => format!("NOT ({})", self.render(inner)),
        }
    }

    fn render_leaf(&mut self, leaf: &Leaf) -> String {
        let alias = match &leaf.target {
            Target::Default => self.aliases.default_alias(),
            Target::Alias(alias) => alias.as_str(),
            Target::Entity(entity) => self.aliases.resolve(entity),
        };
        let column = format!("{alias}.{}", leaf.column);
        let op = leaf.op;

        match &leaf.operand {
            Operand::None => format!("{column} {op}"),
            Operand::Single(v) => {
                let p = self.bind(v.clone());
                format!("{column} {op} ?{p}")
            }
            Operand::Pair(a, b) => {
                let p1 = self.bind(a.clone());
                let p2 = self.bind(b.clone());
                format!("{column} {op} ?{p1} AND ?{p2}")
            }
            Operand::List(Value::List(items)) => {
                if items.is_empty() {
                    // Empty IN is always false, empty NOT IN always true
                    return if op == Op::In {
                        "1=0".to_string()
                    } else {
                        "1=1".to_string()
                    };
                }
                let mut out = format!("{column} {op} (");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let p = self.bind(item.clone());
                    let _ = write!(out, "?{p}");
                }
                out.push(')');
                out
            }
            Operand::List(scalar) => {
                let p = self.bind(scalar.clone());
                format!("{column} {op} (?{p})")
            }
        }
    }

    fn bind(&mut self, value: Value) -> usize {
        let idx = self.next_index;
        self.params.insert(idx, value);
        self.next_index += 1;
        idx
    }
}
