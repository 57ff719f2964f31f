//! Predicate trees for WHERE clauses.
//!
//! A [`Predicate`] is either a simple comparison over one column or a boolean
//! combination (AND / OR / NOT) of other predicates. Trees are immutable once
//! built; rendering them into clause text is the job of
//! [`PredicateCompiler`](crate::compiler::PredicateCompiler).
//!
//! # Example
//! ```ignore
//! use fluentq::Predicate;
//!
//! let filter = Predicate::and([
//!     Predicate::equal("status", "active"),
//!     Predicate::or([
//!         Predicate::equal("role", "admin"),
//!         Predicate::greater_than("reputation", 100),
//!     ]),
//! ]);
//! ```

use crate::entity::{Entity, EntityRef};
use crate::error::{QueryError, QueryResult};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a simple predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// column = value
    Equal,
    /// column <> value
    NotEqual,
    /// column > value
    GreaterThan,
    /// column >= value
    GreaterOrEqual,
    /// column < value
    LessThan,
    /// column <= value
    LessOrEqual,
    /// column LIKE pattern
    Like,
    /// column NOT LIKE pattern
    NotLike,
    /// column IN (values...)
    In,
    /// column NOT IN (values...)
    NotIn,
    /// column BETWEEN a AND b
    Between,
    /// column IS NULL
    IsNull,
    /// column IS NOT NULL
    IsNotNull,
}

/// Number of operands an [`Op`] takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
    Two,
    /// A sequence of values
    List,
}

impl Op {
    /// Operator keyword as emitted in clause text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Equal => "=",
            Op::NotEqual => "<>",
            Op::GreaterThan => ">",
            Op::GreaterOrEqual => ">=",
            Op::LessThan => "<",
            Op::LessOrEqual => "<=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::In => "IN",
            Op::NotIn => "NOT IN",
            Op::Between => "BETWEEN",
            Op::IsNull => "IS NULL",
            Op::IsNotNull => "IS NOT NULL",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Op::IsNull | Op::IsNotNull => Arity::None,
            Op::Between => Arity::Two,
            Op::In | Op::NotIn => Arity::List,
            _ => Arity::One,
        }
    }

    /// Null-safe operators never need a bound value.
    pub fn is_null_safe(&self) -> bool {
        self.arity() == Arity::None
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = QueryError;

    /// Parse an operator from its keyword (`"<>"`, `"not in"`) or short name
    /// (`"ne"`, `"not_in"`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        let op = match normalized.as_str() {
            "=" | "==" | "eq" | "equal" => Op::Equal,
            "<>" | "!=" | "ne" | "not equal" => Op::NotEqual,
            ">" | "gt" => Op::GreaterThan,
            ">=" | "gte" | "ge" => Op::GreaterOrEqual,
            "<" | "lt" => Op::LessThan,
            "<=" | "lte" | "le" => Op::LessOrEqual,
            "like" => Op::Like,
            "not like" => Op::NotLike,
            "in" => Op::In,
            "not in" => Op::NotIn,
            "between" => Op::Between,
            "is null" | "null" => Op::IsNull,
            "is not null" | "not null" => Op::IsNotNull,
            _ => return Err(QueryError::UnsupportedPredicateKind(s.to_string())),
        };
        Ok(op)
    }
}

/// Values bound by a simple predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Single(Value),
    Pair(Value, Value),
    /// `Value::List` for a sequence, `Value::Null` for a missing one
    List(Value),
}

impl Operand {
    fn has_null(&self) -> bool {
        match self {
            Operand::None => false,
            Operand::Single(v) | Operand::List(v) => v.is_null(),
            Operand::Pair(a, b) => a.is_null() || b.is_null(),
        }
    }
}

/// Which alias qualifies the column of a simple predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// The query's default alias
    Default,
    /// An explicit alias, e.g. one bound by `join()`
    Alias(String),
    /// The alias bound to an entity, falling back to the default alias
    Entity(EntityRef),
}

/// A single-column condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub(crate) target: Target,
    pub(crate) column: String,
    pub(crate) op: Op,
    pub(crate) operand: Operand,
    valid: bool,
}

impl Leaf {
    fn new(column: impl Into<String>, op: Op, operand: Operand) -> Self {
        let valid = op.is_null_safe() || !operand.has_null();
        Self {
            target: Target::Default,
            column: column.into(),
            op,
            operand,
            valid,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// False when the operator needs a value and the value is null.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Kind of a predicate node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    Simple,
    And,
    Or,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Simple(Leaf),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

/// A WHERE clause predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate(pub(crate) Node);

impl Predicate {
    fn leaf(column: impl Into<String>, op: Op, operand: Operand) -> Self {
        Predicate(Node::Simple(Leaf::new(column, op, operand)))
    }

    /// Build a simple predicate from an operator and a list of values,
    /// checking that the value count matches the operator.
    ///
    /// `In`/`NotIn` accept any number of values; a single value that is
    /// already a list (or null) is used as the whole sequence.
    pub fn simple(column: impl Into<String>, op: Op, mut values: Vec<Value>) -> QueryResult<Self> {
        let column = column.into();
        let operand = match (op.arity(), values.len()) {
            (Arity::None, 0) => Operand::None,
            (Arity::One, 1) => Operand::Single(values.remove(0)),
            (Arity::Two, 2) => {
                let b = values.remove(1);
                Operand::Pair(values.remove(0), b)
            }
            (Arity::List, 1) if matches!(values[0], Value::List(_) | Value::Null) => {
                Operand::List(values.remove(0))
            }
            (Arity::List, _) => Operand::List(Value::List(values)),
            (arity, got) => {
                return Err(QueryError::invalid_predicate(
                    column,
                    format!("operator {op} expects {arity:?} operand(s), got {got}"),
                ));
            }
        };
        Ok(Self::leaf(column, op, operand))
    }

    /// Build a simple predicate from an operator name such as `"eq"` or `"not in"`.
    pub fn parse(column: impl Into<String>, op: &str, values: Vec<Value>) -> QueryResult<Self> {
        Self::simple(column, op.parse()?, values)
    }

    // ==================== Factories ====================

    /// column = value
    pub fn equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(column, Op::Equal, Operand::Single(value.into()))
    }

    /// column <> value
    pub fn not_equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(column, Op::NotEqual, Operand::Single(value.into()))
    }

    /// column > value
    pub fn greater_than(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(column, Op::GreaterThan, Operand::Single(value.into()))
    }

    /// column >= value
    pub fn greater_or_equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(column, Op::GreaterOrEqual, Operand::Single(value.into()))
    }

    /// column < value
    pub fn less_than(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(column, Op::LessThan, Operand::Single(value.into()))
    }

    /// column <= value
    pub fn less_or_equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(column, Op::LessOrEqual, Operand::Single(value.into()))
    }

    /// column LIKE pattern
    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::leaf(column, Op::Like, Operand::Single(pattern.into()))
    }

    /// column NOT LIKE pattern
    pub fn not_like(column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Self::leaf(column, Op::NotLike, Operand::Single(pattern.into()))
    }

    /// column IN (values...)
    ///
    /// `values` is usually a `Vec<T>`; `None` yields a null (invalid) operand.
    pub fn in_list(column: impl Into<String>, values: impl Into<Value>) -> Self {
        Self::leaf(column, Op::In, Operand::List(values.into()))
    }

    /// column NOT IN (values...)
    pub fn not_in(column: impl Into<String>, values: impl Into<Value>) -> Self {
        Self::leaf(column, Op::NotIn, Operand::List(values.into()))
    }

    /// column BETWEEN from AND to
    pub fn between(
        column: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        Self::leaf(column, Op::Between, Operand::Pair(from.into(), to.into()))
    }

    /// column IS NULL
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::leaf(column, Op::IsNull, Operand::None)
    }

    /// column IS NOT NULL
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::leaf(column, Op::IsNotNull, Operand::None)
    }

    /// Conjunction of `predicates`, kept in the given order.
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate(Node::And(predicates.into_iter().collect()))
    }

    /// Disjunction of `predicates`, kept in the given order.
    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate(Node::Or(predicates.into_iter().collect()))
    }

    /// Negation of `predicate`.
    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: Predicate) -> Self {
        Predicate(Node::Not(Box::new(predicate)))
    }

    // ==================== Targeting ====================

    /// Qualify columns with `alias` instead of the default alias.
    ///
    /// Applies to every simple predicate in the tree that has no target yet.
    pub fn alias(self, alias: impl Into<String>) -> Self {
        self.retarget(&Target::Alias(alias.into()))
    }

    /// Qualify columns with the alias bound to entity `E`.
    pub fn of<E: Entity>(self) -> Self {
        self.retarget(&Target::Entity(EntityRef::of::<E>()))
    }

    fn retarget(self, target: &Target) -> Self {
        let node = match self.0 {
            Node::Simple(mut leaf) => {
                if leaf.target == Target::Default {
                    leaf.target = target.clone();
                }
                Node::Simple(leaf)
            }
            Node::And(children) => {
                Node::And(children.into_iter().map(|c| c.retarget(target)).collect())
            }
            Node::Or(children) => {
                Node::Or(children.into_iter().map(|c| c.retarget(target)).collect())
            }
            Node::Not(inner) => Node::Not(Box::new(inner.retarget(target))),
        };
        Predicate(node)
    }

    // ==================== Inspection ====================

    pub fn kind(&self) -> PredicateKind {
        match &self.0 {
            Node::Simple(_) => PredicateKind::Simple,
            Node::And(_) => PredicateKind::And,
            Node::Or(_) => PredicateKind::Or,
            Node::Not(_) => PredicateKind::Not,
        }
    }

    /// The leaf of a simple predicate.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match &self.0 {
            Node::Simple(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Child predicates of a composite node, empty for a simple one.
    pub fn children(&self) -> &[Predicate] {
        match &self.0 {
            Node::Simple(_) => &[],
            Node::And(children) | Node::Or(children) => children,
            Node::Not(inner) => std::slice::from_ref(inner.as_ref()),
        }
    }

    /// Only simple predicates can be invalid.
    pub fn is_valid(&self) -> bool {
        match &self.0 {
            Node::Simple(leaf) => leaf.is_valid(),
            _ => true,
        }
    }

    /// True for an AND/OR node none of whose children contribute any text
    /// once invalid leaves are dropped.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Node::Simple(_) | Node::Not(_) => false,
            Node::And(children) | Node::Or(children) => children.iter().all(|c| c.drops()),
        }
    }

    /// Whether this node renders to nothing under the ignore policy.
    pub(crate) fn drops(&self) -> bool {
        !self.is_valid() || self.is_empty()
    }

    /// First invalid leaf in document order.
    pub fn first_invalid(&self) -> Option<&Leaf> {
        match &self.0 {
            Node::Simple(leaf) => (!leaf.is_valid()).then_some(leaf),
            _ => self.children().iter().find_map(Predicate::first_invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_is_computed_at_construction() {
        assert!(Predicate::equal("name", "alice").is_valid());
        assert!(!Predicate::equal("name", Option::<String>::None).is_valid());
        assert!(Predicate::is_null("name").is_valid());
        assert!(Predicate::is_not_null("name").is_valid());
        assert!(!Predicate::in_list("id", Option::<Vec<i32>>::None).is_valid());
        assert!(!Predicate::between("age", 1, Option::<i32>::None).is_valid());
    }

    #[test]
    fn composite_keeps_children_in_order() {
        let p = Predicate::or([
            Predicate::equal("a", 1),
            Predicate::and([Predicate::equal("b", 2), Predicate::equal("c", 3)]),
        ]);
        assert_eq!(p.kind(), PredicateKind::Or);
        assert_eq!(p.children().len(), 2);
        assert_eq!(p.children()[1].kind(), PredicateKind::And);
        assert_eq!(p.children()[0].as_leaf().unwrap().column(), "a");
    }

    #[test]
    fn emptiness_follows_dropped_children() {
        let none = Option::<i32>::None;
        assert!(Predicate::and([]).is_empty());
        assert!(Predicate::and([Predicate::equal("a", none)]).is_empty());
        assert!(!Predicate::and([Predicate::equal("a", none), Predicate::equal("b", 1)]).is_empty());
        assert!(Predicate::or([Predicate::and([Predicate::equal("a", none)])]).is_empty());
        assert!(!Predicate::not(Predicate::equal("a", none)).is_empty());
    }

    #[test]
    fn alias_applies_to_untargeted_leaves() {
        let p = Predicate::and([
            Predicate::equal("name", "x"),
            Predicate::equal("title", "y").alias("b"),
        ])
        .alias("u");

        let leaves: Vec<_> = p.children().iter().filter_map(Predicate::as_leaf).collect();
        assert_eq!(leaves[0].target(), &Target::Alias("u".into()));
        assert_eq!(leaves[1].target(), &Target::Alias("b".into()));
    }

    #[test]
    fn op_parses_keywords_and_names() {
        assert_eq!("=".parse::<Op>().unwrap(), Op::Equal);
        assert_eq!("NOT IN".parse::<Op>().unwrap(), Op::NotIn);
        assert_eq!("not_in".parse::<Op>().unwrap(), Op::NotIn);
        assert_eq!("is  not null".parse::<Op>().unwrap(), Op::IsNotNull);
        assert!(matches!(
            "~=".parse::<Op>(),
            Err(QueryError::UnsupportedPredicateKind(op)) if op == "~="
        ));
    }

    #[test]
    fn simple_checks_arity() {
        assert!(Predicate::simple("a", Op::Equal, vec![Value::Int(1)]).is_ok());
        assert!(Predicate::simple("a", Op::IsNull, vec![]).is_ok());
        let err = Predicate::simple("a", Op::Between, vec![Value::Int(1)]).unwrap_err();
        assert!(err.is_invalid_predicate());

        let p = Predicate::parse("id", "in", vec![Value::Int(1), Value::Int(2)]).unwrap();
        assert_eq!(
            p.as_leaf().unwrap().operand(),
            &Operand::List(Value::List(vec![Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn first_invalid_in_document_order() {
        let p = Predicate::and([
            Predicate::equal("a", 1),
            Predicate::or([
                Predicate::equal("b", Option::<i32>::None),
                Predicate::equal("c", Option::<i32>::None),
            ]),
        ]);
        assert_eq!(p.first_invalid().unwrap().column(), "b");
    }
}
