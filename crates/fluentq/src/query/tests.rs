use super::*;
use crate::compiler::NullPolicy;
use crate::entity::Entity;
use crate::error::QueryError;
use crate::pagination::RowWindow;
use crate::predicate::Predicate;
use crate::value::Value;

struct User;
struct Book;
struct Person;

impl Entity for User {
    fn entity_name() -> &'static str {
        "User"
    }
}

impl Entity for Book {
    fn entity_name() -> &'static str {
        "Book"
    }
}

impl Entity for Person {
    fn entity_name() -> &'static str {
        "Person"
    }
}

fn none() -> Option<String> {
    None
}

fn sql<E: Entity>(qb: &QueryBuilder<E>) -> String {
    qb.build().unwrap().text
}

fn count_sql<E: Entity>(qb: &QueryBuilder<E>) -> String {
    qb.build_count().unwrap().text
}

// ==================== Heads ====================

#[test]
fn select_whole_entity() {
    let qb = select::<User>();
    assert_eq!(sql(&qb), "SELECT _this FROM User _this");
    assert_eq!(count_sql(&qb), "SELECT count(_this) FROM User _this");
}

#[test]
fn delete_head() {
    let qb = delete::<Person>().filter([Predicate::equal("name", "alice")]);
    let compiled = qb.build().unwrap();
    assert_eq!(compiled.text, "DELETE FROM Person _this WHERE (_this.name = ?1)");
    assert_eq!(compiled.positional[&1], Value::Text("alice".into()));
    assert!(qb.build_count().is_err());
}

#[test]
fn select_columns_are_qualified() {
    let qb = QueryBuilder::<Book>::new()
        .select_columns(["id", "title", "u.id", "user.id"])
        .join::<User>("user", "u")
        .filter([Predicate::is_not_null("title")]);
    assert_eq!(
        sql(&qb),
        "SELECT _this.id, _this.title, u.id, _this.user.id FROM Book _this \
         JOIN _this.user u WHERE (_this.title IS NOT NULL)"
    );
}

#[test]
fn select_from_join() {
    let qb = QueryBuilder::<Book>::new()
        .select_as::<User>()
        .from::<Book>("b")
        .join::<User>("user", "u")
        .filter([Predicate::equal("title", "Childhood's End").alias("b")]);
    assert_eq!(
        sql(&qb),
        "SELECT u FROM Book b JOIN b.user u WHERE (b.title = ?1)"
    );
}

#[test]
fn join_source_defaults_to_primary_alias() {
    let qb = select::<Book>()
        .join::<User>("user", "u")
        .filter([Predicate::equal("name", "alice").of::<User>()]);
    assert_eq!(
        sql(&qb),
        "SELECT _this FROM Book _this JOIN _this.user u WHERE (u.name = ?1)"
    );
}

#[test]
fn second_join_overwrites_first() {
    let qb = select::<Book>()
        .join::<User>("user", "u")
        .join::<Person>("owner", "p");
    assert_eq!(sql(&qb), "SELECT _this FROM Book _this JOIN _this.owner p");
}

#[test]
fn distinct_is_idempotent() {
    let once = QueryBuilder::<User>::new().select_columns(["name"]).distinct();
    let twice = QueryBuilder::<User>::new()
        .select_columns(["name"])
        .distinct()
        .distinct();
    assert_eq!(sql(&once), "SELECT DISTINCT _this.name FROM User _this");
    assert_eq!(sql(&once), sql(&twice));
    assert_eq!(count_sql(&twice), "SELECT count(DISTINCT _this.name) FROM User _this");
}

// ==================== WHERE ====================

#[test]
fn where_and_or_segments() {
    let qb = select::<User>()
        .filter([Predicate::and([
            Predicate::equal("name", "alice"),
            Predicate::equal("sort", 0),
        ])])
        .or([Predicate::and([
            Predicate::equal("name", "carol"),
            Predicate::equal("sort", 2),
        ])]);
    let compiled = qb.build_count().unwrap();
    assert_eq!(
        compiled.text,
        "SELECT count(_this) FROM User _this \
         WHERE ((_this.name = ?1 AND _this.sort = ?2)) \
         OR ((_this.name = ?3 AND _this.sort = ?4))"
    );
    assert_eq!(compiled.positional.len(), 4);
    assert_eq!(compiled.positional[&4], Value::Int(2));
}

#[test]
fn filter_and_and_are_equivalent() {
    let a = select::<User>()
        .filter([Predicate::equal("name", "alice")])
        .filter([Predicate::equal("sort", 1)]);
    let b = select::<User>()
        .and([Predicate::equal("name", "alice")])
        .and([Predicate::equal("sort", 1)]);
    assert_eq!(a.build().unwrap(), b.build().unwrap());
    assert_eq!(
        sql(&a),
        "SELECT _this FROM User _this WHERE (_this.name = ?1) AND (_this.sort = ?2)"
    );
}

#[test]
fn empty_where_calls_are_no_ops() {
    let base = select::<User>().filter([Predicate::equal("name", "alice")]);
    let expected = sql(&base);
    let qb = base.and([]).or([]).filter(Vec::new());
    assert_eq!(sql(&qb), expected);
}

#[test]
fn dropped_segment_leaves_where_untouched() {
    let qb = select::<User>()
        .filter([Predicate::equal("name", none())])
        .and([Predicate::equal("sort", 3)]);
    assert_eq!(sql(&qb), "SELECT _this FROM User _this WHERE (_this.sort = ?1)");
}

#[test]
fn ignore_null_drops_leaf() {
    let qb = select::<User>()
        .ignore_null(true)
        .filter([Predicate::is_not_null("name")])
        .and([Predicate::equal("name", none())]);
    assert_eq!(count_sql(&qb), "SELECT count(_this) FROM User _this WHERE (_this.name IS NOT NULL)");
}

#[test]
fn reject_null_fails_build() {
    let qb = select::<User>()
        .ignore_null(false)
        .filter([Predicate::equal("name", none())]);
    match qb.build_count() {
        Err(QueryError::InvalidPredicate { column, .. }) => assert_eq!(column, "name"),
        other => panic!("expected InvalidPredicate, got {other:?}"),
    }
}

#[test]
fn policy_is_read_at_build_time() {
    let qb = select::<User>()
        .with_null_policy(NullPolicy::Reject)
        .filter([Predicate::equal("name", none())])
        .ignore_null(true);
    assert_eq!(sql(&qb), "SELECT _this FROM User _this");
}

// ==================== ORDER BY / GROUP BY ====================

#[test]
fn group_by_precedes_order_by() {
    let qb = QueryBuilder::<User>::new()
        .select_columns(["name"])
        .filter([Predicate::is_not_null("name")])
        .order_by("name", SortDir::Desc)
        .order_by_alias("x", "sort", SortDir::Asc)
        .group_by("name")
        .group_by_alias("x", "sort");
    assert_eq!(
        sql(&qb),
        "SELECT _this.name FROM User _this WHERE (_this.name IS NOT NULL) \
         GROUP BY _this.name, x.sort ORDER BY _this.name DESC, x.sort ASC"
    );
    assert_eq!(
        count_sql(&qb),
        "SELECT count(_this.name) FROM User _this WHERE (_this.name IS NOT NULL) \
         GROUP BY _this.name, x.sort"
    );
}

// ==================== Raw text ====================

#[test]
fn raw_query_with_params() {
    let qb = query::<Person>("SELECT m FROM Person m WHERE m.name=:name OR m.name=?1")
        .param_named("name", "alice")
        .param(1, "beatrice");
    let compiled = qb.build().unwrap();
    assert_eq!(compiled.text, "SELECT m FROM Person m WHERE m.name=:name OR m.name=?1");
    assert_eq!(compiled.named["name"], Value::Text("alice".into()));
    assert_eq!(compiled.positional[&1], Value::Text("beatrice".into()));

    assert_eq!(
        qb.build_count().unwrap().text,
        "SELECT count(m) FROM Person m WHERE m.name=:name OR m.name=?1"
    );
}

#[test]
fn predicate_params_follow_explicit_positions() {
    let qb = query::<Person>("SELECT m FROM Person m")
        .param(2, "x")
        .filter([Predicate::equal("sort", 5).alias("m")]);
    let compiled = qb.build().unwrap();
    assert_eq!(compiled.text, "SELECT m FROM Person m WHERE (m.sort = ?3)");
    assert_eq!(compiled.positional[&3], Value::Int(5));
}

#[test]
fn query_discards_structural_state() {
    let qb = select::<Book>()
        .from::<Person>("p")
        .join::<User>("user", "u")
        .query("SELECT b FROM Book b");
    assert_eq!(sql(&qb), "SELECT b FROM Book b");
}

#[test]
fn raw_count_without_from_fails() {
    let qb = query::<Person>("SELECT 1");
    assert!(matches!(qb.build_count(), Err(QueryError::MalformedRawQuery(_))));
    assert!(qb.build().is_ok());
}

#[test]
fn last_param_write_wins() {
    let qb = query::<Person>("SELECT m FROM Person m WHERE m.name=:name")
        .param_named("name", "alice")
        .param_named("name", "carol");
    assert_eq!(qb.build().unwrap().named["name"], Value::Text("carol".into()));
}

// ==================== Preconditions ====================

#[test]
fn clause_before_mode_is_illegal() {
    let qb = QueryBuilder::<User>::new().filter([Predicate::equal("name", "alice")]);
    assert!(matches!(qb.build(), Err(QueryError::IllegalState(_))));

    let qb = QueryBuilder::<User>::new();
    assert!(matches!(qb.build(), Err(QueryError::IllegalState(_))));
}

#[test]
fn select_and_select_columns_are_exclusive() {
    let qb = select::<Book>().select_columns(["id"]);
    assert!(matches!(qb.build(), Err(QueryError::IllegalState(_))));
}

#[test]
fn select_after_delete_is_illegal() {
    let err = delete::<User>().select().build().unwrap_err();
    assert!(err.to_string().contains("Delete mode"));
}

#[test]
fn delete_rejects_from_and_join() {
    let err = delete::<Book>()
        .join::<User>("user", "u")
        .filter([Predicate::equal("name", "x").alias("u")])
        .build()
        .unwrap_err();
    assert!(matches!(err, QueryError::IllegalState(_)));
    assert!(err.to_string().contains("join()"));

    let err = delete::<Book>().from::<User>("u").build().unwrap_err();
    assert!(err.to_string().contains("from()"));
    assert!(delete::<Book>().from::<User>("u").build_count().is_err());
}

#[test]
fn page_window_overflow_is_illegal() {
    let err = select::<User>().page(u64::MAX, 2).build().unwrap_err();
    assert!(matches!(err, QueryError::IllegalState(_)));
    assert!(err.to_string().contains("overflows"));
}

#[test]
fn zero_page_is_illegal() {
    let err = select::<User>().page(0, 10).build().unwrap_err();
    assert!(err.to_string().contains("page must be >= 1"));
}

#[test]
fn zero_position_is_illegal() {
    assert!(query::<User>("SELECT u FROM User u").param(0, 1).build().is_err());
}

// ==================== Windowing ====================

#[test]
fn window_is_attached_to_select_only() {
    let qb = select::<User>().page(2, 3);
    assert_eq!(qb.build().unwrap().window, Some(RowWindow::new(3, 3)));
    assert_eq!(qb.build_count().unwrap().window, None);
    assert!(qb.is_paged());

    let qb = qb.limit(1, 3);
    assert_eq!(qb.build().unwrap().window, Some(RowWindow::new(1, 3)));
    assert!(!qb.is_paged());
}

#[test]
fn page_with_missing_argument_is_a_no_op() {
    let qb = select::<User>().page(None, 10).limit(None, 5);
    assert_eq!(qb.build().unwrap().window, None);
    assert!(!qb.is_paged());
}

#[test]
fn custom_default_alias() {
    let config = crate::QueryConfig::new().default_alias("m");
    let qb = QueryBuilder::<Person>::with_config(config)
        .select()
        .filter([Predicate::like("name", "a%")]);
    assert_eq!(sql(&qb), "SELECT m FROM Person m WHERE (m.name LIKE ?1)");
}
