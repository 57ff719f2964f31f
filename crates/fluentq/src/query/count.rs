use crate::error::{QueryError, QueryResult};

const SELECT: &str = "select";
const FROM: &str = "from";

/// Turn a raw `SELECT x FROM ...` statement into `SELECT count(x) FROM ...`.
///
/// The selected expression is the text between the first case-insensitive
/// `select` and the first `from`, minus the single separating space on each
/// side. Its first occurrence surrounded by single spaces is wrapped in
/// `count(...)`; the rest of the text is left untouched.
///
/// ```ignore
/// let text = derive_count_query("SELECT m FROM Entity m WHERE m.x=:v")?;
/// assert_eq!(text, "SELECT count(m) FROM Entity m WHERE m.x=:v");
/// ```
///
/// Fails with [`QueryError::MalformedRawQuery`] when either keyword is
/// missing or the span between them is empty.
pub fn derive_count_query(raw: &str) -> QueryResult<String> {
    let lower = raw.to_ascii_lowercase();
    let begin = lower
        .find(SELECT)
        .ok_or_else(|| malformed(raw, "no SELECT keyword"))?;
    let end = lower
        .find(FROM)
        .ok_or_else(|| malformed(raw, "no FROM keyword"))?;

    let start = begin + SELECT.len() + 1;
    let stop = end.checked_sub(1).filter(|&stop| stop > start);
    let content = stop
        .and_then(|stop| raw.get(start..stop))
        .ok_or_else(|| malformed(raw, "nothing selected between SELECT and FROM"))?;

    let needle = format!(" {content} ");
    if !raw.contains(&needle) {
        return Err(malformed(raw, "selected expression is not delimited by spaces"));
    }
    Ok(raw.replacen(&needle, &format!(" count({content}) "), 1))
}

fn malformed(raw: &str, reason: &str) -> QueryError {
    QueryError::MalformedRawQuery(format!("{reason}: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_selected_alias() {
        assert_eq!(
            derive_count_query("SELECT m FROM Entity m WHERE m.x=:v").unwrap(),
            "SELECT count(m) FROM Entity m WHERE m.x=:v"
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            derive_count_query("select p From Person p where p.name <> ?1").unwrap(),
            "select count(p) From Person p where p.name <> ?1"
        );
    }

    #[test]
    fn wraps_multi_column_projection() {
        assert_eq!(
            derive_count_query("SELECT DISTINCT u.name FROM User u").unwrap(),
            "SELECT count(DISTINCT u.name) FROM User u"
        );
    }

    #[test]
    fn only_the_first_occurrence_is_replaced() {
        assert_eq!(
            derive_count_query("SELECT m FROM Person m WHERE m.id IN (SELECT m FROM Person m)")
                .unwrap(),
            "SELECT count(m) FROM Person m WHERE m.id IN (SELECT m FROM Person m)"
        );
    }

    #[test]
    fn missing_keywords_fail() {
        let err = derive_count_query("DELETE FROM Person p").unwrap_err();
        assert!(matches!(err, QueryError::MalformedRawQuery(_)));

        let err = derive_count_query("SELECT 1").unwrap_err();
        assert!(err.to_string().contains("no FROM keyword"));
    }

    #[test]
    fn empty_span_fails() {
        assert!(derive_count_query("SELECT FROM Person").is_err());
        assert!(derive_count_query("FROM Person p SELECT p").is_err());
    }
}
