//! MATCH expression building for the FTS3/FTS4 query language.
//!
//! Bundled SQLite enables the enhanced query syntax, so boolean operators are
//! the upper-case keywords `AND`, `OR` and `NOT`, and parentheses group.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Characters the default tokenizer treats as separators.
static SEPARATOR_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\x80-\u{10FFFF}]").expect("valid regex"));

/// Words the query parser reads as operators when written in upper case.
const OPERATOR_KEYWORDS: [&str; 4] = ["AND", "OR", "NOT", "NEAR"];

/// A full-text query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchQuery {
    /// A single token, e.g. `arden`.
    Term(String),
    /// Every token starting with the given text, e.g. `Ad*`.
    Prefix(String),
    /// Adjacent tokens in order, e.g. `"Dillan King"`.
    Phrase(Vec<String>),
    /// All of the subqueries (implicit AND).
    And(Vec<MatchQuery>),
    /// Any of the subqueries.
    Or(Vec<MatchQuery>),
    /// Rows matching `include` but not `exclude`.
    Not {
        include: Box<MatchQuery>,
        exclude: Box<MatchQuery>,
    },
}

impl MatchQuery {
    pub fn term(text: impl Into<String>) -> Self {
        MatchQuery::Term(text.into())
    }

    pub fn prefix(text: impl Into<String>) -> Self {
        MatchQuery::Prefix(text.into())
    }

    pub fn phrase<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MatchQuery::Phrase(words.into_iter().map(Into::into).collect())
    }

    pub fn not(include: MatchQuery, exclude: MatchQuery) -> Self {
        MatchQuery::Not {
            include: Box::new(include),
            exclude: Box::new(exclude),
        }
    }

    /// Check if the query renders to an empty expression.
    pub fn is_empty(&self) -> bool {
        self.to_match_string().trim().is_empty()
    }

    /// Render the query as a MATCH expression.
    pub fn to_match_string(&self) -> String {
        match self {
            MatchQuery::Term(text) => escape_term(text),
            MatchQuery::Prefix(text) => {
                let text = text.trim().trim_end_matches('*');
                if text.is_empty() {
                    String::new()
                } else if needs_quoting(text) {
                    format!("\"{}*\"", text.replace('"', " "))
                } else {
                    format!("{}*", text)
                }
            }
            MatchQuery::Phrase(words) => {
                let words: Vec<String> = words
                    .iter()
                    .map(|w| w.replace('"', " ").trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect();
                if words.is_empty() {
                    String::new()
                } else {
                    format!("\"{}\"", words.join(" "))
                }
            }
            MatchQuery::And(parts) => join_parts(parts, " "),
            MatchQuery::Or(parts) => join_parts(parts, " OR "),
            MatchQuery::Not { include, exclude } => {
                let include = grouped(include);
                let exclude = grouped(exclude);
                match (include.is_empty(), exclude.is_empty()) {
                    (true, _) => String::new(),
                    (false, true) => include,
                    (false, false) => format!("{} NOT {}", include, exclude),
                }
            }
        }
    }
}

impl fmt::Display for MatchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_match_string())
    }
}

fn is_compound(query: &MatchQuery) -> bool {
    if query.is_empty() {
        return false;
    }
    match query {
        MatchQuery::And(parts) | MatchQuery::Or(parts) => {
            parts.iter().filter(|p| !p.is_empty()).count() > 1
        }
        MatchQuery::Not { exclude, .. } => !exclude.is_empty(),
        _ => false,
    }
}

fn grouped(query: &MatchQuery) -> String {
    let rendered = query.to_match_string();
    if is_compound(query) {
        format!("({})", rendered)
    } else {
        rendered
    }
}

fn join_parts(parts: &[MatchQuery], separator: &str) -> String {
    parts
        .iter()
        .map(grouped)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn needs_quoting(term: &str) -> bool {
    SEPARATOR_CHARS.is_match(term) || OPERATOR_KEYWORDS.contains(&term)
}

/// Escape a single term for a MATCH expression.
///
/// Terms the tokenizer would split, and bare operator keywords, become a
/// quoted phrase. The query language has no escape for `"`, so quotes are
/// dropped.
pub fn escape_term(term: &str) -> String {
    let term = term.trim();
    if term.is_empty() {
        return String::new();
    }
    if needs_quoting(term) {
        let inner = term.replace('"', " ");
        let inner = inner.trim();
        if inner.is_empty() {
            String::new()
        } else {
            format!("\"{}\"", inner)
        }
    } else {
        term.to_string()
    }
}

/// Build a query from free-form user input.
///
/// Words become prefix terms that must all match; a leading `-` excludes a
/// word, like in a web search engine:
/// - "ad king" → `ad* king*`
/// - "king -neva" → `king* NOT neva*`
///
/// Returns `None` when nothing positive is left to match, since the engine
/// cannot evaluate a query made only of exclusions.
pub fn parse_user_query(input: &str) -> Option<MatchQuery> {
    let input = input.to_lowercase();
    let mut include = Vec::new();
    let mut exclude = Vec::new();

    for word in input.split_whitespace() {
        match word.strip_prefix('-') {
            Some(rest) if !rest.is_empty() => exclude.push(MatchQuery::prefix(rest)),
            Some(_) => {}
            None => include.push(MatchQuery::prefix(word)),
        }
    }

    let positive = match include.len() {
        0 => return None,
        1 => include.remove(0),
        _ => MatchQuery::And(include),
    };

    let query = exclude
        .into_iter()
        .fold(positive, |acc, excluded| MatchQuery::not(acc, excluded));

    if query.is_empty() {
        None
    } else {
        Some(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_simple_term() {
        assert_eq!(escape_term("arden"), "arden");
        assert_eq!(escape_term("King"), "King");
    }

    #[test]
    fn test_escape_separator_characters() {
        assert_eq!(escape_term("o'brien"), "\"o'brien\"");
        assert_eq!(escape_term("1-394-571"), "\"1-394-571\"");
        assert_eq!(escape_term("first_name"), "\"first_name\"");
    }

    #[test]
    fn test_escape_operator_keyword() {
        assert_eq!(escape_term("OR"), "\"OR\"");
        assert_eq!(escape_term("or"), "or");
    }

    #[test]
    fn test_escape_drops_quotes() {
        assert_eq!(escape_term("say\"hi"), "\"say hi\"");
        assert_eq!(escape_term("\""), "");
    }

    #[test]
    fn test_walkthrough_queries_render() {
        assert_eq!(MatchQuery::prefix("Ad").to_match_string(), "Ad*");
        assert_eq!(MatchQuery::term("arden").to_match_string(), "arden");
        assert_eq!(
            MatchQuery::phrase(["Dillan", "King"]).to_match_string(),
            "\"Dillan King\""
        );
        assert_eq!(
            MatchQuery::And(vec![MatchQuery::term("King"), MatchQuery::term("Neva")])
                .to_match_string(),
            "King Neva"
        );
        assert_eq!(
            MatchQuery::Or(vec![MatchQuery::term("Neva"), MatchQuery::term("King")])
                .to_match_string(),
            "Neva OR King"
        );
        assert_eq!(
            MatchQuery::not(MatchQuery::term("King"), MatchQuery::term("Neva"))
                .to_match_string(),
            "King NOT Neva"
        );
    }

    #[test]
    fn test_nested_groups_are_parenthesized() {
        let query = MatchQuery::And(vec![
            MatchQuery::Or(vec![MatchQuery::term("a"), MatchQuery::term("b")]),
            MatchQuery::term("c"),
        ]);
        assert_eq!(query.to_match_string(), "(a OR b) c");

        let query = MatchQuery::not(
            MatchQuery::not(MatchQuery::term("a"), MatchQuery::term("b")),
            MatchQuery::term("c"),
        );
        assert_eq!(query.to_match_string(), "(a NOT b) NOT c");
    }

    #[test]
    fn test_single_member_group_is_not_parenthesized() {
        let query = MatchQuery::And(vec![
            MatchQuery::Or(vec![MatchQuery::term("a")]),
            MatchQuery::term("c"),
        ]);
        assert_eq!(query.to_match_string(), "a c");
    }

    #[test]
    fn test_quoted_prefix() {
        assert_eq!(MatchQuery::prefix("o'br").to_match_string(), "\"o'br*\"");
        assert_eq!(MatchQuery::prefix("ad*").to_match_string(), "ad*");
    }

    #[test]
    fn test_empty_queries() {
        assert!(MatchQuery::And(vec![]).is_empty());
        assert!(MatchQuery::phrase(Vec::<String>::new()).is_empty());
        assert!(MatchQuery::term("  ").is_empty());
        assert!(MatchQuery::not(MatchQuery::term(""), MatchQuery::term("x")).is_empty());
        assert_eq!(
            MatchQuery::not(MatchQuery::term("x"), MatchQuery::term("")).to_match_string(),
            "x"
        );
    }

    #[test]
    fn test_empty_exclusion_group_is_dropped() {
        let query = MatchQuery::And(vec![
            MatchQuery::not(MatchQuery::term(""), MatchQuery::term("neva")),
            MatchQuery::term("king"),
        ]);
        assert_eq!(query.to_match_string(), "king");

        let query = MatchQuery::Or(vec![
            MatchQuery::And(vec![MatchQuery::term(""), MatchQuery::term(" ")]),
            MatchQuery::term("neva"),
        ]);
        assert_eq!(query.to_match_string(), "neva");
    }

    #[test]
    fn test_parse_user_query_prefix_terms() {
        let query = parse_user_query("Ad King").unwrap();
        assert_eq!(query.to_match_string(), "ad* king*");
    }

    #[test]
    fn test_parse_user_query_exclusion() {
        let query = parse_user_query("king -neva").unwrap();
        assert_eq!(query.to_match_string(), "king* NOT neva*");

        let query = parse_user_query("king ad -neva -port").unwrap();
        assert_eq!(
            query.to_match_string(),
            "((king* ad*) NOT neva*) NOT port*"
        );
    }

    #[test]
    fn test_parse_user_query_nothing_positive() {
        assert!(parse_user_query("").is_none());
        assert!(parse_user_query("   ").is_none());
        assert!(parse_user_query("-neva").is_none());
        assert!(parse_user_query("- -").is_none());
    }
}
