//! Lexical checks on the configured GraphQL document
//!
//! These are not a GraphQL parser. They catch the configuration mistakes that
//! would otherwise surface only after the first request: unbalanced braces,
//! write operations, and a cursor-paginated query that cannot accept or report
//! a cursor.

use super::rules::GRAPHQL_QUERY;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static OPERATION_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(mutation|subscription)\b").expect("valid regex"));

static AFTER_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$after\s*:").expect("valid regex"));

static PAGE_INFO_FIELDS: Lazy<[(&'static str, Regex); 3]> = Lazy::new(|| {
    [
        ("pageInfo", Regex::new(r"\bpageInfo\b").expect("valid regex")),
        ("endCursor", Regex::new(r"\bendCursor\b").expect("valid regex")),
        (
            "hasNextPage",
            Regex::new(r"\bhasNextPage\b").expect("valid regex"),
        ),
    ]
});

/// Check the query document. `cursor_pagination` adds the pagination checks.
pub fn check_query(query: &str, cursor_pagination: bool) -> Result<()> {
    let stripped = strip_comments_and_strings(query);

    if !stripped.contains('{') {
        return Err(invalid("query has no selection set"));
    }

    let top_level = top_level_text(&stripped)?;
    if let Some(found) = OPERATION_KEYWORD.captures(&top_level) {
        return Err(invalid(format!(
            "only query operations are supported, found '{}'",
            &found[1]
        )));
    }

    if cursor_pagination {
        if !AFTER_VARIABLE.is_match(&stripped) {
            return Err(invalid(
                "cursor pagination requires the query to declare an $after variable",
            ));
        }
        for (name, pattern) in PAGE_INFO_FIELDS.iter() {
            if !pattern.is_match(&stripped) {
                return Err(invalid(format!(
                    "cursor pagination requires the query to select '{name}'"
                )));
            }
        }
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> Error {
    Error::invalid_value(GRAPHQL_QUERY, message)
}

/// Replace `# ...` comments and string literals (including `"""` block
/// strings) with spaces so that their contents cannot match any check.
fn strip_comments_and_strings(query: &str) -> String {
    let chars: Vec<char> = query.chars().collect();
    let mut out = String::with_capacity(query.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '"' if chars[i..].starts_with(&['"', '"', '"']) => {
                i += 3;
                while i < chars.len() && !chars[i..].starts_with(&['"', '"', '"']) {
                    i += 1;
                }
                i += 3;
                out.push(' ');
            }
            '"' => {
                i += 1;
                while i < chars.len() && chars[i] != '"' && chars[i] != '\n' {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
                out.push(' ');
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Text outside every `{}` and `()` pair, i.e. operation and fragment
/// headers. Fails on unbalanced brackets.
fn top_level_text(stripped: &str) -> Result<String> {
    let mut braces = 0usize;
    let mut parens = 0usize;
    let mut out = String::new();

    for c in stripped.chars() {
        match c {
            '{' => braces += 1,
            '(' => parens += 1,
            '}' => {
                braces = braces
                    .checked_sub(1)
                    .ok_or_else(|| invalid("unbalanced '}'"))?;
                out.push(' ');
            }
            ')' => {
                parens = parens
                    .checked_sub(1)
                    .ok_or_else(|| invalid("unbalanced ')'"))?;
                out.push(' ');
            }
            c if braces == 0 && parens == 0 => out.push(c),
            _ => {}
        }
    }

    if braces != 0 {
        return Err(invalid("unbalanced '{'"));
    }
    if parens != 0 {
        return Err(invalid("unbalanced '('"));
    }

    Ok(out)
}
